#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use accounts_backend::{
    dto::{
        role_dto::{CreateRolePayload, UpdateRolePayload},
        user_dto::{CreateUserPayload, UpdateUserPayload, UserResponse, UserSearchHit},
    },
    error::{Error, Result},
    models::{role::Role, user::User, DeleteOutcome},
    routes,
    services::{
        cache_service::{CacheError, CacheStore},
        role_store::RoleStore,
        search_service::{SearchError, SearchIndex, UserDocument},
        user_service::CacheSettings,
        user_store::UserStore,
    },
    AppState, Gateways,
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

fn primary_down() -> Error {
    Error::Database(sqlx::Error::PoolTimedOut)
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    roles: Vec<Role>,
    links: Vec<(i32, i32)>,
    next_user_id: i32,
    next_role_id: i32,
}

impl Tables {
    fn project(&self, user: &User) -> UserResponse {
        let mut roles: Vec<Role> = self
            .links
            .iter()
            .filter(|(user_id, _)| *user_id == user.id)
            .filter_map(|(_, role_id)| self.roles.iter().find(|r| r.id == *role_id))
            .filter(|r| r.deleted_at.is_none())
            .cloned()
            .collect();
        roles.sort_by_key(|r| r.id);
        UserResponse::from_parts(user.clone(), roles)
    }
}

/// Relational store stand-in. `fail_reads` makes every user read fail like an
/// unreachable database.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn links_for(&self, user_id: i32) -> Vec<i32> {
        let tables = self.tables.lock().unwrap();
        tables
            .links
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, r)| *r)
            .collect()
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(primary_down());
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        self.check_reads()
    }

    async fn create(&self, payload: CreateUserPayload) -> Result<UserResponse> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == payload.email) {
            return Err(Error::Conflict("Unique constraint violated: email".into()));
        }
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            name: payload.name,
            email: payload.email,
            is_default: payload.is_default,
            can_deleted: payload.can_deleted,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        tables.users.push(user.clone());
        Ok(tables.project(&user))
    }

    async fn get(&self, id: i32) -> Result<Option<UserResponse>> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .map(|u| tables.project(u)))
    }

    async fn list_active(&self) -> Result<Vec<UserResponse>> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .map(|u| tables.project(u))
            .collect())
    }

    async fn list_soft_deleted(&self) -> Result<Vec<UserResponse>> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .filter(|u| u.deleted_at.is_some())
            .map(|u| tables.project(u))
            .collect())
    }

    async fn update(&self, id: i32, payload: UpdateUserPayload) -> Result<Option<UserResponse>> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(email) = &payload.email {
            if tables.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(Error::Conflict("Unique constraint violated: email".into()));
            }
        }
        let Some(user) = tables
            .users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        else {
            return Ok(None);
        };
        if let Some(name) = payload.name {
            user.name = name;
        }
        if let Some(email) = payload.email {
            user.email = email;
        }
        if let Some(is_default) = payload.is_default {
            user.is_default = is_default;
        }
        if let Some(can_deleted) = payload.can_deleted {
            user.can_deleted = can_deleted;
        }
        user.updated_at = Some(Utc::now());
        let user = user.clone();
        Ok(Some(tables.project(&user)))
    }

    async fn soft_delete(&self, id: i32) -> Result<DeleteOutcome> {
        let mut tables = self.tables.lock().unwrap();
        let Some(user) = tables
            .users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        else {
            return Ok(DeleteOutcome::NotFound);
        };
        if !user.can_deleted {
            return Ok(DeleteOutcome::Protected);
        }
        user.deleted_at = Some(Utc::now());
        Ok(DeleteOutcome::Deleted)
    }

    async fn restore(&self, id: i32) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        match tables
            .users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_some())
        {
            Some(user) => {
                user.deleted_at = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hard_delete(&self, id: i32) -> Result<DeleteOutcome> {
        let mut tables = self.tables.lock().unwrap();
        let Some(pos) = tables.users.iter().position(|u| u.id == id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if !tables.users[pos].can_deleted {
            return Ok(DeleteOutcome::Protected);
        }
        tables.users.remove(pos);
        tables.links.retain(|(u, _)| *u != id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn assign_role(&self, user_id: i32, role_id: i32) -> Result<UserResponse> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables
            .users
            .iter()
            .find(|u| u.id == user_id && u.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| Error::NotFound("User not found".into()))?;
        if tables.links.contains(&(user_id, role_id)) {
            return Err(Error::Conflict("Role already assigned to user".into()));
        }
        tables.links.push((user_id, role_id));
        Ok(tables.project(&user))
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn create(&self, payload: CreateRolePayload) -> Result<Role> {
        let mut tables = self.tables.lock().unwrap();
        if tables.roles.iter().any(|r| r.name == payload.name) {
            return Err(Error::Conflict("Unique constraint violated: name".into()));
        }
        tables.next_role_id += 1;
        let role = Role {
            id: tables.next_role_id,
            name: payload.name,
            is_default: payload.is_default,
            can_deleted: payload.can_deleted,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        tables.roles.push(role.clone());
        Ok(role)
    }

    async fn get(&self, id: i32) -> Result<Option<Role>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .roles
            .iter()
            .find(|r| r.id == id && r.deleted_at.is_none())
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<Role>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .roles
            .iter()
            .filter(|r| r.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn list_soft_deleted(&self) -> Result<Vec<Role>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .roles
            .iter()
            .filter(|r| r.deleted_at.is_some())
            .cloned()
            .collect())
    }

    async fn update(&self, id: i32, payload: UpdateRolePayload) -> Result<Option<Role>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(role) = tables
            .roles
            .iter_mut()
            .find(|r| r.id == id && r.deleted_at.is_none())
        else {
            return Ok(None);
        };
        if let Some(name) = payload.name {
            role.name = name;
        }
        if let Some(is_default) = payload.is_default {
            role.is_default = is_default;
        }
        if let Some(can_deleted) = payload.can_deleted {
            role.can_deleted = can_deleted;
        }
        role.updated_at = Some(Utc::now());
        Ok(Some(role.clone()))
    }

    async fn soft_delete(&self, id: i32) -> Result<DeleteOutcome> {
        let mut tables = self.tables.lock().unwrap();
        let Some(role) = tables
            .roles
            .iter_mut()
            .find(|r| r.id == id && r.deleted_at.is_none())
        else {
            return Ok(DeleteOutcome::NotFound);
        };
        if !role.can_deleted {
            return Ok(DeleteOutcome::Protected);
        }
        role.deleted_at = Some(Utc::now());
        Ok(DeleteOutcome::Deleted)
    }

    async fn restore(&self, id: i32) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        match tables
            .roles
            .iter_mut()
            .find(|r| r.id == id && r.deleted_at.is_some())
        {
            Some(role) => {
                role.deleted_at = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hard_delete(&self, id: i32) -> Result<DeleteOutcome> {
        let mut tables = self.tables.lock().unwrap();
        let Some(pos) = tables.roles.iter().position(|r| r.id == id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if !tables.roles[pos].can_deleted {
            return Ok(DeleteOutcome::Protected);
        }
        tables.roles.remove(pos);
        tables.links.retain(|(_, r)| *r != id);
        Ok(DeleteOutcome::Deleted)
    }
}

/// TTL-aware key/value cache that can be switched off.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    down: AtomicBool,
}

impl MemoryCache {
    pub fn set_down(&self, on: bool) {
        self.down.store(on, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    fn check(&self) -> std::result::Result<(), CacheError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn ping(&self) -> std::result::Result<(), CacheError> {
        self.check()
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> std::result::Result<(), CacheError> {
        self.check()?;
        let expires = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    async fn get(&self, key: &str) -> std::result::Result<Option<String>, CacheError> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        let expired = matches!(entries.get(key), Some((_, expires)) if *expires <= Instant::now());
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|(value, _)| value.clone()))
    }

    async fn invalidate(&self, key: &str) -> std::result::Result<(), CacheError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Document index matching on lowercase substrings of name and email.
#[derive(Default)]
pub struct MemoryIndex {
    docs: Mutex<BTreeMap<i32, UserDocument>>,
    down: AtomicBool,
}

impl MemoryIndex {
    pub fn set_down(&self, on: bool) {
        self.down.store(on, Ordering::SeqCst);
    }

    pub fn document(&self, id: i32) -> Option<UserDocument> {
        self.docs.lock().unwrap().get(&id).cloned()
    }

    fn check(&self) -> std::result::Result<(), SearchError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(SearchError::Status {
                status: 503,
                body: "cluster unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn upsert(&self, id: i32, document: &UserDocument) -> std::result::Result<(), SearchError> {
        self.check()?;
        self.docs.lock().unwrap().insert(id, document.clone());
        Ok(())
    }

    async fn delete(&self, id: i32) -> std::result::Result<(), SearchError> {
        self.check()?;
        self.docs.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn search(&self, query: &str) -> std::result::Result<Vec<UserSearchHit>, SearchError> {
        self.check()?;
        let needle = query.to_lowercase();
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, d)| {
                d.name.to_lowercase().contains(&needle) || d.email.to_lowercase().contains(&needle)
            })
            .map(|(id, d)| UserSearchHit {
                id: *id,
                name: d.name.clone(),
                email: d.email.clone(),
                created_at: d.created_at,
            })
            .collect())
    }

    async fn cluster_status(&self) -> std::result::Result<String, SearchError> {
        self.check()?;
        Ok("green".into())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub index: Arc<MemoryIndex>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let cache = Arc::new(MemoryCache::default());
        let index = Arc::new(MemoryIndex::default());
        let gateways = Gateways {
            users: store.clone(),
            roles: store.clone(),
            cache: cache.clone(),
            index: index.clone(),
        };
        let state = AppState::new(gateways, CacheSettings::default());
        Self {
            router: routes::router(state),
            store,
            cache,
            index,
        }
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
        (status, json)
    }
}
