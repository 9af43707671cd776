use std::env;

use accounts_backend::{
    dto::{
        role_dto::CreateRolePayload,
        user_dto::{CreateUserPayload, UpdateUserPayload},
    },
    error::Error,
    models::DeleteOutcome,
    services::{
        role_store::{PgRoleStore, RoleStore},
        user_store::{PgUserStore, UserStore},
    },
};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;

/// Needs a disposable PostgreSQL at DATABASE_URL.
#[tokio::test]
#[ignore]
async fn postgres_store_end_to_end() {
    dotenvy::dotenv().ok();
    let url = env::var("DATABASE_URL").expect("DATABASE_URL");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let users = PgUserStore::new(pool.clone());
    let roles = PgRoleStore::new(pool.clone());
    users.ping().await.expect("ping");

    let suffix = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let role = roles
        .create(CreateRolePayload {
            name: format!("tester-{}", suffix),
            is_default: false,
            can_deleted: true,
        })
        .await
        .expect("role");

    let email = format!("pg-{}@example.com", suffix);
    let user = users
        .create(CreateUserPayload {
            name: "Pg User".into(),
            email: email.clone(),
            is_default: false,
            can_deleted: true,
        })
        .await
        .expect("user");
    assert!(user.deleted_at.is_none());
    assert!(user.roles.is_empty());

    let dup = users
        .create(CreateUserPayload {
            name: "Dup".into(),
            email: email.clone(),
            is_default: false,
            can_deleted: true,
        })
        .await;
    assert!(matches!(dup, Err(Error::Conflict(_))));

    let assigned = users.assign_role(user.id, role.id).await.expect("assign");
    assert!(assigned.has_role(role.id));
    let again = users.assign_role(user.id, role.id).await;
    assert!(matches!(again, Err(Error::Conflict(_))));

    let updated = users
        .update(
            user.id,
            UpdateUserPayload {
                name: Some("Pg User Renamed".into()),
                ..Default::default()
            },
        )
        .await
        .expect("update")
        .expect("present");
    assert_eq!(updated.name, "Pg User Renamed");
    assert_eq!(updated.email, email);
    assert!(updated.updated_at.is_some());

    assert_eq!(
        users.soft_delete(user.id).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert!(users.get(user.id).await.unwrap().is_none());
    let on_deleted = users.assign_role(user.id, role.id).await;
    assert!(matches!(on_deleted, Err(Error::NotFound(_))));
    assert_eq!(
        users.soft_delete(user.id).await.unwrap(),
        DeleteOutcome::NotFound
    );
    assert!(users.restore(user.id).await.unwrap());
    assert!(users.get(user.id).await.unwrap().is_some());

    assert_eq!(
        roles.soft_delete(role.id).await.unwrap(),
        DeleteOutcome::Deleted
    );
    let without_role = users.get(user.id).await.unwrap().unwrap();
    assert!(!without_role.has_role(role.id));
    assert!(roles.restore(role.id).await.unwrap());

    assert_eq!(
        users.hard_delete(user.id).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        users.hard_delete(user.id).await.unwrap(),
        DeleteOutcome::NotFound
    );
    assert_eq!(
        roles.hard_delete(role.id).await.unwrap(),
        DeleteOutcome::Deleted
    );

    let protected = users
        .create(CreateUserPayload {
            name: "Keeper".into(),
            email: format!("keeper-{}@example.com", suffix),
            is_default: true,
            can_deleted: false,
        })
        .await
        .expect("protected user");
    assert_eq!(
        users.soft_delete(protected.id).await.unwrap(),
        DeleteOutcome::Protected
    );
    assert_eq!(
        users.hard_delete(protected.id).await.unwrap(),
        DeleteOutcome::Protected
    );
}
