pub mod extract;
pub mod health;
pub mod roles;
pub mod users;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{middleware::cors::api_cors, AppState};

/// Full HTTP surface. Static `/users/...` segments take priority over `/users/:id`.
pub fn router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/users", get(users::get_all_users).post(users::store_user))
        .route("/users/health", get(health::services_health))
        .route("/users/health-details", get(health::services_health_details))
        .route("/users/soft-deleted", get(users::get_all_soft_deleted_users))
        .route("/users/search", get(users::search_users))
        .route("/users/soft-delete/:id", put(users::soft_delete_user))
        .route("/users/restore/:id", post(users::restore_user))
        .route("/users/assign-role/:id", post(users::assign_role_to_user))
        .route(
            "/users/cache/:id",
            get(users::get_cached_user_data).post(users::cache_user_data),
        )
        .route(
            "/users/:id",
            get(users::get_user_by_id)
                .put(users::update_user)
                .delete(users::hard_delete_user),
        );

    let role_routes = Router::new()
        .route("/roles", get(roles::get_all_roles).post(roles::store_role))
        .route("/roles/soft-deleted", get(roles::get_all_soft_deleted_roles))
        .route("/roles/soft-delete/:id", post(roles::soft_delete_role))
        .route("/roles/restore/:id", post(roles::restore_role))
        .route(
            "/roles/:id",
            get(roles::get_role_by_id)
                .put(roles::update_role)
                .delete(roles::hard_delete_role),
        );

    Router::new()
        .route("/health", get(health::health))
        .merge(user_routes)
        .merge(role_routes)
        .with_state(state)
        .layer(api_cors())
        .layer(TraceLayer::new_for_http())
}
