use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::user_dto::{
        ApiResponse, AssignRoleQuery, CacheDataEntry, CacheDataPayload, CreateUserPayload,
        SearchQuery, UpdateUserPayload, UserResponse,
    },
    error::Result,
    routes::extract::JsonBody,
    AppState,
};

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User stored"),
        (status = 400, description = "Invalid payload or duplicate email")
    )
)]
#[axum::debug_handler]
pub async fn store_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(201, "store_user", vec![user])),
    ))
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All active users")
    )
)]
#[axum::debug_handler]
pub async fn get_all_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.user_service.list().await?;
    Ok(Json(ApiResponse::ok("get_all_users", users)))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get(id).await?;
    Ok(Json(ApiResponse::ok("get_user_by_id", vec![user])))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonBody(payload): JsonBody<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.update(id, payload).await?;
    Ok(Json(ApiResponse::ok("update_user", vec![user])))
}

#[utoipa::path(
    put,
    path = "/users/soft-delete/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User soft deleted"),
        (status = 400, description = "User cannot be deleted"),
        (status = 404, description = "User not found or already soft-deleted")
    )
)]
#[axum::debug_handler]
pub async fn soft_delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.user_service.soft_delete(id).await?;
    Ok(Json(ApiResponse::<UserResponse>::ok("soft_deleted_user", vec![])))
}

#[utoipa::path(
    post,
    path = "/users/restore/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User restored"),
        (status = 404, description = "User not found or not soft deleted")
    )
)]
#[axum::debug_handler]
pub async fn restore_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.user_service.restore(id).await?;
    Ok(Json(ApiResponse::<UserResponse>::ok("restore_user", vec![])))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User hard deleted"),
        (status = 400, description = "User cannot be deleted"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn hard_delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.user_service.hard_delete(id).await?;
    Ok(Json(ApiResponse::<UserResponse>::ok("hard_deleted_user", vec![])))
}

#[utoipa::path(
    get,
    path = "/users/soft-deleted",
    responses(
        (status = 200, description = "Soft-deleted users")
    )
)]
#[axum::debug_handler]
pub async fn get_all_soft_deleted_users(
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let users = state.user_service.list_soft_deleted().await?;
    Ok(Json(ApiResponse::ok("get_all_soft_deleted_users", users)))
}

#[utoipa::path(
    get,
    path = "/users/search",
    params(
        ("q" = String, Query, description = "Text matched against name and email")
    ),
    responses(
        (status = 200, description = "Matching users, most relevant first"),
        (status = 503, description = "Search index unavailable")
    )
)]
#[axum::debug_handler]
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let hits = state.user_service.search(&query.q).await?;
    Ok(Json(ApiResponse::ok("search_users", hits)))
}

#[utoipa::path(
    post,
    path = "/users/assign-role/{id}",
    params(
        ("id" = i32, Path, description = "User ID"),
        ("role_id" = i32, Query, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role assigned"),
        (status = 400, description = "Role already assigned to user"),
        (status = 404, description = "User or role not found")
    )
)]
#[axum::debug_handler]
pub async fn assign_role_to_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<AssignRoleQuery>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.assign_role(id, query.role_id).await?;
    Ok(Json(ApiResponse::ok("assign_role_to_user", vec![user])))
}

#[utoipa::path(
    post,
    path = "/users/cache/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = CacheDataPayload,
    responses(
        (status = 200, description = "Data cached"),
        (status = 503, description = "Cache unavailable")
    )
)]
#[axum::debug_handler]
pub async fn cache_user_data(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonBody(payload): JsonBody<CacheDataPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.user_service.put_cache_data(id, &payload.data).await?;
    Ok(Json(ApiResponse::<CacheDataEntry>::ok("cache_user_data", vec![])))
}

#[utoipa::path(
    get,
    path = "/users/cache/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Cached data found"),
        (status = 404, description = "Cached data not found"),
        (status = 503, description = "Cache unavailable")
    )
)]
#[axum::debug_handler]
pub async fn get_cached_user_data(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let data = state.user_service.get_cache_data(id).await?;
    Ok(Json(ApiResponse::ok(
        "get_cached_user_data",
        vec![CacheDataEntry { user_id: id, data }],
    )))
}
