use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::role_dto::{CreateRolePayload, MessageResponse, RoleResponse, UpdateRolePayload},
    error::Result,
    routes::extract::JsonBody,
    AppState,
};

#[utoipa::path(
    post,
    path = "/roles",
    request_body = CreateRolePayload,
    responses(
        (status = 201, description = "Role stored", body = Json<RoleResponse>),
        (status = 400, description = "Invalid payload or duplicate name")
    )
)]
#[axum::debug_handler]
pub async fn store_role(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateRolePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let role = state.role_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

#[utoipa::path(
    get,
    path = "/roles",
    responses(
        (status = 200, description = "All active roles", body = [RoleResponse])
    )
)]
#[axum::debug_handler]
pub async fn get_all_roles(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let roles = state.role_service.list().await?;
    let items: Vec<RoleResponse> = roles.into_iter().map(Into::into).collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/roles/{id}",
    params(
        ("id" = i32, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role found", body = Json<RoleResponse>),
        (status = 404, description = "Role not found")
    )
)]
#[axum::debug_handler]
pub async fn get_role_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let role = state.role_service.get(id).await?;
    Ok(Json(RoleResponse::from(role)))
}

#[utoipa::path(
    put,
    path = "/roles/{id}",
    params(
        ("id" = i32, Path, description = "Role ID")
    ),
    request_body = UpdateRolePayload,
    responses(
        (status = 200, description = "Role updated", body = Json<RoleResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Role not found")
    )
)]
#[axum::debug_handler]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonBody(payload): JsonBody<UpdateRolePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let role = state.role_service.update(id, payload).await?;
    Ok(Json(RoleResponse::from(role)))
}

#[utoipa::path(
    post,
    path = "/roles/soft-delete/{id}",
    params(
        ("id" = i32, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role soft deleted", body = Json<MessageResponse>),
        (status = 400, description = "Role cannot be deleted"),
        (status = 404, description = "Role not found")
    )
)]
#[axum::debug_handler]
pub async fn soft_delete_role(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.role_service.soft_delete(id).await?;
    Ok(Json(MessageResponse::new(format!("Role {} soft deleted", id))))
}

#[utoipa::path(
    post,
    path = "/roles/restore/{id}",
    params(
        ("id" = i32, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role restored", body = Json<MessageResponse>),
        (status = 404, description = "Role not found or not soft deleted")
    )
)]
#[axum::debug_handler]
pub async fn restore_role(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.role_service.restore(id).await?;
    Ok(Json(MessageResponse::new(format!("Role {} restored", id))))
}

#[utoipa::path(
    delete,
    path = "/roles/{id}",
    params(
        ("id" = i32, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role hard deleted", body = Json<MessageResponse>),
        (status = 400, description = "Role cannot be deleted"),
        (status = 404, description = "Role not found")
    )
)]
#[axum::debug_handler]
pub async fn hard_delete_role(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.role_service.hard_delete(id).await?;
    Ok(Json(MessageResponse::new(format!("Role {} hard deleted", id))))
}

#[utoipa::path(
    get,
    path = "/roles/soft-deleted",
    responses(
        (status = 200, description = "Soft-deleted roles", body = [RoleResponse])
    )
)]
#[axum::debug_handler]
pub async fn get_all_soft_deleted_roles(
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let roles = state.role_service.list_soft_deleted().await?;
    let items: Vec<RoleResponse> = roles.into_iter().map(Into::into).collect();
    Ok(Json(items))
}
