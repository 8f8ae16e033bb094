// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{error::AppError, extract::ValidatedJson},
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::auth::{CreateUserPayload, DetailResponse, UserResponse},
};

// GET /api/usuarios
#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Usuários",
    responses(
        (status = 200, description = "Usuários cadastrados (sem hash de senha)", body = Vec<UserResponse>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(username = %user.username, "listagem de usuários");
    let users = app_state.user_service.list_users().await?;
    Ok((StatusCode::OK, Json(users)))
}

// POST /api/usuarios
#[utoipa::path(
    post,
    path = "/api/usuarios",
    tag = "Usuários",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = UserResponse),
        (status = 403, description = "Apenas administradores"),
        (status = 409, description = "Usuário já existe"),
        (status = 422, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(payload): ValidatedJson<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.create_user(&payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// DELETE /api/usuarios/{id}
#[utoipa::path(
    delete,
    path = "/api/usuarios/{id}",
    tag = "Usuários",
    params(("id" = i32, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário removido", body = DetailResponse),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.delete_user(id).await?;
    tracing::info!(admin = %admin.username, removido = %user.username, "usuário excluído via API");

    Ok((
        StatusCode::OK,
        Json(DetailResponse {
            detail: format!("Usuário {} removido", user.username),
        }),
    ))
}
