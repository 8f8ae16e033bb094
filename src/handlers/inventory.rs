// src/handlers/inventory.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{error::AppError, extract::ValidatedJson},
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::inventory::{BatchResult, HistoryEntry, HistoryQuery, MovementRequest, StockItem},
};

// GET /api/saldo
#[utoipa::path(
    get,
    path = "/api/saldo",
    tag = "Estoque",
    responses(
        (status = 200, description = "Saldo atual por tipo e tamanho, na ordem de exibição", body = Vec<StockItem>),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_saldo(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(username = %user.username, "consulta de saldo");
    let saldos = app_state.stock_service.list_balances().await?;
    Ok((StatusCode::OK, Json(saldos)))
}

// POST /api/movimentar
#[utoipa::path(
    post,
    path = "/api/movimentar",
    tag = "Estoque",
    request_body = MovementRequest,
    responses(
        (status = 200, description = "Lote processado; itens recusados aparecem como mensagem de erro", body = BatchResult),
        (status = 401, description = "Token ausente ou inválido"),
        (status = 403, description = "Apenas administradores"),
        (status = 422, description = "Payload inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn movimentar(
    State(app_state): State<AppState>,
    RequireAdmin(principal): RequireAdmin,
    ValidatedJson(payload): ValidatedJson<MovementRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state
        .movement_service
        .process_batch(&principal, &payload)
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/historico?limit=200
#[utoipa::path(
    get,
    path = "/api/historico",
    tag = "Estoque",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Movimentações mais recentes primeiro (máx. 200)", body = Vec<HistoryEntry>),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_historico(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(username = %user.username, limit = ?query.limit, "consulta de histórico");
    let historico = app_state.stock_service.list_history(query.limit).await?;
    Ok((StatusCode::OK, Json(historico)))
}
