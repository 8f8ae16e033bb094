// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    // Importamos os models para referenciar no Swagger
    models::dashboard::{MonthlySummary, PlanningResponse},
};

// GET /api/dashboard/resumo
#[utoipa::path(
    get,
    path = "/api/dashboard/resumo",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Entradas, saídas e ranking de saídas do mês corrente", body = MonthlySummary),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_resumo(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(username = %user.username, "dashboard: resumo do mês");
    let resumo = app_state.dashboard_service.monthly_summary(Utc::now()).await?;
    Ok((StatusCode::OK, Json(resumo)))
}

// GET /api/dashboard/planejamento
#[utoipa::path(
    get,
    path = "/api/dashboard/planejamento",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Itens parados, cobertura e consumo semanal (últimos 30 dias)", body = PlanningResponse),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_planejamento(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(username = %user.username, "dashboard: planejamento");
    let planejamento = app_state.dashboard_service.planning(Utc::now()).await?;
    Ok((StatusCode::OK, Json(planejamento)))
}
