// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::auth::{Principal, Role},
};

/// Guardião das rotas que alteram dados: só passa com papel `admin`.
///
/// Roda antes do extrator do corpo, então um usuário comum recebe 403
/// mesmo que o payload esteja malformado.
pub struct RequireAdmin(pub Principal);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai o usuário colocado pelo auth_guard
        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        // B. Confere o papel
        if principal.role != Role::Admin {
            tracing::warn!(username = %principal.username, "acesso negado: rota exclusiva de admin");
            return Err(AppError::Forbidden(
                "Apenas administradores podem realizar esta ação.".to_string(),
            ));
        }

        Ok(RequireAdmin(principal))
    }
}
