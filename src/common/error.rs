use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, agora com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Corpo que nem chegou a virar o payload (JSON quebrado, tipo errado, etc.)
    #[error("Corpo da requisição inválido: {0}")]
    MalformedBody(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Usuário já existe")]
    UsernameAlreadyExists,

    // Variante para erros de banco de dados (exemplo com sqlx)
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::MalformedBody(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::UsernameAlreadyExists => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                // Erros de itens aninhados (itens[0].quantidade) vêm fora de field_errors
                for (field, kind) in errors.errors() {
                    if let validator::ValidationErrorsKind::List(items) = kind {
                        for (index, nested) in items {
                            for (nested_field, nested_errors) in nested.field_errors() {
                                let messages: Vec<String> = nested_errors
                                    .iter()
                                    .map(|e| {
                                        e.message
                                            .as_ref()
                                            .map(|m| m.to_string())
                                            .unwrap_or_else(|| e.code.to_string())
                                    })
                                    .collect();
                                details.insert(format!("{field}[{index}].{nested_field}"), messages);
                            }
                        }
                    }
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::MalformedBody(reason) => {
                let body = Json(json!({
                    "error": "Erro de validação",
                    "details": reason,
                }));
                return (status, body).into_response();
            }
            AppError::InvalidCredentials => "Usuário ou senha incorretos.".to_string(),
            AppError::InvalidToken => "Token inválido ou expirado.".to_string(),
            AppError::Forbidden(reason) => reason,
            AppError::UserNotFound => "Usuário não encontrado.".to_string(),
            AppError::UsernameAlreadyExists => "Usuário já existe.".to_string(),

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            // O detalhe fica só no log do servidor.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                "Erro interno do servidor.".to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
