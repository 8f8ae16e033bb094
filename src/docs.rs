// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Sicro API", description = "Controle de estoque de roupas estéreis"),
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,

        // --- Usuários ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::delete_user,

        // --- Estoque ---
        handlers::inventory::get_saldo,
        handlers::inventory::movimentar,
        handlers::inventory::get_historico,

        // --- Dashboard ---
        handlers::dashboard::get_resumo,
        handlers::dashboard::get_planejamento,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::LoginForm,
            models::auth::TokenResponse,
            models::auth::DetailResponse,
            models::auth::CreateUserPayload,
            models::auth::UserResponse,

            // --- Estoque ---
            models::inventory::StockItem,
            models::inventory::MovementAction,
            models::inventory::MovementItem,
            models::inventory::MovementRequest,
            models::inventory::BatchResult,
            models::inventory::HistoryEntry,

            // --- Dashboard ---
            models::dashboard::RankingEntry,
            models::dashboard::MonthlySummary,
            models::dashboard::StalledItem,
            models::dashboard::CoverageEntry,
            models::dashboard::PlanningResponse,
        )
    ),
    tags(
        (name = "Autenticação", description = "Login, renovação e logout"),
        (name = "Usuários", description = "Cadastro de operadores e administradores"),
        (name = "Estoque", description = "Saldo, movimentações e histórico"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/token",
            "/api/refresh",
            "/api/logout",
            "/api/usuarios",
            "/api/usuarios/{id}",
            "/api/saldo",
            "/api/movimentar",
            "/api/historico",
            "/api/dashboard/resumo",
            "/api/dashboard/planejamento",
        ] {
            assert!(paths.contains(&expected), "rota ausente no OpenAPI: {expected}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }

    #[test]
    fn decimal_averages_are_documented_as_numbers() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let media = &doc["components"]["schemas"]["CoverageEntry"]["properties"]["media_diaria"];

        assert_eq!(media["type"], "number", "{media}");
    }
}
