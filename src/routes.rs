// src/routes.rs

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn app_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/token", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/logout", post(handlers::auth::logout));

    // Tudo abaixo exige "Authorization: Bearer <access token>"
    let protected_routes = Router::new()
        .route("/saldo", get(handlers::inventory::get_saldo))
        .route("/movimentar", post(handlers::inventory::movimentar))
        .route("/historico", get(handlers::inventory::get_historico))
        .route("/dashboard/resumo", get(handlers::dashboard::get_resumo))
        .route(
            "/dashboard/planejamento",
            get(handlers::dashboard::get_planejamento),
        )
        .route(
            "/usuarios",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/usuarios/{id}", delete(handlers::users::delete_user))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cors = cors_layer(&app_state.config.cors_origins);

    // Combina tudo no router principal
    Router::new()
        .route("/", get(|| async { Json(json!({ "message": "API Sicro rodando" })) }))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api", auth_routes.merge(protected_routes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

// Com credenciais (cookie de refresh) o CORS não aceita curingas: tudo explícito.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origem = %o, "origem CORS inválida ignorada");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}
