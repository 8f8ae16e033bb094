// src/handlers/auth.rs

use axum::{extract::State, Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::{AppState, Config},
    middleware::fingerprint::ClientFingerprint,
    models::auth::{DetailResponse, LoginForm, TokenResponse},
};

pub const REFRESH_COOKIE: &str = "refresh_token";

// Cookie HttpOnly com a mesma validade do refresh JWT (sobrevive ao fechar o navegador).
pub fn refresh_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .path("/")
        .max_age(time::Duration::hours(config.refresh_token_hours))
        .build()
}

// POST /api/token (formulário OAuth2 password: username + password)
#[utoipa::path(
    post,
    path = "/api/token",
    tag = "Autenticação",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Access token no corpo; refresh token no cookie HttpOnly", body = TokenResponse),
        (status = 401, description = "Usuário ou senha inválidos"),
        (status = 422, description = "Formulário incompleto")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    fingerprint: ClientFingerprint,
    jar: CookieJar,
    Form(payload): Form<LoginForm>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    payload.validate()?;

    let tokens = app_state
        .auth_service
        .login(payload.username.trim(), &payload.password, &fingerprint)
        .await?;

    let cookie = refresh_cookie(tokens.refresh_token, &app_state.config);
    Ok((jar.add(cookie), Json(tokens.response)))
}

// POST /api/refresh
#[utoipa::path(
    post,
    path = "/api/refresh",
    tag = "Autenticação",
    responses(
        (status = 200, description = "Novo access token", body = TokenResponse),
        (status = 401, description = "Cookie ausente, expirado ou emitido para outro cliente")
    )
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    fingerprint: ClientFingerprint,
    jar: CookieJar,
) -> Result<Json<TokenResponse>, AppError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(AppError::InvalidToken)?;

    let response = app_state.auth_service.refresh(&token, &fingerprint)?;
    Ok(Json(response))
}

// POST /api/logout
#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "Autenticação",
    responses(
        (status = 200, description = "Cookie de refresh removido", body = DetailResponse)
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<DetailResponse>) {
    let jar = jar.remove(Cookie::build(REFRESH_COOKIE).path("/"));

    (
        jar,
        Json(DetailResponse {
            detail: "Logout realizado com sucesso".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_cookie_lives_as_long_as_the_refresh_token() {
        let config = Config::for_tests();
        let cookie = refresh_cookie("abc".to_string(), &config);

        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(config.refresh_token_hours * 3600))
        );
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));

        let header = cookie.to_string();
        assert!(header.contains("Max-Age=86400"), "{header}");
    }
}
