// src/middleware/fingerprint.rs

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use axum_extra::headers::{HeaderMapExt, UserAgent};
use std::net::SocketAddr;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const UNKNOWN: &str = "unknown";

// IP + user-agent do cliente. Vai dentro do refresh token e é conferido no /refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFingerprint {
    pub ip: String,
    pub agent: String,
}

impl ClientFingerprint {
    pub fn from_parts(parts: &Parts) -> Self {
        // Atrás de proxy vale o primeiro endereço do X-Forwarded-For
        let forwarded = parts
            .headers
            .get(FORWARDED_FOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let ip = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| UNKNOWN.to_string());

        let agent = parts
            .headers
            .typed_get::<UserAgent>()
            .map(|ua| ua.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self { ip, agent }
    }
}

impl<S> FromRequestParts<S> for ClientFingerprint
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
