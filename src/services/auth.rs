// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::{
    common::error::AppError,
    config::Config,
    db::UserRepository,
    middleware::fingerprint::ClientFingerprint,
    models::auth::{Claims, Principal, RefreshClaims, Role, TokenResponse, TokenType},
};

// Hash e verificação rodam fora do runtime assíncrono (bcrypt é caro de propósito).
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let hash_clone = hashed.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password_clone, &hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

// Hash usado quando o usuário não existe: o login paga o mesmo custo de bcrypt
// nos dois casos e o tempo de resposta não revela quais usernames existem.
static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

async fn dummy_hash() -> Result<&'static str, AppError> {
    let hashed = DUMMY_HASH
        .get_or_try_init(|| hash_password("sicro-usuario-inexistente"))
        .await?;
    Ok(hashed.as_str())
}

// Resultado do login: o access token vai no corpo, o refresh vai no cookie.
pub struct LoginTokens {
    pub response: TokenResponse,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, config: Arc<Config>) -> Self {
        Self { user_repo, config }
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        fingerprint: &ClientFingerprint,
    ) -> Result<LoginTokens, AppError> {
        let Some(user) = self.user_repo.find_by_username(username).await? else {
            verify_password(password, dummy_hash().await?).await?;
            tracing::warn!(%username, ip = %fingerprint.ip, "login recusado: usuário inexistente");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &user.hashed_password).await? {
            tracing::warn!(%username, ip = %fingerprint.ip, "login recusado: senha incorreta");
            return Err(AppError::InvalidCredentials);
        }

        let (access_token, expires_in) = self.create_access_token(&user.username, user.role)?;
        let refresh_token = self.create_refresh_token(&user.username, user.role, fingerprint)?;

        tracing::info!(%username, role = %user.role, "🔑 Login realizado");

        Ok(LoginTokens {
            response: TokenResponse {
                access_token,
                expires_in,
                token_type: "bearer".to_string(),
                role: Some(user.role),
            },
            refresh_token,
        })
    }

    /// Troca um refresh token por um novo access token.
    /// O token só vale para o mesmo IP e user-agent que fizeram o login.
    pub fn refresh(
        &self,
        refresh_token: &str,
        fingerprint: &ClientFingerprint,
    ) -> Result<TokenResponse, AppError> {
        let claims = decode::<RefreshClaims>(
            refresh_token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::InvalidToken)?
        .claims;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::InvalidToken);
        }

        if claims.ip != fingerprint.ip || claims.agent != fingerprint.agent {
            tracing::warn!(
                username = %claims.sub,
                esperado_ip = %claims.ip,
                ip = %fingerprint.ip,
                "refresh recusado: cliente diferente do login"
            );
            return Err(AppError::InvalidToken);
        }

        let (access_token, expires_in) = self.create_access_token(&claims.sub, claims.role)?;

        Ok(TokenResponse {
            access_token,
            expires_in,
            token_type: "bearer".to_string(),
            role: None,
        })
    }

    /// Valida o access token e devolve quem é o usuário. Não consulta o banco.
    pub fn verify(&self, token: &str) -> Result<Principal, AppError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::InvalidToken)?
        .claims;

        // Refresh token não serve como credencial de acesso
        if claims.token_type != TokenType::Access {
            return Err(AppError::InvalidToken);
        }

        Ok(Principal {
            username: claims.sub,
            role: claims.role,
        })
    }

    /// Devolve o token e o instante de expiração (unix).
    pub fn create_access_token(&self, username: &str, role: Role) -> Result<(String, i64), AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.config.access_token_minutes);

        let claims = Claims {
            sub: username.to_string(),
            role,
            token_type: TokenType::Access,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;

        Ok((token, expires_at.timestamp()))
    }

    fn create_refresh_token(
        &self,
        username: &str,
        role: Role,
        fingerprint: &ClientFingerprint,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.refresh_token_hours);

        let claims = RefreshClaims {
            sub: username.to_string(),
            role,
            ip: fingerprint.ip.clone(),
            agent: fingerprint.agent.clone(),
            token_type: TokenType::Refresh,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?)
    }
}
