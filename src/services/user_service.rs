// src/services/user_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{CreateUserPayload, Role, UserResponse},
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(user_repo: UserRepository, pool: PgPool) -> Self {
        Self { user_repo, pool }
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.user_repo.list_all().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn create_user(&self, payload: &CreateUserPayload) -> Result<UserResponse, AppError> {
        // 1. Hashing (fora de transação, não toca no banco)
        let hashed_password = hash_password(&payload.senha).await?;

        // 2. Grava; username duplicado vira 409
        let user = self
            .user_repo
            .create_user(&self.pool, payload.username.trim(), &hashed_password, payload.role)
            .await?;

        tracing::info!(username = %user.username, role = %user.role, "👤 Usuário criado");
        Ok(user.into())
    }

    pub async fn delete_user(&self, id: i32) -> Result<UserResponse, AppError> {
        let user = self
            .user_repo
            .delete_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        tracing::info!(username = %user.username, "🗑️ Usuário removido");
        Ok(user.into())
    }

    /// Cria o admin inicial se ele ainda não existir (ADMIN_USERNAME / ADMIN_PASSWORD).
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<bool, AppError> {
        if self.user_repo.find_by_username(username).await?.is_some() {
            return Ok(false);
        }

        let hashed_password = hash_password(password).await?;
        match self
            .user_repo
            .create_user(&self.pool, username, &hashed_password, Role::Admin)
            .await
        {
            Ok(_) => Ok(true),
            // Outra instância criou primeiro
            Err(AppError::UsernameAlreadyExists) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::TestDb;

    fn payload(username: &str, role: Role) -> CreateUserPayload {
        CreateUserPayload {
            username: username.to_string(),
            senha: "segredo123".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn postgres_user_lifecycle() {
        let Some(db) = TestDb::create().await else { return };
        let service = UserService::new(UserRepository::new(db.pool.clone()), db.pool.clone());

        let ana = service.create_user(&payload(" ana ", Role::User)).await.unwrap();
        assert_eq!(ana.username, "ana");
        assert_eq!(ana.role, Role::User);

        let dup = service.create_user(&payload("ana", Role::Admin)).await.unwrap_err();
        assert!(matches!(dup, AppError::UsernameAlreadyExists));

        assert!(service.ensure_admin("chefe", "segredo-forte").await.unwrap());
        assert!(!service.ensure_admin("chefe", "outra-senha").await.unwrap());

        let users = service.list_users().await.unwrap();
        let resumo: Vec<(&str, Role)> = users.iter().map(|u| (u.username.as_str(), u.role)).collect();
        assert_eq!(resumo, vec![("ana", Role::User), ("chefe", Role::Admin)]);

        let removido = service.delete_user(ana.id).await.unwrap();
        assert_eq!(removido.username, "ana");
        assert!(matches!(service.delete_user(ana.id).await, Err(AppError::UserNotFound)));

        db.drop_database().await;
    }
}
