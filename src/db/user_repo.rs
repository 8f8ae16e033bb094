// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'sicro.usuarios'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT id, username, hashed_password, role FROM sicro.usuarios WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    pub async fn list_all(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, hashed_password, role FROM sicro.usuarios ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    // Cria um novo usuário no banco de dados
    // Com tratamento de erro específico para usernames duplicados.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        username: &str,
        hashed_password: &str,
        role: Role,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO sicro.usuarios (username, hashed_password, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, hashed_password, role
            "#,
        )
        .bind(username)
        .bind(hashed_password)
        .bind(role.as_str())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UsernameAlreadyExists;
                }
            }
            e.into()
        })
    }

    /// Remove o usuário; devolve o registro apagado, se existia.
    pub async fn delete_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let deleted = sqlx::query_as::<_, User>(
            "DELETE FROM sicro.usuarios WHERE id = $1 RETURNING id, username, hashed_password, role",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(deleted)
    }
}
