// src/db/movement_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use crate::{
    common::error::AppError,
    models::inventory::{MovementRecord, NewMovement},
};

// Livro de movimentações. Só INSERT e SELECT: nada aqui altera ou apaga registros.
#[derive(Clone)]
pub struct MovementRepository {
    pool: PgPool,
}

impl MovementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registra uma movimentação no livro-razão (auditoria).
    pub async fn record<'e, E>(&self, executor: E, movement: &NewMovement) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO sicro.movimentacoes (ordem_id, usuario, tipo, tamanho, quantidade, acao, data)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&movement.ordem_id)
        .bind(&movement.usuario)
        .bind(&movement.tipo)
        .bind(movement.tamanho.as_deref())
        .bind(movement.quantidade)
        .bind(movement.acao.as_str())
        .bind(movement.data)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// As `limit` movimentações mais recentes.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<MovementRecord>, AppError> {
        let records = sqlx::query_as::<_, MovementRecord>(
            r#"
            SELECT ordem_id, usuario, tipo, tamanho, quantidade, acao, data
            FROM sicro.movimentacoes
            ORDER BY data DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}
