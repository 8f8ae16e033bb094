// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use crate::{
    common::error::AppError,
    models::{
        dashboard::{ExitRow, ItemActivityRow, ItemTotalRow},
        inventory::MovementAction,
    },
};

// Consultas só de leitura sobre o livro de movimentações.
// As janelas de tempo chegam prontas (em UTC) do serviço.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // 1. Total movimentado de uma ação no intervalo [desde, ate)
    pub async fn sum_by_action<'e, E>(
        &self,
        executor: E,
        acao: MovementAction,
        desde: DateTime<Utc>,
        ate: DateTime<Utc>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(quantidade), 0)::BIGINT
            FROM sicro.movimentacoes
            WHERE acao = $1 AND data >= $2 AND data < $3
            "#,
        )
        .bind(acao.as_str())
        .bind(desde)
        .bind(ate)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    // 2. Ranking dos pares com mais saídas no intervalo
    pub async fn top_exits<'e, E>(
        &self,
        executor: E,
        desde: DateTime<Utc>,
        ate: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ItemTotalRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ItemTotalRow>(
            r#"
            SELECT tipo, tamanho, SUM(quantidade)::BIGINT AS total
            FROM sicro.movimentacoes
            WHERE acao = 'saida' AND data >= $1 AND data < $2
            GROUP BY tipo, tamanho
            ORDER BY total DESC, tipo ASC, tamanho ASC NULLS LAST
            LIMIT $3
            "#,
        )
        .bind(desde)
        .bind(ate)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // 3. Todo saldo com as saídas desde `desde` (LEFT JOIN: quem não saiu fica com 0)
    pub async fn item_activity<'e, E>(
        &self,
        executor: E,
        desde: DateTime<Utc>,
    ) -> Result<Vec<ItemActivityRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ItemActivityRow>(
            r#"
            SELECT
                r.id,
                r.tipo,
                r.tamanho,
                r.saldo,
                COALESCE(SUM(m.quantidade), 0)::BIGINT AS saidas_30d
            FROM sicro.roupas r
            LEFT JOIN sicro.movimentacoes m
                   ON m.tipo = r.tipo
                  AND m.tamanho IS NOT DISTINCT FROM r.tamanho
                  AND m.acao = 'saida'
                  AND m.data >= $1
            GROUP BY r.id, r.tipo, r.tamanho, r.saldo
            ORDER BY r.id ASC
            "#,
        )
        .bind(desde)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // 4. Saídas cruas desde `desde`, para a média semanal por tamanho
    pub async fn exits_since<'e, E>(
        &self,
        executor: E,
        desde: DateTime<Utc>,
    ) -> Result<Vec<ExitRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ExitRow>(
            r#"
            SELECT tipo, tamanho, quantidade, data
            FROM sicro.movimentacoes
            WHERE acao = 'saida' AND data >= $1
            ORDER BY data ASC
            "#,
        )
        .bind(desde)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
