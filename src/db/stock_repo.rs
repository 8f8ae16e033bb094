// src/db/stock_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use crate::{common::error::AppError, models::inventory::StockItem};

// Saldo por (tipo, tamanho), tabela 'sicro.roupas'.
// O tamanho pode ser NULL, por isso as buscas usam IS NOT DISTINCT FROM.
#[derive(Clone)]
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    /// Todos os saldos na ordem em que foram criados (a ordem de tela é feita no serviço).
    pub async fn list_all(&self) -> Result<Vec<StockItem>, AppError> {
        let items = sqlx::query_as::<_, StockItem>(
            "SELECT tipo, tamanho, saldo FROM sicro.roupas ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    // ---
    // Escrita (sempre dentro da transação do lote)
    // ---

    /// Lê o saldo travando a linha até o fim da transação.
    /// Dois lotes mexendo no mesmo par ficam em fila aqui.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        tipo: &str,
        tamanho: Option<&str>,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saldo = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT saldo FROM sicro.roupas
            WHERE tipo = $1 AND tamanho IS NOT DISTINCT FROM $2
            FOR UPDATE
            "#,
        )
        .bind(tipo)
        .bind(tamanho)
        .fetch_optional(executor)
        .await?;
        Ok(saldo)
    }

    /// Entrada: cria o par com o saldo informado ou soma ao existente ("UPSERT" atômico).
    pub async fn credit<'e, E>(
        &self,
        executor: E,
        tipo: &str,
        tamanho: Option<&str>,
        quantidade: i32,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saldo = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO sicro.roupas (tipo, tamanho, saldo)
            VALUES ($1, $2, $3)
            ON CONFLICT (tipo, (COALESCE(tamanho, '')))
            DO UPDATE SET saldo = sicro.roupas.saldo + EXCLUDED.saldo
            RETURNING saldo
            "#,
        )
        .bind(tipo)
        .bind(tamanho)
        .bind(quantidade)
        .fetch_one(executor)
        .await?;
        Ok(saldo)
    }

    /// Saída já validada contra o saldo travado. O CHECK (saldo >= 0) da tabela é a última barreira.
    pub async fn debit<'e, E>(
        &self,
        executor: E,
        tipo: &str,
        tamanho: Option<&str>,
        quantidade: i32,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saldo = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE sicro.roupas
            SET saldo = saldo - $3
            WHERE tipo = $1 AND tamanho IS NOT DISTINCT FROM $2
            RETURNING saldo
            "#,
        )
        .bind(tipo)
        .bind(tamanho)
        .bind(quantidade)
        .fetch_one(executor)
        .await?;
        Ok(saldo)
    }
}
