// src/db/stock_ledger.rs

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::{
    common::error::AppError,
    db::{MovementRepository, StockRepository},
    models::inventory::NewMovement,
    services::movement_service::StockLedger,
};

// O StockLedger de produção: tudo passa pela mesma transação do lote.
// Se o future for descartado antes do commit, o drop da transação faz o rollback.
pub struct PgStockLedger<'t> {
    tx: &'t mut Transaction<'static, Postgres>,
    stock_repo: &'t StockRepository,
    movement_repo: &'t MovementRepository,
}

impl<'t> PgStockLedger<'t> {
    pub fn new(
        tx: &'t mut Transaction<'static, Postgres>,
        stock_repo: &'t StockRepository,
        movement_repo: &'t MovementRepository,
    ) -> Self {
        Self { tx, stock_repo, movement_repo }
    }
}

#[async_trait]
impl<'t> StockLedger for PgStockLedger<'t> {
    async fn lock_balance(&mut self, tipo: &str, tamanho: Option<&str>) -> Result<Option<i32>, AppError> {
        self.stock_repo.find_for_update(&mut **self.tx, tipo, tamanho).await
    }

    async fn credit(&mut self, tipo: &str, tamanho: Option<&str>, quantidade: i32) -> Result<i32, AppError> {
        self.stock_repo.credit(&mut **self.tx, tipo, tamanho, quantidade).await
    }

    async fn debit(&mut self, tipo: &str, tamanho: Option<&str>, quantidade: i32) -> Result<i32, AppError> {
        self.stock_repo.debit(&mut **self.tx, tipo, tamanho, quantidade).await
    }

    async fn append(&mut self, movement: &NewMovement) -> Result<(), AppError> {
        self.movement_repo.record(&mut **self.tx, movement).await
    }
}
