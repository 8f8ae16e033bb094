// src/services/movement_service.rs

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{MovementRepository, PgStockLedger, StockRepository},
    models::{
        auth::Principal,
        inventory::{BatchResult, MovementAction, MovementItem, MovementRequest, NewMovement},
    },
};

/// Onde o processador lê e grava saldos e movimentações.
///
/// Em produção é uma transação do Postgres ([`PgStockLedger`]); todas as chamadas de
/// um lote acontecem dentro dela, então saldo e registro sempre são gravados juntos.
#[async_trait]
pub trait StockLedger: Send {
    /// Saldo atual do par, travado até o fim da transação. `None` se o par não existe.
    async fn lock_balance(&mut self, tipo: &str, tamanho: Option<&str>) -> Result<Option<i32>, AppError>;

    /// Soma ao saldo, criando o par se preciso. Devolve o novo saldo.
    async fn credit(&mut self, tipo: &str, tamanho: Option<&str>, quantidade: i32) -> Result<i32, AppError>;

    /// Subtrai de um saldo já validado. Devolve o novo saldo.
    async fn debit(&mut self, tipo: &str, tamanho: Option<&str>, quantidade: i32) -> Result<i32, AppError>;

    async fn append(&mut self, movement: &NewMovement) -> Result<(), AppError>;
}

/// O que fazer com uma saída, dado o saldo travado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Apply,
    NotFound,
    Insufficient { disponivel: i32 },
}

pub fn resolve_exit(saldo_atual: Option<i32>, quantidade: i32) -> ExitDecision {
    match saldo_atual {
        None => ExitDecision::NotFound,
        Some(saldo) if saldo < quantidade => ExitDecision::Insufficient { disponivel: saldo },
        Some(_) => ExitDecision::Apply,
    }
}

/// "ORD-20261018-091500-3fa2": hora local da unidade + 4 hex aleatórios.
pub fn generate_order_id(now: DateTime<Utc>, offset: FixedOffset) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "ORD-{}-{}",
        now.with_timezone(&offset).format("%Y%m%d-%H%M%S"),
        &suffix[..4]
    )
}

/// Aplica os itens na ordem em que chegaram.
///
/// Cada item é independente: "não encontrado" e "saldo insuficiente" viram mensagem
/// e o lote segue. Um par repetido no mesmo lote enxerga o saldo deixado pelos itens
/// anteriores (não há segunda passada). Só erro de infraestrutura interrompe.
pub async fn apply_batch<L>(
    ledger: &mut L,
    ordem_id: &str,
    usuario: &str,
    itens: &[MovementItem],
) -> Result<Vec<String>, AppError>
where
    L: StockLedger + ?Sized,
{
    let mut mensagens = Vec::with_capacity(itens.len());

    for item in itens {
        let tipo = item.tipo();
        let tamanho = item.tamanho();
        let quantidade = item.quantidade;
        let label = item.label();

        let mensagem = match item.acao {
            MovementAction::Entrada => {
                let saldo = ledger.credit(tipo, tamanho, quantidade).await?;
                tracing::debug!(%ordem_id, item = %label, quantidade, saldo, "entrada aplicada");
                format!("Entrada de {} {}", quantidade, label)
            }
            MovementAction::Saida => match resolve_exit(ledger.lock_balance(tipo, tamanho).await?, quantidade) {
                ExitDecision::NotFound => {
                    tracing::warn!(%ordem_id, item = %label, "saída recusada: item não encontrado");
                    mensagens.push(format!("Erro: {} não encontrado", label));
                    continue;
                }
                ExitDecision::Insufficient { disponivel } => {
                    tracing::warn!(
                        %ordem_id, item = %label, quantidade, disponivel,
                        "saída recusada: saldo insuficiente"
                    );
                    mensagens.push(format!("Erro: saldo insuficiente para {}", label));
                    continue;
                }
                ExitDecision::Apply => {
                    let saldo = ledger.debit(tipo, tamanho, quantidade).await?;
                    tracing::debug!(%ordem_id, item = %label, quantidade, saldo, "saída aplicada");
                    format!("Saída de {} {}", quantidade, label)
                }
            },
        };

        // Só itens aplicados chegam aqui: item recusado não gera registro
        ledger
            .append(&NewMovement {
                ordem_id: ordem_id.to_string(),
                usuario: usuario.to_string(),
                tipo: tipo.to_string(),
                tamanho: tamanho.map(str::to_string),
                quantidade,
                acao: item.acao,
                data: Utc::now(),
            })
            .await?;

        mensagens.push(mensagem);
    }

    Ok(mensagens)
}

#[derive(Clone)]
pub struct MovementService {
    stock_repo: StockRepository,
    movement_repo: MovementRepository,
    pool: PgPool,
    facility_offset: FixedOffset,
}

impl MovementService {
    pub fn new(
        stock_repo: StockRepository,
        movement_repo: MovementRepository,
        pool: PgPool,
        facility_offset: FixedOffset,
    ) -> Self {
        Self { stock_repo, movement_repo, pool, facility_offset }
    }

    pub async fn process_batch(
        &self,
        principal: &Principal,
        request: &MovementRequest,
    ) -> Result<BatchResult, AppError> {
        // 1. Só admin movimenta. Nada foi tocado até aqui.
        if !principal.is_admin() {
            return Err(AppError::Forbidden(
                "Apenas administradores podem movimentar estoque.".to_string(),
            ));
        }

        let ordem_id = generate_order_id(Utc::now(), self.facility_offset);

        // 2. Uma transação para o lote inteiro
        let mut tx = self.pool.begin().await?;

        let mensagens = {
            let mut ledger = PgStockLedger::new(&mut tx, &self.stock_repo, &self.movement_repo);
            apply_batch(&mut ledger, &ordem_id, &principal.username, &request.itens).await?
        };

        // 3. Commit: saldos e registros dos itens aplicados aparecem juntos
        tx.commit().await?;

        tracing::info!(
            %ordem_id,
            usuario = %principal.username,
            itens = request.itens.len(),
            "📦 Lote de movimentação gravado"
        );

        Ok(BatchResult {
            status: "ok".to_string(),
            ordem_id,
            mensagem: mensagens,
        })
    }
}
