// src/services/stock_service.rs

use chrono::FixedOffset;

use crate::{
    common::error::AppError,
    db::{MovementRepository, StockRepository},
    models::{
        catalog::sort_balances,
        inventory::{HistoryEntry, StockItem},
    },
};

pub const HISTORY_MAX_LIMIT: i64 = 200;

/// Limite do histórico: padrão e teto de 200, mínimo 1.
pub fn history_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(HISTORY_MAX_LIMIT)
        .clamp(1, HISTORY_MAX_LIMIT)
}

// Consultas de leitura do estoque: saldos e histórico.
#[derive(Clone)]
pub struct StockService {
    stock_repo: StockRepository,
    movement_repo: MovementRepository,
    facility_offset: FixedOffset,
}

impl StockService {
    pub fn new(
        stock_repo: StockRepository,
        movement_repo: MovementRepository,
        facility_offset: FixedOffset,
    ) -> Self {
        Self { stock_repo, movement_repo, facility_offset }
    }

    pub async fn list_balances(&self) -> Result<Vec<StockItem>, AppError> {
        let mut items = self.stock_repo.list_all().await?;
        sort_balances(&mut items);
        Ok(items)
    }

    pub async fn list_history(&self, limit: Option<i64>) -> Result<Vec<HistoryEntry>, AppError> {
        let records = self.movement_repo.list_recent(history_limit(limit)).await?;
        Ok(records
            .into_iter()
            .map(|r| r.into_history(self.facility_offset))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::testing::TestDb,
        models::{
            auth::{Principal, Role},
            catalog::item_label,
            inventory::{MovementAction, MovementItem, MovementRequest},
        },
        services::movement_service::MovementService,
    };
    use chrono::{Duration, Utc};
    use sqlx::PgPool;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn pg_service(pool: &PgPool) -> StockService {
        StockService::new(
            StockRepository::new(pool.clone()),
            MovementRepository::new(pool.clone()),
            brt(),
        )
    }

    #[test]
    fn history_limit_is_capped() {
        assert_eq!(history_limit(None), 200);
        assert_eq!(history_limit(Some(50)), 50);
        assert_eq!(history_limit(Some(10_000)), 200);
        assert_eq!(history_limit(Some(0)), 1);
        assert_eq!(history_limit(Some(-5)), 1);
    }

    #[tokio::test]
    async fn postgres_balances_are_canonical_whatever_the_insertion_order() {
        let Some(db) = TestDb::create().await else { return };

        let armazenados: [(&str, Option<&str>); 7] = [
            ("Óculos", None),
            ("Jaleco", None),
            ("Macacão", Some("G")),
            ("Botas", Some("P")),
            ("Macacão", Some("PP")),
            ("Luvas", None),
            ("Macacão", None),
        ];
        for (tipo, tamanho) in armazenados {
            sqlx::query("INSERT INTO sicro.roupas (tipo, tamanho, saldo) VALUES ($1, $2, 1)")
                .bind(tipo)
                .bind(tamanho)
                .execute(&db.pool)
                .await
                .unwrap();
        }

        let saldos = pg_service(&db.pool).list_balances().await.unwrap();
        let ordem: Vec<String> = saldos
            .iter()
            .map(|i| item_label(&i.tipo, i.tamanho.as_deref()))
            .collect();
        assert_eq!(
            ordem,
            vec!["Macacão PP", "Macacão G", "Macacão", "Botas P", "Óculos", "Jaleco", "Luvas"]
        );

        db.drop_database().await;
    }

    #[tokio::test]
    async fn postgres_history_reads_back_what_the_batch_wrote() {
        let Some(db) = TestDb::create().await else { return };
        let movimentos = MovementService::new(
            StockRepository::new(db.pool.clone()),
            MovementRepository::new(db.pool.clone()),
            db.pool.clone(),
            brt(),
        );
        let admin = Principal { username: "admin".into(), role: Role::Admin };
        let request = MovementRequest {
            itens: vec![
                MovementItem {
                    tipo: "Macacão".into(),
                    tamanho: Some("M".into()),
                    quantidade: 5,
                    acao: MovementAction::Entrada,
                },
                MovementItem {
                    tipo: "Macacão".into(),
                    tamanho: Some("M".into()),
                    quantidade: 2,
                    acao: MovementAction::Saida,
                },
            ],
        };

        // timestamptz guarda microssegundos
        let antes = Utc::now() - Duration::milliseconds(1);
        let lote = movimentos.process_batch(&admin, &request).await.unwrap();
        let depois = Utc::now() + Duration::milliseconds(1);

        let historico = pg_service(&db.pool).list_history(None).await.unwrap();
        assert_eq!(historico.len(), 2);

        // mais recente primeiro
        assert_eq!(historico[0].acao, MovementAction::Saida);
        assert_eq!(historico[0].quantidade, 2);
        assert_eq!(historico[1].acao, MovementAction::Entrada);
        assert_eq!(historico[1].quantidade, 5);

        for entrada in &historico {
            assert_eq!(entrada.ordem_id, lote.ordem_id);
            assert_eq!(entrada.usuario, "admin");
            assert_eq!(entrada.tipo, "Macacão");
            assert_eq!(entrada.tamanho.as_deref(), Some("M"));
            assert_eq!(entrada.data.offset().local_minus_utc(), -3 * 3600);

            let data = entrada.data.with_timezone(&Utc);
            assert!(data >= antes && data <= depois, "{data} fora de [{antes}, {depois}]");
        }

        let ultimo = pg_service(&db.pool).list_history(Some(1)).await.unwrap();
        assert_eq!(ultimo.len(), 1);
        assert_eq!(ultimo[0].acao, MovementAction::Saida);

        db.drop_database().await;
    }
}
