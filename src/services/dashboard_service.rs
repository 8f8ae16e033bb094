// src/services/dashboard_service.rs

use anyhow::anyhow;
use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::{
        catalog::{chart_size_rank, item_label, type_rank, TAMANHO_PADRAO},
        dashboard::{
            ConsumptionRow, CoverageEntry, ExitRow, ItemActivityRow, MonthlySummary,
            PlanningResponse, RankingEntry, StalledItem,
        },
        inventory::MovementAction,
    },
};

const RANKING_LIMIT: i64 = 5;
const STALLED_LIMIT: usize = 5;
const FORECAST_LIMIT: usize = 5;
const WINDOW_DAYS: i64 = 30;

/// Mês corrente no fuso da unidade: (início, início do mês seguinte, "M/YYYY").
pub fn month_window(
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<(DateTime<Utc>, DateTime<Utc>, String), AppError> {
    let local = now.with_timezone(&offset);
    let (year, month) = (local.year(), local.month());
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };

    let start = offset
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| anyhow!("início de mês inválido: {month}/{year}"))?;
    let end = offset
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| anyhow!("início de mês inválido: {next_month}/{next_year}"))?;

    Ok((
        start.with_timezone(&Utc),
        end.with_timezone(&Utc),
        format!("{month}/{year}"),
    ))
}

/// Os que menos saíram nos últimos 30 dias (empate: o mais antigo primeiro).
pub fn stalled_items(rows: &[ItemActivityRow]) -> Vec<StalledItem> {
    let mut sorted: Vec<&ItemActivityRow> = rows.iter().collect();
    sorted.sort_by_key(|r| (r.saidas_30d, r.id));
    sorted
        .into_iter()
        .take(STALLED_LIMIT)
        .map(|r| StalledItem {
            item: item_label(&r.tipo, r.tamanho.as_deref()),
            saidas_30d: r.saidas_30d,
            estoque_parado: r.saldo,
        })
        .collect()
}

/// Dias de cobertura pela média móvel simples de 30 dias. Só entra quem teve saída.
pub fn coverage_forecast(rows: &[ItemActivityRow]) -> Vec<CoverageEntry> {
    let mut entries: Vec<CoverageEntry> = rows
        .iter()
        .filter(|r| r.saidas_30d > 0)
        .map(|r| {
            let media = (Decimal::from(r.saidas_30d) / Decimal::from(WINDOW_DAYS))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            CoverageEntry {
                item: item_label(&r.tipo, r.tamanho.as_deref()),
                saldo: r.saldo,
                media_diaria: media,
                // saldo / (saidas / 30), em inteiros
                dias_cobertura: i64::from(r.saldo) * WINDOW_DAYS / r.saidas_30d,
            }
        })
        .collect();

    entries.sort_by(|a, b| a.dias_cobertura.cmp(&b.dias_cobertura).then_with(|| a.item.cmp(&b.item)));
    entries.truncate(FORECAST_LIMIT);
    entries
}

/// Consumo médio semanal por tipo e tamanho.
///
/// Soma as saídas por (tipo, tamanho, semana ISO) e tira a média entre as semanas
/// em que houve saída. Sem tamanho vai para o balde "Padrão".
pub fn weekly_consumption(rows: &[ExitRow], offset: FixedOffset) -> (Vec<ConsumptionRow>, Vec<String>) {
    // (tipo, tamanho) -> semana -> total
    let mut por_semana: HashMap<(String, String), BTreeMap<(i32, u32), i64>> = HashMap::new();

    for row in rows {
        let tamanho = row
            .tamanho
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(TAMANHO_PADRAO)
            .to_string();
        let semana = row.data.with_timezone(&offset).iso_week();

        *por_semana
            .entry((row.tipo.clone(), tamanho))
            .or_default()
            .entry((semana.year(), semana.week()))
            .or_insert(0) += i64::from(row.quantidade);
    }

    let mut por_tipo: BTreeMap<(usize, String), BTreeMap<String, Decimal>> = BTreeMap::new();
    let mut tamanhos: BTreeSet<(usize, String)> = BTreeSet::new();

    for ((tipo, tamanho), semanas) in por_semana {
        let total: i64 = semanas.values().sum();
        let media = (Decimal::from(total) / Decimal::from(semanas.len() as i64))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

        tamanhos.insert((chart_size_rank(&tamanho), tamanho.clone()));
        por_tipo
            .entry((type_rank(&tipo), tipo))
            .or_default()
            .insert(tamanho, media);
    }

    let grafico = por_tipo
        .into_iter()
        .map(|((_, name), medias)| ConsumptionRow { name, medias })
        .collect();
    let lista = tamanhos.into_iter().map(|(_, t)| t).collect();

    (grafico, lista)
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    facility_offset: FixedOffset,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, facility_offset: FixedOffset) -> Self {
        Self { repo, facility_offset }
    }

    pub async fn monthly_summary(&self, now: DateTime<Utc>) -> Result<MonthlySummary, AppError> {
        let (inicio, fim, mes_referencia) = month_window(now, self.facility_offset)?;

        // Snapshot único: as três consultas enxergam o mesmo estado do livro
        let mut tx = self.repo.pool().begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let entradas = self
            .repo
            .sum_by_action(&mut *tx, MovementAction::Entrada, inicio, fim)
            .await?;
        let saidas = self
            .repo
            .sum_by_action(&mut *tx, MovementAction::Saida, inicio, fim)
            .await?;
        let ranking = self.repo.top_exits(&mut *tx, inicio, fim, RANKING_LIMIT).await?;

        tx.commit().await?;

        Ok(MonthlySummary {
            mes_referencia,
            entradas,
            saidas,
            balanco_liquido: entradas - saidas,
            ranking_saidas: ranking
                .into_iter()
                .map(|r| RankingEntry {
                    item: item_label(&r.tipo, r.tamanho.as_deref()),
                    qtd: r.total,
                })
                .collect(),
        })
    }

    pub async fn planning(&self, now: DateTime<Utc>) -> Result<PlanningResponse, AppError> {
        let desde = now - Duration::days(WINDOW_DAYS);

        let mut tx = self.repo.pool().begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let atividade = self.repo.item_activity(&mut *tx, desde).await?;
        let saidas = self.repo.exits_since(&mut *tx, desde).await?;

        tx.commit().await?;

        let (grafico_consumo, lista_tamanhos) = weekly_consumption(&saidas, self.facility_offset);

        Ok(PlanningResponse {
            menos_movimentados: stalled_items(&atividade),
            previsao_dias: coverage_forecast(&atividade),
            grafico_consumo,
            lista_tamanhos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{testing::TestDb, MovementRepository, StockRepository},
        models::{
            auth::{Principal, Role},
            inventory::{MovementItem, MovementRequest},
        },
        services::movement_service::MovementService,
    };

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn exit(tipo: &str, tamanho: Option<&str>, quantidade: i32, data: &str) -> ExitRow {
        ExitRow {
            tipo: tipo.into(),
            tamanho: tamanho.map(str::to_string),
            quantidade,
            data: at(data),
        }
    }

    fn activity(id: i32, tipo: &str, tamanho: Option<&str>, saldo: i32, saidas: i64) -> ItemActivityRow {
        ItemActivityRow {
            id,
            tipo: tipo.into(),
            tamanho: tamanho.map(str::to_string),
            saldo,
            saidas_30d: saidas,
        }
    }

    #[test]
    fn month_window_follows_facility_time_zone() {
        // 1º de novembro 01:00 UTC ainda é 31 de outubro em Brasília
        let (inicio, fim, label) = month_window(at("2026-11-01T01:00:00Z"), brt()).unwrap();
        assert_eq!(label, "10/2026");
        assert_eq!(inicio, at("2026-10-01T03:00:00Z"));
        assert_eq!(fim, at("2026-11-01T03:00:00Z"));

        let (_, fim, label) = month_window(at("2026-12-15T12:00:00Z"), brt()).unwrap();
        assert_eq!(label, "12/2026");
        assert_eq!(fim, at("2027-01-01T03:00:00Z"));
    }

    #[test]
    fn weekly_average_groups_by_iso_week_and_size() {
        let rows = vec![
            // semana 41/2026
            exit("Macacão", Some("M"), 10, "2026-10-06T12:00:00Z"),
            exit("Macacão", Some("M"), 5, "2026-10-08T12:00:00Z"),
            // semana 42/2026
            exit("Macacão", Some("M"), 6, "2026-10-13T12:00:00Z"),
            exit("Macacão", Some("PP"), 3, "2026-10-13T12:00:00Z"),
            exit("Botas", None, 4, "2026-10-14T12:00:00Z"),
            exit("Botas", Some(""), 1, "2026-10-07T12:00:00Z"),
        ];

        let (grafico, lista) = weekly_consumption(&rows, brt());

        assert_eq!(lista, vec!["PP", "M", "Padrão"]);
        assert_eq!(grafico.len(), 2);

        assert_eq!(grafico[0].name, "Macacão");
        // (15 + 6) / 2 semanas
        assert_eq!(grafico[0].medias["M"], Decimal::new(105, 1));
        assert_eq!(grafico[0].medias["PP"], Decimal::from(3));

        assert_eq!(grafico[1].name, "Botas");
        // (1 + 4) / 2 semanas, sem tamanho
        assert_eq!(grafico[1].medias[TAMANHO_PADRAO], Decimal::new(25, 1));
    }

    #[test]
    fn weekly_average_rounds_to_one_decimal() {
        let rows = vec![
            exit("Panos", None, 10, "2026-09-22T12:00:00Z"),
            exit("Panos", None, 0, "2026-09-29T12:00:00Z"),
            exit("Panos", None, 0, "2026-10-06T12:00:00Z"),
        ];
        let (grafico, _) = weekly_consumption(&rows, brt());
        assert_eq!(grafico[0].medias[TAMANHO_PADRAO], Decimal::new(33, 1));

        let json = serde_json::to_value(&grafico[0]).unwrap();
        assert_eq!(json["name"], "Panos");
        assert_eq!(json["Padrão"], 3.3);
    }

    #[test]
    fn unknown_types_and_sizes_go_last() {
        let rows = vec![
            exit("Jaleco", Some("XG"), 1, "2026-10-06T12:00:00Z"),
            exit("Óculos", Some("G"), 1, "2026-10-06T12:00:00Z"),
        ];
        let (grafico, lista) = weekly_consumption(&rows, brt());
        assert_eq!(grafico[0].name, "Óculos");
        assert_eq!(grafico[1].name, "Jaleco");
        assert_eq!(lista, vec!["G", "XG"]);
    }

    #[test]
    fn stalled_items_are_the_least_moved() {
        let rows = vec![
            activity(1, "Macacão", Some("M"), 40, 30),
            activity(2, "Macacão", Some("G"), 12, 0),
            activity(3, "Botas", Some("P"), 8, 2),
            activity(4, "Panos", None, 100, 0),
            activity(5, "Óculos", None, 5, 7),
            activity(6, "Botas", Some("G"), 9, 1),
        ];

        let stalled = stalled_items(&rows);
        let labels: Vec<&str> = stalled.iter().map(|s| s.item.as_str()).collect();
        assert_eq!(labels, vec!["Macacão G", "Panos", "Botas G", "Botas P", "Óculos"]);
        assert_eq!(stalled[1].estoque_parado, 100);
        assert_eq!(stalled[1].saidas_30d, 0);
    }

    #[test]
    fn coverage_uses_simple_moving_average() {
        let rows = vec![
            activity(1, "Macacão", Some("M"), 40, 30), // 1/dia -> 40 dias
            activity(2, "Botas", Some("P"), 10, 60),   // 2/dia -> 5 dias
            activity(3, "Panos", None, 100, 0),        // sem consumo, fora
        ];

        let forecast = coverage_forecast(&rows);
        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast[0].item, "Botas P");
        assert_eq!(forecast[0].dias_cobertura, 5);
        assert_eq!(forecast[0].media_diaria, Decimal::from(2));
        assert_eq!(forecast[1].dias_cobertura, 40);
    }

    #[test]
    fn no_exits_means_empty_planning_views() {
        let (grafico, lista) = weekly_consumption(&[], brt());
        assert!(grafico.is_empty());
        assert!(lista.is_empty());
        assert!(coverage_forecast(&[]).is_empty());
        assert!(stalled_items(&[]).is_empty());
    }

    fn mov(tipo: &str, tamanho: Option<&str>, quantidade: i32, acao: MovementAction) -> MovementItem {
        MovementItem {
            tipo: tipo.into(),
            tamanho: tamanho.map(str::to_string),
            quantidade,
            acao,
        }
    }

    #[tokio::test]
    async fn postgres_dashboard_reads_the_ledger() {
        let Some(db) = TestDb::create().await else { return };
        let movimentos = MovementService::new(
            StockRepository::new(db.pool.clone()),
            MovementRepository::new(db.pool.clone()),
            db.pool.clone(),
            brt(),
        );
        let admin = Principal { username: "admin".into(), role: Role::Admin };
        use MovementAction::{Entrada, Saida};

        movimentos
            .process_batch(
                &admin,
                &MovementRequest {
                    itens: vec![
                        mov("Macacão", Some("M"), 10, Entrada),
                        mov("Botas", Some("G"), 5, Entrada),
                        mov("Panos", None, 4, Entrada),
                    ],
                },
            )
            .await
            .unwrap();
        movimentos
            .process_batch(
                &admin,
                &MovementRequest {
                    itens: vec![mov("Macacão", Some("M"), 3, Saida), mov("Panos", None, 1, Saida)],
                },
            )
            .await
            .unwrap();

        let dashboard = DashboardService::new(DashboardRepository::new(db.pool.clone()), brt());
        let agora = Utc::now();

        let resumo = dashboard.monthly_summary(agora).await.unwrap();
        assert_eq!(resumo.entradas, 19);
        assert_eq!(resumo.saidas, 4);
        assert_eq!(resumo.balanco_liquido, 15);
        assert_eq!(
            resumo.ranking_saidas,
            vec![
                RankingEntry { item: "Macacão M".into(), qtd: 3 },
                RankingEntry { item: "Panos".into(), qtd: 1 },
            ]
        );

        let plano = dashboard.planning(agora).await.unwrap();

        // LEFT JOIN: Botas G sem saída entra com 0; Panos (sem tamanho) casa com as suas saídas
        let parados: Vec<(&str, i64, i32)> = plano
            .menos_movimentados
            .iter()
            .map(|p| (p.item.as_str(), p.saidas_30d, p.estoque_parado))
            .collect();
        assert_eq!(parados, vec![("Botas G", 0, 5), ("Panos", 1, 3), ("Macacão M", 3, 7)]);

        let cobertura: Vec<(&str, i64)> = plano
            .previsao_dias
            .iter()
            .map(|c| (c.item.as_str(), c.dias_cobertura))
            .collect();
        assert_eq!(cobertura, vec![("Macacão M", 70), ("Panos", 90)]);

        assert_eq!(plano.lista_tamanhos, vec!["M", TAMANHO_PADRAO]);
        assert_eq!(plano.grafico_consumo[0].name, "Macacão");
        assert_eq!(plano.grafico_consumo[0].medias["M"], Decimal::from(3));
        assert_eq!(plano.grafico_consumo[1].name, "Panos");
        assert_eq!(plano.grafico_consumo[1].medias[TAMANHO_PADRAO], Decimal::from(1));

        db.drop_database().await;
    }
}
