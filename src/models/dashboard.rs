// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::ToSchema;

// --- Linhas cruas vindas do banco ---

// Soma de saídas por (tipo, tamanho) no mês
#[derive(Debug, Clone, FromRow)]
pub struct ItemTotalRow {
    pub tipo: String,
    pub tamanho: Option<String>,
    pub total: i64,
}

// Cada saldo com o total de saídas dos últimos 30 dias (0 se não saiu nada)
#[derive(Debug, Clone, FromRow)]
pub struct ItemActivityRow {
    pub id: i32,
    pub tipo: String,
    pub tamanho: Option<String>,
    pub saldo: i32,
    pub saidas_30d: i64,
}

// Uma saída dos últimos 30 dias, agregada por semana no serviço
#[derive(Debug, Clone, FromRow)]
pub struct ExitRow {
    pub tipo: String,
    pub tamanho: Option<String>,
    pub quantidade: i32,
    pub data: DateTime<Utc>,
}

// --- 1. Resumo do mês (GET /dashboard/resumo) ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RankingEntry {
    pub item: String,
    pub qtd: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlySummary {
    pub mes_referencia: String, // "10/2026"
    pub entradas: i64,
    pub saidas: i64,
    pub balanco_liquido: i64,
    pub ranking_saidas: Vec<RankingEntry>,
}

// --- 2. Planejamento (GET /dashboard/planejamento) ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StalledItem {
    pub item: String,
    pub saidas_30d: i64,
    pub estoque_parado: i32,
}

// Cobertura do estoque pela média móvel simples de 30 dias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CoverageEntry {
    pub item: String,
    pub saldo: i32,
    pub media_diaria: Decimal,
    pub dias_cobertura: i64,
}

// { "name": "Macacão", "P": 10.5, "M": 20.0 }
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionRow {
    pub name: String,
    #[serde(flatten)]
    pub medias: BTreeMap<String, Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlanningResponse {
    pub menos_movimentados: Vec<StalledItem>,
    pub previsao_dias: Vec<CoverageEntry>,
    #[schema(value_type = Vec<Object>)]
    pub grafico_consumo: Vec<ConsumptionRow>,
    pub lista_tamanhos: Vec<String>,
}
