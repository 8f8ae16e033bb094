// src/models/inventory.rs

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::catalog::item_label;

// --- 1. Saldo (tabela sicro.roupas) ---
// Uma linha por par (tipo, tamanho). Só o processador de movimentações altera o saldo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StockItem {
    pub tipo: String,
    pub tamanho: Option<String>,
    pub saldo: i32,
}

// --- 2. Ação da movimentação ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MovementAction {
    Entrada,
    Saida,
}

impl MovementAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementAction::Entrada => "entrada",
            MovementAction::Saida => "saida",
        }
    }
}

impl fmt::Display for MovementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("ação desconhecida: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for MovementAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entrada" => Ok(MovementAction::Entrada),
            "saida" => Ok(MovementAction::Saida),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

impl TryFrom<String> for MovementAction {
    type Error = UnknownAction;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// --- 3. Livro de movimentações (tabela sicro.movimentacoes) ---
// Imutável depois de gravado.
#[derive(Debug, Clone, FromRow)]
pub struct MovementRecord {
    pub ordem_id: String,
    pub usuario: String,
    pub tipo: String,
    pub tamanho: Option<String>,
    pub quantidade: i32,
    #[sqlx(try_from = "String")]
    pub acao: MovementAction,
    pub data: DateTime<Utc>,
}

// Registro ainda não persistido (o id vem do banco).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub ordem_id: String,
    pub usuario: String,
    pub tipo: String,
    pub tamanho: Option<String>,
    pub quantidade: i32,
    pub acao: MovementAction,
    pub data: DateTime<Utc>,
}

// Linha do histórico como o cliente vê: data no fuso da unidade.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryEntry {
    pub ordem_id: String,
    pub usuario: String,
    pub tipo: String,
    pub tamanho: Option<String>,
    pub quantidade: i32,
    pub acao: MovementAction,
    pub data: DateTime<FixedOffset>,
}

impl MovementRecord {
    pub fn into_history(self, offset: FixedOffset) -> HistoryEntry {
        HistoryEntry {
            ordem_id: self.ordem_id,
            usuario: self.usuario,
            tipo: self.tipo,
            tamanho: self.tamanho,
            quantidade: self.quantidade,
            acao: self.acao,
            data: self.data.with_timezone(&offset),
        }
    }
}

// --- 4. Payload do POST /movimentar ---

fn validate_tipo(tipo: &str) -> Result<(), ValidationError> {
    if tipo.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("O tipo da roupa é obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

// Serialize: o `length` do lote serializa a lista no erro de validação.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MovementItem {
    #[validate(custom(function = "validate_tipo"))]
    pub tipo: String,

    #[serde(default)]
    pub tamanho: Option<String>,

    #[validate(range(min = 1, message = "A quantidade deve ser um inteiro positivo."))]
    pub quantidade: i32,

    pub acao: MovementAction,
}

impl MovementItem {
    /// Tipo sem espaços nas pontas.
    pub fn tipo(&self) -> &str {
        self.tipo.trim()
    }

    /// Tamanho normalizado: "" e "  " contam como "sem tamanho".
    pub fn tamanho(&self) -> Option<&str> {
        self.tamanho
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn label(&self) -> String {
        item_label(self.tipo(), self.tamanho())
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MovementRequest {
    #[validate(
        length(min = 1, message = "Informe ao menos um item."),
        nested
    )]
    pub itens: Vec<MovementItem>,
}

// Resposta do lote: uma mensagem por item enviado, na mesma ordem.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchResult {
    pub status: String,
    pub ordem_id: String,
    pub mensagem: Vec<String>,
}

// ?limit=N (o serviço limita a 200)
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}
