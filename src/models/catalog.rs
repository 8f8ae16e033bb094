// src/models/catalog.rs
//
// Ordem de exibição das roupas. É conveniência de tela, não regra de armazenamento.

use crate::models::inventory::StockItem;

pub const ORDEM_TIPOS: [&str; 4] = ["Macacão", "Botas", "Panos", "Óculos"];
pub const ORDEM_TAMANHOS: [&str; 7] = ["PP", "P", "M", "G", "GG", "G3", "G4"];

// Balde dos registros sem tamanho no gráfico de consumo
pub const TAMANHO_PADRAO: &str = "Padrão";

pub fn type_rank(tipo: &str) -> usize {
    ORDEM_TIPOS
        .iter()
        .position(|t| *t == tipo)
        .unwrap_or(usize::MAX)
}

pub fn size_rank(tamanho: Option<&str>) -> usize {
    tamanho
        .and_then(|t| ORDEM_TAMANHOS.iter().position(|s| *s == t))
        .unwrap_or(usize::MAX)
}

/// Posição de uma coluna de tamanho no gráfico: PP..G4, depois "Padrão", depois o resto.
pub fn chart_size_rank(tamanho: &str) -> usize {
    if tamanho == TAMANHO_PADRAO {
        return ORDEM_TAMANHOS.len();
    }
    ORDEM_TAMANHOS
        .iter()
        .position(|s| *s == tamanho)
        .unwrap_or(usize::MAX)
}

/// Ordena saldos por tipo e depois tamanho. Ordenação estável: desconhecidos
/// mantêm a ordem em que vieram do banco.
pub fn sort_balances(items: &mut [StockItem]) {
    items.sort_by_key(|i| (type_rank(&i.tipo), size_rank(i.tamanho.as_deref())));
}

/// "Macacão M", ou só "Botas" quando não há tamanho.
pub fn item_label(tipo: &str, tamanho: Option<&str>) -> String {
    format!("{} {}", tipo, tamanho.unwrap_or("")).trim().to_string()
}
