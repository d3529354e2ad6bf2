//! Header normalization
//!
//! Spreadsheet headers arrive in loose Portuguese forms ("Valor Mensalidade do
//! Serviço/Acesório", "Termo (Contrato)", ...). They are folded to a canonical
//! text form and then looked up in a fixed synonym table.

mod synonyms;

use log::debug;

pub use synonyms::HEADER_SYNONYMS;

use crate::error::{RescissionError, Result};
use crate::table::RawTable;

/// Canonical fields that must be present after normalization
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "cliente",
    "classe",
    "termo",
    "servico_acessorio",
    "valor_mensalidade",
];

/// Every canonical column, in detailed-export order
pub const CANONICAL_COLUMNS: [&str; 17] = [
    "cliente",
    "classe",
    "termo",
    "servico_acessorio",
    "placa",
    "numero_fatura_servico",
    "inicio_vigencia",
    "fim_vigencia",
    "valor_mensalidade",
    "instalado",
    "meses_restantes",
    "taxa_multa_25pct",
    "valor_taxa_cancelamento",
    "valor_multa_nao_devolucao",
    "status_do_contrato",
    "valor_cobrar_com_devolucao",
    "valor_cobrar_sem_devolucao",
];

pub fn is_canonical(column: &str) -> bool {
    CANONICAL_COLUMNS.contains(&column)
}

/// Lowercase, trim, collapse runs of whitespace and fold Portuguese accents
pub fn normalize_text(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let folded: String = lowered
        .chars()
        .map(|c| match c {
            'ã' | 'â' | 'á' | 'à' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical name for one raw header. Unknown headers come back normalized.
pub fn canonical_header(raw: &str) -> String {
    let normalized = normalize_text(raw);
    HEADER_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == normalized)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(normalized)
}

/// Rename every header to its canonical form without checking requirements
pub fn canonicalize_headers(mut table: RawTable) -> RawTable {
    for header in table.headers.iter_mut() {
        let canonical = canonical_header(header);
        if canonical != *header {
            debug!("Header '{}' -> '{}'", header, canonical);
        }
        *header = canonical;
    }
    table
}

/// Canonicalize headers and fail if any required field is missing
pub fn normalize_headers(table: RawTable) -> Result<RawTable> {
    let table = canonicalize_headers(table);

    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| table.column_index(required).is_none())
        .map(|required| required.to_string())
        .collect();

    if !missing.is_empty() {
        missing.sort();
        return Err(RescissionError::MissingColumns(missing));
    }

    Ok(table)
}
