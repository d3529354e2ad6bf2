//! Optional enrichment of fee fields from auxiliary key -> value tables

use log::{info, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::coerce::parse_decimal;
use crate::config::JoinKey;
use crate::record::ContractAccessoryRecord;
use crate::schema::canonicalize_headers;
use crate::table::RawTable;

/// Column holding the join key in auxiliary tables
pub const KEY_COLUMN: &str = "chave";

/// Fee field an auxiliary table fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeField {
    /// `valor_taxa_cancelamento`
    Cancellation,
    /// `valor_multa_nao_devolucao`
    NonReturn,
}

impl FeeField {
    pub fn column(&self) -> &'static str {
        match self {
            FeeField::Cancellation => "valor_taxa_cancelamento",
            FeeField::NonReturn => "valor_multa_nao_devolucao",
        }
    }

    fn slot<'a>(&self, record: &'a mut ContractAccessoryRecord) -> &'a mut Decimal {
        match self {
            FeeField::Cancellation => &mut record.valor_taxa_cancelamento,
            FeeField::NonReturn => &mut record.valor_multa_nao_devolucao,
        }
    }
}

/// Many-to-one lookup from `chave` to a fee value.
///
/// Duplicate keys keep their first occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    field: FeeField,
    values: HashMap<String, Option<Decimal>>,
}

impl LookupTable {
    /// Build from a raw auxiliary table. Returns None when the table lacks
    /// `chave` or the value column, in which case enrichment is skipped.
    pub fn from_raw(table: RawTable, field: FeeField) -> Option<Self> {
        let table = canonicalize_headers(table);
        let (Some(key_idx), Some(value_idx)) =
            (table.column_index(KEY_COLUMN), table.column_index(field.column()))
        else {
            warn!(
                "Auxiliary table for {} lacks '{}' or '{}' columns; skipping",
                field.column(),
                KEY_COLUMN,
                field.column()
            );
            return None;
        };

        let mut values = HashMap::with_capacity(table.len());
        let mut duplicates = 0usize;
        for row in &table.rows {
            let key = row[key_idx].trim().to_string();
            if values.contains_key(&key) {
                duplicates += 1;
                continue;
            }
            values.insert(key, parse_decimal(&row[value_idx]));
        }
        if duplicates > 0 {
            warn!(
                "Auxiliary table for {}: {} duplicate key(s) ignored, first occurrence kept",
                field.column(),
                duplicates
            );
        }

        Some(Self { field, values })
    }

    pub fn field(&self) -> FeeField {
        self.field
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Looked-up value; unmatched keys and blank values give None
    pub fn get(&self, key: &str) -> Option<Decimal> {
        self.values.get(key.trim()).copied().flatten()
    }
}

/// Lookup-table enrichment settings
#[derive(Debug, Clone, PartialEq)]
pub struct LookupEnrichment {
    pub join_key: JoinKey,
    pub cancellation: Option<LookupTable>,
    pub non_return: Option<LookupTable>,
}

impl LookupEnrichment {
    pub fn new(join_key: JoinKey) -> Self {
        Self {
            join_key,
            cancellation: None,
            non_return: None,
        }
    }

    /// Attach an auxiliary table; unusable tables are dropped with a warning
    pub fn with_table(mut self, table: RawTable, field: FeeField) -> Self {
        let lookup = LookupTable::from_raw(table, field);
        match field {
            FeeField::Cancellation => self.cancellation = lookup,
            FeeField::NonReturn => self.non_return = lookup,
        }
        self
    }
}

/// How fee fields are filled before charges are computed
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Enrichment {
    /// Fees come from the base table only (missing -> 0)
    #[default]
    Disabled,
    /// Fees are joined in from auxiliary tables
    Lookup(LookupEnrichment),
}

impl Enrichment {
    pub fn apply(&self, records: &mut [ContractAccessoryRecord]) {
        match self {
            Enrichment::Disabled => {}
            Enrichment::Lookup(lookup) => {
                for table in [&lookup.cancellation, &lookup.non_return].into_iter().flatten() {
                    join_into(records, table, lookup.join_key);
                }
            }
        }
    }
}

/// Left join: matched rows take the looked-up value, unmatched rows get 0
fn join_into(records: &mut [ContractAccessoryRecord], table: &LookupTable, join_key: JoinKey) {
    let mut matched = 0usize;
    for record in records.iter_mut() {
        let key = match join_key {
            JoinKey::ServicoAcessorio => record.servico_acessorio.as_str(),
            JoinKey::Classe => record.classe.as_str(),
        };
        let value = table.get(key);
        if value.is_some() {
            matched += 1;
        }
        *table.field().slot(record) = value.unwrap_or(Decimal::ZERO);
    }
    info!(
        "Joined {} on {}: {}/{} rows matched",
        table.field().column(),
        join_key,
        matched,
        records.len()
    );
}
