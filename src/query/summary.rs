//! Headline totals and grouped summaries

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::GroupField;
use crate::record::ContractAccessoryRecord;

/// Totals over a set of rows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub total_com_devolucao: Decimal,
    pub total_sem_devolucao: Decimal,
    /// Distinct `termo` values
    pub contratos: usize,
    /// Row count
    pub acessorios: usize,
}

impl Totals {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ContractAccessoryRecord>,
    {
        let mut totals = Totals::default();
        let mut termos: BTreeSet<&str> = BTreeSet::new();
        for record in records {
            totals.total_com_devolucao += record.valor_cobrar_com_devolucao;
            totals.total_sem_devolucao += record.valor_cobrar_sem_devolucao;
            totals.acessorios += 1;
            termos.insert(&record.termo);
        }
        totals.contratos = termos.len();
        totals
    }
}

/// One output row of the grouped summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Group key values, in the requested field order
    pub key: Vec<String>,
    #[serde(flatten)]
    pub totals: Totals,
}

/// Drop repeated fields, keeping first-mention order
pub fn dedup_fields(fields: &[GroupField]) -> Vec<GroupField> {
    let mut out: Vec<GroupField> = Vec::with_capacity(fields.len());
    for field in fields {
        if !out.contains(field) {
            out.push(*field);
        }
    }
    out
}

/// Group rows by `fields` and aggregate each group.
///
/// Groups come back ordered by key. An empty field list yields no groups.
pub fn summarize<'a, I>(records: I, fields: &[GroupField]) -> Vec<GroupSummary>
where
    I: IntoIterator<Item = &'a ContractAccessoryRecord>,
{
    let fields = dedup_fields(fields);
    if fields.is_empty() {
        return Vec::new();
    }

    let mut groups: BTreeMap<Vec<String>, Vec<&ContractAccessoryRecord>> = BTreeMap::new();
    for record in records {
        let key = fields
            .iter()
            .map(|f| record.text_field(f.column()).unwrap_or_default().to_string())
            .collect();
        groups.entry(key).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(key, rows)| GroupSummary {
            key,
            totals: Totals::from_records(rows),
        })
        .collect()
}
