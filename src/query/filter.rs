//! Row filters over the charged table

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::record::{ContractAccessoryRecord, ContractStatus};

/// Inclusive range over one charge column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl AmountRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Independent selections combined with AND. An empty selection on a
/// dimension does not filter that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub clientes: BTreeSet<String>,
    #[serde(default)]
    pub classes: BTreeSet<String>,
    #[serde(default)]
    pub termos: BTreeSet<String>,
    #[serde(default)]
    pub servicos: BTreeSet<String>,
    #[serde(default)]
    pub statuses: BTreeSet<ContractStatus>,
    #[serde(default)]
    pub com_devolucao: Option<AmountRange>,
    #[serde(default)]
    pub sem_devolucao: Option<AmountRange>,
}

fn selected(set: &BTreeSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        *self == RecordFilter::default()
    }

    pub fn matches(&self, record: &ContractAccessoryRecord) -> bool {
        selected(&self.clientes, &record.cliente)
            && selected(&self.classes, &record.classe)
            && selected(&self.termos, &record.termo)
            && selected(&self.servicos, &record.servico_acessorio)
            && (self.statuses.is_empty() || self.statuses.contains(&record.status_do_contrato))
            && self
                .com_devolucao
                .map_or(true, |range| range.contains(record.valor_cobrar_com_devolucao))
            && self
                .sem_devolucao
                .map_or(true, |range| range.contains(record.valor_cobrar_sem_devolucao))
    }

    pub fn apply<'a>(&self, records: &'a [ContractAccessoryRecord]) -> Vec<&'a ContractAccessoryRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Choices an outer surface can offer for each filter dimension
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub clientes: Vec<String>,
    pub classes: Vec<String>,
    pub termos: Vec<String>,
    pub servicos: Vec<String>,
    pub statuses: Vec<ContractStatus>,
    /// Observed bounds, floored/ceiled to whole units
    pub com_devolucao: Option<AmountRange>,
    pub sem_devolucao: Option<AmountRange>,
}

impl FilterOptions {
    pub fn from_records(records: &[ContractAccessoryRecord]) -> Self {
        let distinct = |get: fn(&ContractAccessoryRecord) -> &str| -> Vec<String> {
            records
                .iter()
                .map(|r| get(r).to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };
        let bounds = |get: fn(&ContractAccessoryRecord) -> Decimal| -> Option<AmountRange> {
            let min = records.iter().map(get).min()?;
            let max = records.iter().map(get).max()?;
            Some(AmountRange::new(min.floor(), max.ceil()))
        };

        Self {
            clientes: distinct(|r| r.cliente.as_str()),
            classes: distinct(|r| r.classe.as_str()),
            termos: distinct(|r| r.termo.as_str()),
            servicos: distinct(|r| r.servico_acessorio.as_str()),
            statuses: ContractStatus::ALL.to_vec(),
            com_devolucao: bounds(|r| r.valor_cobrar_com_devolucao),
            sem_devolucao: bounds(|r| r.valor_cobrar_sem_devolucao),
        }
    }
}
