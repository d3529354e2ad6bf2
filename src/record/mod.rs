//! Contract accessory records and the canonical status set

mod status;

pub use status::ContractStatus;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One accessory/service attached to one contract, after derivation.
///
/// Charge outputs stay at zero until the charge calculator runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAccessoryRecord {
    pub cliente: String,
    pub classe: String,
    /// Contract identifier (distinct values count contracts)
    pub termo: String,
    pub servico_acessorio: String,
    pub placa: Option<String>,
    pub numero_fatura_servico: Option<String>,
    pub inicio_vigencia: Option<NaiveDate>,
    pub fim_vigencia: Option<NaiveDate>,
    /// Monthly fee; None when the cell was blank or unparseable
    pub valor_mensalidade: Option<Decimal>,
    /// None when the source has no `instalado` column
    pub instalado: Option<bool>,
    pub meses_restantes: u32,
    pub taxa_multa_25pct: Decimal,
    pub valor_taxa_cancelamento: Decimal,
    pub valor_multa_nao_devolucao: Decimal,
    pub status_do_contrato: ContractStatus,
    pub valor_cobrar_com_devolucao: Decimal,
    pub valor_cobrar_sem_devolucao: Decimal,
    /// Pass-through cells, aligned with `RescissionTable::extra_headers`
    #[serde(default)]
    pub extras: Vec<String>,
}

impl ContractAccessoryRecord {
    /// Value of a text dimension by canonical column name
    pub fn text_field(&self, column: &str) -> Option<&str> {
        match column {
            "cliente" => Some(&self.cliente),
            "classe" => Some(&self.classe),
            "termo" => Some(&self.termo),
            "servico_acessorio" => Some(&self.servico_acessorio),
            "placa" => self.placa.as_deref(),
            "numero_fatura_servico" => self.numero_fatura_servico.as_deref(),
            "status_do_contrato" => Some(self.status_do_contrato.label()),
            _ => None,
        }
    }
}

/// Output of the pipeline: enriched, charged records plus the pass-through
/// column names carried alongside them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RescissionTable {
    pub records: Vec<ContractAccessoryRecord>,
    pub extra_headers: Vec<String>,
}

impl RescissionTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Same columns, different row set (used after filtering)
    pub fn with_records(&self, records: Vec<ContractAccessoryRecord>) -> Self {
        Self {
            records,
            extra_headers: self.extra_headers.clone(),
        }
    }

    /// Records sorted by (classe, termo, servico_acessorio); ties keep input order
    pub fn sorted_detail(&self) -> Vec<&ContractAccessoryRecord> {
        let mut rows: Vec<&ContractAccessoryRecord> = self.records.iter().collect();
        rows.sort_by(|a, b| {
            (&a.classe, &a.termo, &a.servico_acessorio).cmp(&(&b.classe, &b.termo, &b.servico_acessorio))
        });
        rows
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A zero-valued record for tests to customize with struct update syntax
    pub fn record(cliente: &str, classe: &str, termo: &str, servico: &str) -> ContractAccessoryRecord {
        ContractAccessoryRecord {
            cliente: cliente.to_string(),
            classe: classe.to_string(),
            termo: termo.to_string(),
            servico_acessorio: servico.to_string(),
            placa: None,
            numero_fatura_servico: None,
            inicio_vigencia: None,
            fim_vigencia: None,
            valor_mensalidade: None,
            instalado: None,
            meses_restantes: 0,
            taxa_multa_25pct: Decimal::ZERO,
            valor_taxa_cancelamento: Decimal::ZERO,
            valor_multa_nao_devolucao: Decimal::ZERO,
            status_do_contrato: ContractStatus::OutOfTermNotInstalled,
            valor_cobrar_com_devolucao: Decimal::ZERO,
            valor_cobrar_sem_devolucao: Decimal::ZERO,
            extras: Vec::new(),
        }
    }
}
