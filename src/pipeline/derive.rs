//! Derivation of remaining months, the 25% penalty and contract status
//!
//! A derived column is taken from the source only when the source supplies it
//! for every row. A single gap recomputes the whole column, discarding any
//! values that were supplied.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::coerce::{parse_bool, parse_date, parse_decimal, parse_month_count};
use crate::record::{ContractAccessoryRecord, ContractStatus, RescissionTable};
use crate::schema::is_canonical;
use crate::table::RawTable;

/// Days per month used when converting remaining days to months
pub const DAYS_PER_MONTH: i64 = 30;

/// Fraction of the remaining term charged as early-termination penalty
pub const PENALTY_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

/// Where status comes from, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    /// Free-form status text column with at least one non-blank cell
    Text(usize),
    /// `instalado` flag column combined with remaining months
    InstalledFlag(usize),
    /// Remaining months alone (installed when in term)
    TermOnly,
}

/// Remaining whole months from `today` to `end`, rounded up; 0 when expired or unknown
pub fn remaining_months(end: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let days = end
        .map(|end| (end - today).num_days())
        .unwrap_or(0)
        .max(0);
    let months = (days + DAYS_PER_MONTH - 1) / DAYS_PER_MONTH;
    u32::try_from(months).unwrap_or(u32::MAX)
}

/// 25% of the monthly fee over the remaining term; a missing fee counts as 0
pub fn penalty_25pct(monthly_fee: Option<Decimal>, months: u32) -> Decimal {
    monthly_fee.unwrap_or(Decimal::ZERO) * Decimal::from(months) * PENALTY_RATE
}

/// Parse every cell of a column, or None if the column is absent or any cell fails
fn complete_column<T>(table: &RawTable, column: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    let cells = table.column(column)?;
    cells.map(parse).collect()
}

/// Non-blank cells of `column` that `parse` rejects
fn unparsed_cells<T>(table: &RawTable, column: &str, parse: impl Fn(&str) -> Option<T>) -> usize {
    table.column(column).map_or(0, |cells| {
        cells
            .filter(|cell| !cell.trim().is_empty() && parse(cell).is_none())
            .count()
    })
}

fn status_source(table: &RawTable) -> StatusSource {
    if let Some(idx) = table.column_index("status_do_contrato") {
        if table.rows.iter().any(|row| !row[idx].trim().is_empty()) {
            return StatusSource::Text(idx);
        }
    }
    match table.column_index("instalado") {
        Some(idx) => StatusSource::InstalledFlag(idx),
        None => StatusSource::TermOnly,
    }
}

/// Build typed records from a header-normalized table.
///
/// Charge outputs are left at zero; enrichment and the charge calculator
/// fill them in afterwards.
pub fn derive_records(table: &RawTable, today: NaiveDate) -> RescissionTable {
    let idx = |name: &str| table.column_index(name);
    let text = |row: &[String], col: Option<usize>| -> String {
        col.map(|c| row[c].trim().to_string()).unwrap_or_default()
    };
    let optional_text = |row: &[String], col: Option<usize>| -> Option<String> {
        col.map(|c| row[c].trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    let cliente = idx("cliente");
    let classe = idx("classe");
    let termo = idx("termo");
    let servico = idx("servico_acessorio");
    let placa = idx("placa");
    let fatura = idx("numero_fatura_servico");
    let inicio = idx("inicio_vigencia");
    let fim = idx("fim_vigencia");
    let mensalidade = idx("valor_mensalidade");
    let cancelamento = idx("valor_taxa_cancelamento");
    let multa = idx("valor_multa_nao_devolucao");
    let instalado_col = idx("instalado");

    let end_dates: Vec<Option<NaiveDate>> = table
        .rows
        .iter()
        .map(|row| fim.and_then(|c| parse_date(&row[c])))
        .collect();
    let monthly_fees: Vec<Option<Decimal>> = table
        .rows
        .iter()
        .map(|row| mensalidade.and_then(|c| parse_decimal(&row[c])))
        .collect();
    let bad_fees = unparsed_cells(table, "valor_mensalidade", parse_decimal);
    if bad_fees > 0 {
        warn!(
            "{} valor_mensalidade value(s) could not be read as numbers (decimal comma?); treated as 0",
            bad_fees
        );
    }

    let months = match complete_column(table, "meses_restantes", parse_month_count) {
        Some(months) => {
            debug!("Using supplied meses_restantes");
            months
        }
        None => {
            debug!("Recomputing meses_restantes from fim_vigencia as of {}", today);
            end_dates.iter().map(|end| remaining_months(*end, today)).collect()
        }
    };

    let penalties = match complete_column(table, "taxa_multa_25pct", |s| {
        parse_decimal(s).filter(|v| !v.is_sign_negative())
    }) {
        Some(penalties) => {
            debug!("Using supplied taxa_multa_25pct");
            penalties
        }
        None => {
            debug!("Recomputing taxa_multa_25pct");
            monthly_fees
                .iter()
                .zip(&months)
                .map(|(fee, m)| penalty_25pct(*fee, *m))
                .collect()
        }
    };

    let source = status_source(table);
    debug!("Status source: {:?}", source);

    let extra_columns: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !is_canonical(h))
        .map(|(i, _)| i)
        .collect();
    let extra_headers = extra_columns.iter().map(|&i| table.headers[i].clone()).collect();

    let records = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let meses_restantes = months[i];
            let in_term = meses_restantes > 0;
            let instalado = instalado_col.map(|c| parse_bool(&row[c]));

            let status_do_contrato = match source {
                StatusSource::Text(c) => ContractStatus::classify_text(&row[c]),
                StatusSource::InstalledFlag(c) => ContractStatus::from_flags(in_term, parse_bool(&row[c])),
                StatusSource::TermOnly => ContractStatus::from_flags(in_term, in_term),
            };

            let fee = |col: Option<usize>| {
                col.and_then(|c| parse_decimal(&row[c])).unwrap_or(Decimal::ZERO)
            };

            ContractAccessoryRecord {
                cliente: text(row, cliente),
                classe: text(row, classe),
                termo: text(row, termo),
                servico_acessorio: text(row, servico),
                placa: optional_text(row, placa),
                numero_fatura_servico: optional_text(row, fatura),
                inicio_vigencia: inicio.and_then(|c| parse_date(&row[c])),
                fim_vigencia: end_dates[i],
                valor_mensalidade: monthly_fees[i],
                instalado,
                meses_restantes,
                taxa_multa_25pct: penalties[i],
                valor_taxa_cancelamento: fee(cancelamento),
                valor_multa_nao_devolucao: fee(multa),
                status_do_contrato,
                valor_cobrar_com_devolucao: Decimal::ZERO,
                valor_cobrar_sem_devolucao: Decimal::ZERO,
                extras: extra_columns.iter().map(|&c| row[c].clone()).collect(),
            }
        })
        .collect();

    RescissionTable { records, extra_headers }
}
