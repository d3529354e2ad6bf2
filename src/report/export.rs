//! Detailed CSV export and the detalhado/resumo workbook
//!
//! Exports keep raw numeric values; only the console view uses BRL formatting.

use log::info;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::io::Write;
use std::path::Path;

use crate::config::GroupField;
use crate::error::Result;
use crate::query::GroupSummary;
use crate::record::{ContractAccessoryRecord, RescissionTable};
use crate::schema::CANONICAL_COLUMNS;

/// UTF-8 byte-order mark so spreadsheet tools detect the encoding
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const DETAIL_SHEET: &str = "detalhado";
pub const SUMMARY_SHEET: &str = "resumo";

const SUMMARY_COLUMNS: [&str; 4] = [
    "contratos",
    "acessorios",
    "total_com_devolucao",
    "total_sem_devolucao",
];

/// One exported cell
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Amount(Decimal),
    Count(u64),
}

impl Cell {
    fn text(value: &str) -> Self {
        Cell::Text(value.to_string())
    }

    fn optional(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Empty)
    }

    fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Amount(d) => d.normalize().to_string(),
            Cell::Count(n) => n.to_string(),
        }
    }

    fn write_to(&self, sheet: &mut Worksheet, row: u32, col: u16) -> Result<()> {
        match self {
            Cell::Empty => {}
            Cell::Text(s) => {
                sheet.write_string(row, col, s.as_str())?;
            }
            Cell::Amount(d) => {
                sheet.write_number(row, col, d.to_f64().unwrap_or(0.0))?;
            }
            Cell::Count(n) => {
                sheet.write_number(row, col, *n as f64)?;
            }
        }
        Ok(())
    }
}

pub fn detail_headers(table: &RescissionTable) -> Vec<String> {
    CANONICAL_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(table.extra_headers.iter().cloned())
        .collect()
}

fn detail_cells(record: &ContractAccessoryRecord) -> Vec<Cell> {
    let date = |d: Option<chrono::NaiveDate>| Cell::optional(d.map(|d| d.format("%Y-%m-%d").to_string()));

    let mut cells = vec![
        Cell::text(&record.cliente),
        Cell::text(&record.classe),
        Cell::text(&record.termo),
        Cell::text(&record.servico_acessorio),
        Cell::optional(record.placa.clone()),
        Cell::optional(record.numero_fatura_servico.clone()),
        date(record.inicio_vigencia),
        date(record.fim_vigencia),
        record.valor_mensalidade.map(Cell::Amount).unwrap_or(Cell::Empty),
        Cell::optional(record.instalado.map(|b| b.to_string())),
        Cell::Count(u64::from(record.meses_restantes)),
        Cell::Amount(record.taxa_multa_25pct),
        Cell::Amount(record.valor_taxa_cancelamento),
        Cell::Amount(record.valor_multa_nao_devolucao),
        Cell::text(record.status_do_contrato.label()),
        Cell::Amount(record.valor_cobrar_com_devolucao),
        Cell::Amount(record.valor_cobrar_sem_devolucao),
    ];
    cells.extend(record.extras.iter().map(|s| Cell::text(s)));
    cells
}

fn summary_headers(fields: &[GroupField]) -> Vec<String> {
    fields
        .iter()
        .map(|f| f.column().to_string())
        .chain(SUMMARY_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

fn summary_cells(group: &GroupSummary) -> Vec<Cell> {
    let mut cells: Vec<Cell> = group.key.iter().map(|k| Cell::text(k)).collect();
    cells.push(Cell::Count(group.totals.contratos as u64));
    cells.push(Cell::Count(group.totals.acessorios as u64));
    cells.push(Cell::Amount(group.totals.total_com_devolucao));
    cells.push(Cell::Amount(group.totals.total_sem_devolucao));
    cells
}

/// Write row-level detail as BOM-prefixed UTF-8 CSV, rows in table order
pub fn write_detail_csv<W: Write>(table: &RescissionTable, mut writer: W) -> Result<()> {
    writer.write_all(UTF8_BOM)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(detail_headers(table))?;
    for record in &table.records {
        csv_writer.write_record(detail_cells(record).iter().map(Cell::render))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn save_detail_csv(table: &RescissionTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_detail_csv(table, std::io::BufWriter::new(file))?;
    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

fn write_sheet(sheet: &mut Worksheet, headers: &[String], rows: &[Vec<Cell>]) -> Result<()> {
    let bold = Format::new().set_bold();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header.as_str(), &bold)?;
    }
    for (i, cells) in rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            cell.write_to(sheet, i as u32 + 1, col as u16)?;
        }
    }
    Ok(())
}

/// Build the workbook: `detalhado` sorted by (classe, termo, servico_acessorio),
/// plus `resumo` when a grouped summary is supplied
pub fn build_workbook(table: &RescissionTable, summary: Option<(&[GroupField], &[GroupSummary])>) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    let detail_rows: Vec<Vec<Cell>> = table.sorted_detail().into_iter().map(detail_cells).collect();
    let sheet = workbook.add_worksheet().set_name(DETAIL_SHEET)?;
    write_sheet(sheet, &detail_headers(table), &detail_rows)?;

    if let Some((fields, groups)) = summary {
        let summary_rows: Vec<Vec<Cell>> = groups.iter().map(summary_cells).collect();
        let sheet = workbook.add_worksheet().set_name(SUMMARY_SHEET)?;
        write_sheet(sheet, &summary_headers(fields), &summary_rows)?;
    }

    Ok(workbook)
}

pub fn save_workbook(
    table: &RescissionTable,
    summary: Option<(&[GroupField], &[GroupSummary])>,
    path: &Path,
) -> Result<()> {
    let mut workbook = build_workbook(table, summary)?;
    workbook.save(path)?;
    info!("Wrote workbook to {}", path.display());
    Ok(())
}
