//! Accessory rescission CLI
//!
//! Loads the base table (and optional auxiliary fee tables), computes the
//! charges and prints headline totals plus the grouped summary.

use accessory_rescission::{
    compute_charges,
    config::{GroupField, JoinKey, PipelineConfig},
    pipeline::{Enrichment, FeeField, LookupEnrichment},
    query::{dedup_fields, summarize, AmountRange, FilterOptions, GroupSummary, RecordFilter, Totals},
    record::{ContractStatus, RescissionTable},
    report::{format_brl, save_detail_csv, save_workbook},
    table::load_table,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum JoinKeyArg {
    ServicoAcessorio,
    Classe,
}

impl From<JoinKeyArg> for JoinKey {
    fn from(arg: JoinKeyArg) -> Self {
        match arg {
            JoinKeyArg::ServicoAcessorio => JoinKey::ServicoAcessorio,
            JoinKeyArg::Classe => JoinKey::Classe,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GroupArg {
    Cliente,
    Classe,
    Termo,
}

impl From<GroupArg> for GroupField {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::Cliente => GroupField::Cliente,
            GroupArg::Classe => GroupField::Classe,
            GroupArg::Termo => GroupField::Termo,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "accessory-rescission",
    version,
    about = "Compute rescission charges for contract accessories (with/without item return)"
)]
struct Args {
    /// Main table (CSV or spreadsheet)
    #[arg(long, value_name = "FILE")]
    base: PathBuf,

    /// Auxiliary table with columns chave + valor_taxa_cancelamento
    #[arg(long, value_name = "FILE")]
    cancelamento: Option<PathBuf>,

    /// Auxiliary table with columns chave + valor_multa_nao_devolucao
    #[arg(long, value_name = "FILE")]
    multa_nao_devolucao: Option<PathBuf>,

    /// Main-table field matched against `chave`
    #[arg(long, value_enum)]
    join_key: Option<JoinKeyArg>,

    /// Count remaining months from this date instead of today
    #[arg(long, value_name = "YYYY-MM-DD")]
    reference_date: Option<NaiveDate>,

    /// JSON configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "CLIENTE")]
    cliente: Vec<String>,

    #[arg(long, value_name = "CLASSE")]
    classe: Vec<String>,

    #[arg(long, value_name = "TERMO")]
    termo: Vec<String>,

    #[arg(long, value_name = "SERVICO")]
    servico: Vec<String>,

    /// Status label, e.g. "Com vigência e instalado" (case and accents ignored)
    #[arg(long, value_name = "STATUS", value_parser = parse_status)]
    status: Vec<ContractStatus>,

    #[arg(long, value_name = "AMOUNT")]
    min_com: Option<Decimal>,

    #[arg(long, value_name = "AMOUNT")]
    max_com: Option<Decimal>,

    #[arg(long, value_name = "AMOUNT")]
    min_sem: Option<Decimal>,

    #[arg(long, value_name = "AMOUNT")]
    max_sem: Option<Decimal>,

    /// Summary grouping (repeatable); defaults to the configured grouping
    #[arg(long, value_enum)]
    group_by: Vec<GroupArg>,

    /// Disable the grouped summary
    #[arg(long, conflicts_with = "group_by")]
    no_summary: bool,

    /// Write the filtered detail rows as CSV
    #[arg(long, value_name = "FILE")]
    csv_out: Option<PathBuf>,

    /// Write the detalhado/resumo workbook
    #[arg(long, value_name = "FILE")]
    xlsx_out: Option<PathBuf>,

    /// Number of detail rows to print
    #[arg(long, default_value_t = 20)]
    show: usize,

    /// Print totals and summary as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    totals: &'a Totals,
    /// Filter choices over the unfiltered table
    options: FilterOptions,
    group_by: &'a [GroupField],
    summary: &'a [GroupSummary],
}

fn parse_status(raw: &str) -> std::result::Result<ContractStatus, String> {
    ContractStatus::from_label(raw).ok_or_else(|| {
        let labels: Vec<&str> = ContractStatus::ALL.iter().map(|s| s.label()).collect();
        format!("unknown status '{}'; expected one of: {}", raw, labels.join(", "))
    })
}

fn range(min: Option<Decimal>, max: Option<Decimal>) -> Option<AmountRange> {
    if min.is_none() && max.is_none() {
        return None;
    }
    Some(AmountRange::new(
        min.unwrap_or(Decimal::ZERO),
        max.unwrap_or(Decimal::MAX),
    ))
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(join_key) = args.join_key {
        config.join_key = join_key.into();
    }
    if args.reference_date.is_some() {
        config.reference_date = args.reference_date;
    }
    if args.no_summary {
        config.group_by.clear();
    } else if !args.group_by.is_empty() {
        config.group_by = args.group_by.iter().map(|g| GroupField::from(*g)).collect();
    }
    Ok(config)
}

fn build_enrichment(args: &Args, config: &PipelineConfig) -> Result<Enrichment> {
    if args.cancelamento.is_none() && args.multa_nao_devolucao.is_none() {
        return Ok(Enrichment::Disabled);
    }

    let mut lookup = LookupEnrichment::new(config.join_key);
    for (path, field) in [
        (&args.cancelamento, FeeField::Cancellation),
        (&args.multa_nao_devolucao, FeeField::NonReturn),
    ] {
        if let Some(path) = path {
            let table = load_table(path)
                .with_context(|| format!("Failed to load auxiliary table {}", path.display()))?;
            lookup = lookup.with_table(table, field);
        }
    }
    Ok(Enrichment::Lookup(lookup))
}

fn build_filter(args: &Args) -> RecordFilter {
    RecordFilter {
        clientes: args.cliente.iter().cloned().collect(),
        classes: args.classe.iter().cloned().collect(),
        termos: args.termo.iter().cloned().collect(),
        servicos: args.servico.iter().cloned().collect(),
        statuses: args.status.iter().copied().collect(),
        com_devolucao: range(args.min_com, args.max_com),
        sem_devolucao: range(args.min_sem, args.max_sem),
    }
}

fn print_report(filtered: &RescissionTable, totals: &Totals, fields: &[GroupField], groups: &[GroupSummary], show: usize) {
    println!("Valor total com devolução:  {}", format_brl(totals.total_com_devolucao));
    println!("Valor total sem devolução:  {}", format_brl(totals.total_sem_devolucao));
    println!("Quantidade de contratos:    {}", totals.contratos);
    println!("Quantidade de acessórios:   {}", totals.acessorios);
    println!();

    println!("{:<12} {:<14} {:<20} {:<30} {:>18} {:>18}",
        "Classe", "Termo", "Serviço/Acessório", "Status", "Com devolução", "Sem devolução");
    println!("{}", "-".repeat(117));
    let detail = filtered.sorted_detail();
    for record in detail.iter().take(show) {
        println!("{:<12} {:<14} {:<20} {:<30} {:>18} {:>18}",
            record.classe,
            record.termo,
            record.servico_acessorio,
            record.status_do_contrato.label(),
            format_brl(record.valor_cobrar_com_devolucao),
            format_brl(record.valor_cobrar_sem_devolucao),
        );
    }
    if detail.len() > show {
        println!("... ({} more rows)", detail.len() - show);
    }

    if groups.is_empty() {
        return;
    }
    println!();
    let key_header: Vec<&str> = fields.iter().map(|f| f.column()).collect();
    println!("{:<30} {:>10} {:>10} {:>18} {:>18}",
        key_header.join(" / "), "Contratos", "Acessórios", "Com devolução", "Sem devolução");
    println!("{}", "-".repeat(90));
    for group in groups {
        println!("{:<30} {:>10} {:>10} {:>18} {:>18}",
            group.key.join(" / "),
            group.totals.contratos,
            group.totals.acessorios,
            format_brl(group.totals.total_com_devolucao),
            format_brl(group.totals.total_sem_devolucao),
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = build_config(&args)?;
    let base = load_table(&args.base)
        .with_context(|| format!("Failed to load base table {}", args.base.display()))?;
    let enrichment = build_enrichment(&args, &config)?;

    let table = compute_charges(base, &enrichment, &config)?;

    let filter = build_filter(&args);
    let filtered = table.with_records(filter.apply(&table.records).into_iter().cloned().collect());
    info!("{} of {} rows after filtering", filtered.len(), table.len());

    let totals = Totals::from_records(&filtered.records);
    let groups = summarize(&filtered.records, &config.group_by);
    let fields = dedup_fields(&config.group_by);

    if args.json {
        let report = JsonReport {
            totals: &totals,
            options: FilterOptions::from_records(&table.records),
            group_by: &fields,
            summary: &groups,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&filtered, &totals, &fields, &groups, args.show);
    }

    if let Some(path) = &args.csv_out {
        save_detail_csv(&filtered, path)
            .with_context(|| format!("Failed to write CSV {}", path.display()))?;
    }
    if let Some(path) = &args.xlsx_out {
        let summary = if groups.is_empty() { None } else { Some((fields.as_slice(), groups.as_slice())) };
        save_workbook(&filtered, summary, path)
            .with_context(|| format!("Failed to write workbook {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_flag_accepts_labels() {
        let args = Args::try_parse_from([
            "accessory-rescission",
            "--base",
            "base.csv",
            "--status",
            "com vigencia e instalado",
            "--status",
            "Sem vigência e não instalado",
        ])
        .unwrap();
        let filter = build_filter(&args);
        assert_eq!(filter.statuses.len(), 2);
        assert!(filter.statuses.contains(&ContractStatus::InTermInstalled));
        assert!(filter.statuses.contains(&ContractStatus::OutOfTermNotInstalled));
    }

    #[test]
    fn test_status_flag_rejects_unknown_text() {
        for raw in ["Com vigencia e instaldo", "Sem vigência"] {
            let result = Args::try_parse_from(["accessory-rescission", "--base", "base.csv", "--status", raw]);
            assert!(result.is_err(), "{raw}");
        }
    }

    #[test]
    fn test_amount_range_defaults() {
        assert_eq!(range(None, None), None);
        let r = range(Some(Decimal::from(10)), None).unwrap();
        assert_eq!(r.min, Decimal::from(10));
        assert_eq!(r.max, Decimal::MAX);
    }
}
