//! Rescission calculation pipeline
//!
//! raw table -> header normalization -> coercion + derivation
//! -> (optional) lookup enrichment -> charge calculation

pub mod charges;
pub mod derive;
pub mod enrich;

pub use charges::{apply_charges, charges_for, Charges};
pub use derive::{derive_records, penalty_25pct, remaining_months};
pub use enrich::{Enrichment, FeeField, LookupEnrichment, LookupTable};

use log::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::record::RescissionTable;
use crate::schema::normalize_headers;
use crate::table::RawTable;

/// Compute rescission charges for every row of `base`.
///
/// Fails only when required columns are missing; no partial output is
/// produced in that case.
pub fn compute_charges(
    base: RawTable,
    enrichment: &Enrichment,
    config: &PipelineConfig,
) -> Result<RescissionTable> {
    let table = normalize_headers(base)?;
    let today = config.today();
    info!("Computing charges for {} rows as of {}", table.len(), today);

    let mut output = derive_records(&table, today);
    enrichment.apply(&mut output.records);
    apply_charges(&mut output.records);

    Ok(output)
}
