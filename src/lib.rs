//! Early-termination ("rescission") charge calculator for contract
//! accessories and services.
//!
//! The core is [`compute_charges`]: a raw table of active contract items in,
//! the same rows with remaining term, 25% penalty, status and the two
//! amounts due (with and without item return) out.

pub mod coerce;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod record;
pub mod report;
pub mod schema;
pub mod table;

pub use config::{GroupField, JoinKey, PipelineConfig};
pub use error::{RescissionError, Result};
pub use pipeline::{compute_charges, Enrichment, FeeField, LookupEnrichment};
pub use record::{ContractAccessoryRecord, ContractStatus, RescissionTable};
pub use table::RawTable;
