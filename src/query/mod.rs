//! Filtering and aggregation over the charged table

mod filter;
mod summary;

pub use filter::{AmountRange, FilterOptions, RecordFilter};
pub use summary::{dedup_fields, summarize, GroupSummary, Totals};
