//! Presentation helpers: BRL display formatting and file exports

mod export;
mod format;

pub use export::{
    build_workbook, detail_headers, save_detail_csv, save_workbook, write_detail_csv, DETAIL_SHEET,
    SUMMARY_SHEET, UTF8_BOM,
};
pub use format::format_brl;
