//! Ordersheet: multi-user order entry and Excel export
//!
//! Several users each keep a JSON list of order line items; an
//! administrator merges the selected users' lists and exports a styled
//! XLSX report that groups items into orders and sub-items and computes
//! shirt and film totals. Every export is appended to a CSV audit log.

pub mod audit;
pub mod grouping;
pub mod record;
pub mod report;
pub mod storage;

use thiserror::Error;

/// Errors produced while turning raw JSON text into item records.
#[derive(Debug, Error)]
pub enum DataError {
    /// The input text is not parseable JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The input parsed, but the top-level value is not a list.
    #[error("expected a JSON list of records, got {found}")]
    InvalidShape {
        /// Human description of the value that was found instead.
        found: &'static str,
    },

    /// A list element is not an object. The whole parse is rejected;
    /// records are never silently skipped.
    #[error("record at index {index} is not a JSON object")]
    InvalidItem { index: usize },
}

/// Errors produced while rendering the report workbook.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to render workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
