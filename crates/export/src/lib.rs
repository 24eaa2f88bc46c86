//! `billfold-export` — invoice export format switch.
//!
//! JSON and CSV are implemented; XLSX and PDF are declared unsupported so
//! callers can answer "Not Implemented" deliberately rather than guessing.

pub mod csv;
pub mod flatten;

use serde_json::Value;
use thiserror::Error;

pub use flatten::flatten_value;

/// Formats a client may request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The format is recognized but intentionally not produced here.
    #[error("{0} export is not supported")]
    Unsupported(&'static str),

    #[error("failed to encode export: {0}")]
    Encode(String),
}

/// An export ready to be served as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub content_type: &'static str,
    pub filename: &'static str,
    pub bytes: Vec<u8>,
}

/// Produce the download for `document` in `format`.
pub fn export_invoice(document: &Value, format: ExportFormat) -> Result<ExportOutput, ExportError> {
    match format {
        ExportFormat::Json => {
            let bytes = serde_json::to_vec_pretty(document)
                .map_err(|e| ExportError::Encode(e.to_string()))?;
            Ok(ExportOutput {
                content_type: "application/json",
                filename: "invoice.json",
                bytes,
            })
        }
        ExportFormat::Csv => Ok(ExportOutput {
            content_type: "text/csv",
            filename: "invoice.csv",
            bytes: csv::single_row(document).into_bytes(),
        }),
        ExportFormat::Xlsx => Err(ExportError::Unsupported("xlsx")),
        ExportFormat::Pdf => Err(ExportError::Unsupported("pdf")),
    }
}
