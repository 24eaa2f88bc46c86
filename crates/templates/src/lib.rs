//! `billfold-templates` — invoice presentation.
//!
//! A fixed registry of layouts selected by numeric ID. Rendering is a pure
//! function from a document to a complete standalone HTML page; the same
//! artifact serves screen preview, printing, and email attachment.

pub mod format;
mod layout;
mod partials;
mod templates;

use billfold_invoices::Invoice;
use thiserror::Error;

/// Template used when a document does not select one.
pub const DEFAULT_TEMPLATE: u32 = 1;

/// IDs with a registered layout.
pub const TEMPLATE_IDS: [u32; 4] = [1, 2, 3, 4];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template with ID {0} not found")]
    UnknownTemplate(u32),
}

/// Render `invoice` with the layout registered under `template_id`.
pub fn render(template_id: u32, invoice: &Invoice) -> Result<String, TemplateError> {
    match template_id {
        1 => Ok(templates::template1::render(invoice)),
        2 => Ok(templates::template2::render(invoice)),
        3 => Ok(templates::template3::render(invoice)),
        4 => Ok(templates::template4::render(invoice)),
        other => Err(TemplateError::UnknownTemplate(other)),
    }
}

/// Render with the document's own selector, falling back to the default.
pub fn render_selected(invoice: &Invoice) -> Result<String, TemplateError> {
    render(invoice.template_id().unwrap_or(DEFAULT_TEMPLATE), invoice)
}
