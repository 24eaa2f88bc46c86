//! `billfold-invoices` — the invoice document model.
//!
//! Validation here is deliberately permissive: nearly every field is
//! optional, numbers and dates are coerced from the shapes client forms
//! actually send, legacy field spellings are accepted, and unknown fields
//! pass through untouched. [`process_invoice`] turns any parseable input
//! into a canonical document with computed totals.

pub mod coerce;
pub mod model;
pub mod normalize;

pub use model::{
    Amount, AmountType, CustomInput, Details, Invoice, Item, Party, PaymentInformation,
    Settings, Shipping, Signature,
};
pub use normalize::{Totals, compute_totals, process_invoice, process_item};
