//! Invoice document types.
//!
//! Wire format is camelCase JSON. Unknown fields are preserved on the
//! document, its parties, its details, and its items via flattened maps, so
//! round-tripping a document never sheds data the schema does not know about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use billfold_core::DomainError;

use crate::coerce;

/// How an [`Amount`] applies: relative to a base, or as a flat value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AmountType {
    #[default]
    Percentage,
    Fixed,
}

impl AmountType {
    /// Accepts the current spellings plus the legacy `"amount"` (meaning fixed).
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "amount" => AmountType::Fixed,
            _ => AmountType::Percentage,
        }
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self, AmountType::Percentage)
    }
}

/// A tax- or discount-style value: `{ amount, amountType }`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    pub amount: f64,
    pub amount_type: AmountType,
}

impl Amount {
    pub fn percentage(amount: f64) -> Self {
        Self { amount, amount_type: AmountType::Percentage }
    }

    pub fn fixed(amount: f64) -> Self {
        Self { amount, amount_type: AmountType::Fixed }
    }

    /// Resolve against a base: percentages scale it, fixed values ignore it.
    /// Zero amounts contribute nothing (matching the falsy checks upstream
    /// clients always applied).
    pub fn applied_to(&self, base: f64) -> f64 {
        if self.amount == 0.0 {
            return 0.0;
        }
        match self.amount_type {
            AmountType::Percentage => base * (self.amount / 100.0),
            AmountType::Fixed => self.amount,
        }
    }
}

/// Free-form key/value pair attached by users to parties and items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Invoice sender or receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Party {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "coerce::opt_vec", skip_serializing_if = "Option::is_none")]
    pub custom_inputs: Option<Vec<CustomInput>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Bank/transfer coordinates shown on the rendered invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentInformation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swift: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signature block: a data URL (drawn/uploaded) or typed text plus its font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Signature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shipping charge. `cost_type` is recorded but totals apply the flat cost,
/// matching the behavior documents were created under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Shipping {
    #[serde(deserialize_with = "coerce::opt_number", skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One invoice line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "coerce::opt_number", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(deserialize_with = "coerce::opt_number", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    /// Legacy alias of `unit_price`; kept in sync by normalization.
    #[serde(deserialize_with = "coerce::opt_number", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "coerce::opt_number", skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(
        deserialize_with = "coerce::opt_amount_percentage",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax: Option<Amount>,
    /// Legacy documents carried a bare number here, meaning a flat discount.
    #[serde(
        deserialize_with = "coerce::opt_amount_fixed",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount: Option<Amount>,
    #[serde(deserialize_with = "coerce::opt_number", skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(deserialize_with = "coerce::opt_number", skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<f64>,
    #[serde(deserialize_with = "coerce::opt_vec", skip_serializing_if = "Option::is_none")]
    pub custom_inputs: Option<Vec<CustomInput>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Everything about the invoice that is not a party: dates, items, totals,
/// payment terms, rendering selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Details {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(deserialize_with = "coerce::opt_date", skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "coerce::opt_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(deserialize_with = "coerce::opt_vec", skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Item>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    /// Legacy alias of `additional_notes`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Legacy alias of `payment_terms`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    /// Template selector for rendering/export.
    #[serde(deserialize_with = "coerce::opt_u32", skip_serializing_if = "Option::is_none")]
    pub pdf_template: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_order_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_information: Option<PaymentInformation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    #[serde(deserialize_with = "coerce::opt_number", skip_serializing_if = "Option::is_none")]
    pub sub_total: Option<f64>,
    #[serde(deserialize_with = "coerce::opt_number", skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(
        deserialize_with = "coerce::opt_amount_percentage",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax: Option<Amount>,
    #[serde(
        deserialize_with = "coerce::opt_amount_percentage",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Shipping>,
    /// Legacy alias of `tax`.
    #[serde(
        deserialize_with = "coerce::opt_amount_percentage",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax_details: Option<Amount>,
    /// Legacy alias of `discount`.
    #[serde(
        deserialize_with = "coerce::opt_amount_percentage",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount_details: Option<Amount>,
    /// Legacy alias of `shipping`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_details: Option<Shipping>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Legacy settings block; normalization merges it into [`Details`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(deserialize_with = "coerce::opt_u32", skip_serializing_if = "Option::is_none")]
    pub template: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The invoice document body. Storage identity (id, owner, timestamps) is
/// wrapped around this by the store layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<Party>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Party>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    /// Legacy root-level items; normalization moves these into `details`.
    #[serde(deserialize_with = "coerce::opt_vec", skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Item>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Invoice {
    /// Parse a JSON value through the permissive schema.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        serde_json::from_value(value)
            .map_err(|e| DomainError::validation(format!("invalid invoice data: {e}")))
    }

    /// The template selector, if the document names one.
    pub fn template_id(&self) -> Option<u32> {
        self.details.as_ref().and_then(|d| d.pdf_template)
    }

    /// The human-facing invoice number, if present.
    pub fn invoice_number(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|d| d.invoice_number.as_deref())
    }
}
