//! Field-level coercion helpers for the permissive document schema.
//!
//! Client forms serialize numbers as strings, dates in several shapes, and
//! legacy documents carry bare numbers where objects are expected now. These
//! deserializers absorb all of that; they only error where the original
//! schema would (a malformed element inside an array).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::model::{Amount, AmountType};

pub(crate) fn number_from_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { None } else { s.parse::<f64>().ok() }
        }
        _ => None,
    }
}

/// Optional number accepting a number, a numeric string, `""`, or null.
pub fn opt_number<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(number_from_value(&v))
}

/// Optional small integer (template selectors), via the number coercion.
pub fn opt_u32<'de, D>(de: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(number_from_value(&v).filter(|n| *n >= 0.0).map(|n| n as u32))
}

pub(crate) fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return nd.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }
    None
}

/// Optional date accepting RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`,
/// `""`, or null. Unparseable strings coerce to absent.
pub fn opt_date<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    match v {
        Value::String(s) => Ok(parse_date_str(&s)),
        _ => Ok(None),
    }
}

pub(crate) fn amount_from_value(v: &Value, default_type: AmountType) -> Option<Amount> {
    match v {
        Value::Null => None,
        // Legacy documents carry a bare number where the object lives now.
        Value::Number(_) | Value::String(_) => number_from_value(v).map(|amount| Amount {
            amount,
            amount_type: default_type,
        }),
        Value::Object(map) => {
            let amount = map.get("amount").and_then(number_from_value).unwrap_or(0.0);
            let amount_type = map
                .get("amountType")
                .and_then(Value::as_str)
                .map(AmountType::parse_lenient)
                .unwrap_or(default_type);
            Some(Amount { amount, amount_type })
        }
        _ => None,
    }
}

/// Optional amount where a bare number means a percentage (tax-style fields).
pub fn opt_amount_percentage<'de, D>(de: D) -> Result<Option<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(amount_from_value(&v, AmountType::Percentage))
}

/// Optional amount where a bare number means a flat value (legacy item discounts).
pub fn opt_amount_fixed<'de, D>(de: D) -> Result<Option<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(amount_from_value(&v, AmountType::Fixed))
}

/// Optional array accepting an array, `""`, or null. Elements still parse
/// strictly; a malformed element is an error, not a silent drop.
pub fn opt_vec<'de, D, T>(de: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let v = Value::deserialize(de)?;
    match v {
        Value::Array(_) => serde_json::from_value(v)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_coerce_from_strings() {
        assert_eq!(number_from_value(&json!(12.5)), Some(12.5));
        assert_eq!(number_from_value(&json!("12.5")), Some(12.5));
        assert_eq!(number_from_value(&json!("")), None);
        assert_eq!(number_from_value(&json!("  42 ")), Some(42.0));
        assert_eq!(number_from_value(&json!(null)), None);
        assert_eq!(number_from_value(&json!("abc")), None);
    }

    #[test]
    fn dates_parse_from_common_shapes() {
        let d = parse_date_str("2024-03-01").unwrap();
        assert_eq!(d.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let d = parse_date_str("2024-03-01T10:30:00Z").unwrap();
        assert_eq!(d.to_rfc3339(), "2024-03-01T10:30:00+00:00");

        assert!(parse_date_str("").is_none());
        assert!(parse_date_str("next tuesday").is_none());
    }

    #[test]
    fn bare_number_amounts_take_the_site_default_type() {
        let a = amount_from_value(&json!(19), AmountType::Percentage).unwrap();
        assert_eq!(a.amount, 19.0);
        assert_eq!(a.amount_type, AmountType::Percentage);

        let a = amount_from_value(&json!(7.5), AmountType::Fixed).unwrap();
        assert_eq!(a.amount_type, AmountType::Fixed);
    }

    #[test]
    fn object_amounts_accept_legacy_type_spellings() {
        let a = amount_from_value(
            &json!({"amount": "10", "amountType": "amount"}),
            AmountType::Percentage,
        )
        .unwrap();
        assert_eq!(a.amount, 10.0);
        assert_eq!(a.amount_type, AmountType::Fixed);

        let a = amount_from_value(&json!({"amount": 5}), AmountType::Percentage).unwrap();
        assert_eq!(a.amount_type, AmountType::Percentage);
    }
}
