//! Display formatting shared by the layouts.

use chrono::{DateTime, Utc};

/// Escape text for HTML element/attribute context.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `EUR 1,234.50` — code-prefixed, grouped, two decimals.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{currency} {sign}{grouped}.{frac:02}")
}

/// `May 1, 2024`, or empty for absent dates.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_grouping_and_decimals() {
        assert_eq!(format_currency(0.0, "USD"), "USD 0.00");
        assert_eq!(format_currency(49.5, "EUR"), "EUR 49.50");
        assert_eq!(format_currency(1234.5, "USD"), "USD 1,234.50");
        assert_eq!(format_currency(1_000_000.0, "USD"), "USD 1,000,000.00");
        assert_eq!(format_currency(-42.0, "GBP"), "GBP -42.00");
    }

    #[test]
    fn rounding_is_to_the_nearest_cent() {
        assert_eq!(format_currency(2.336, "USD"), "USD 2.34");
        assert_eq!(format_currency(2.334, "USD"), "USD 2.33");
    }

    #[test]
    fn dates_render_human_readable() {
        let d = chrono::DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_date(Some(d)), "May 1, 2024");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn escaping_covers_markup_characters() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
