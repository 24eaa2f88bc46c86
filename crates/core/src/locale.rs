//! Supported UI/email locales.

use serde::{Deserialize, Serialize};

/// Locales the application ships catalogs for.
///
/// Unknown locale tags fall back to [`Locale::En`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
    Es,
    Fr,
    Pl,
    Pt,
    Zh,
}

impl Locale {
    pub const ALL: [Locale; 7] = [
        Locale::En,
        Locale::De,
        Locale::Es,
        Locale::Fr,
        Locale::Pl,
        Locale::Pt,
        Locale::Zh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
            Locale::Es => "es",
            Locale::Fr => "fr",
            Locale::Pl => "pl",
            Locale::Pt => "pt",
            Locale::Zh => "zh",
        }
    }

    /// Parse a locale tag (e.g. from an `x-locale` header), falling back to English.
    pub fn parse_or_default(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "de" => Locale::De,
            "es" => Locale::Es,
            "fr" => Locale::Fr,
            "pl" => Locale::Pl,
            "pt" => Locale::Pt,
            "zh" => Locale::Zh,
            _ => Locale::En,
        }
    }
}

impl core::fmt::Display for Locale {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tags_fall_back_to_english() {
        assert_eq!(Locale::parse_or_default("nl"), Locale::En);
        assert_eq!(Locale::parse_or_default(""), Locale::En);
        assert_eq!(Locale::parse_or_default("DE"), Locale::De);
    }
}
