use std::fmt;

use crate::errors::GenerationError;

/// Languages with localized fake data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocaleKey {
    EnUs,
    FrFr,
    PtBr,
}

impl LocaleKey {
    pub const ALL: [LocaleKey; 3] = [LocaleKey::EnUs, LocaleKey::FrFr, LocaleKey::PtBr];

    /// Accepts `en_US`, `en-US` and case variants.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().replace('-', "_").to_ascii_lowercase();
        match normalized.as_str() {
            "en" | "en_us" => Some(Self::EnUs),
            "fr" | "fr_fr" => Some(Self::FrFr),
            "pt" | "pt_br" => Some(Self::PtBr),
            _ => None,
        }
    }

    pub fn resolve(value: &str) -> Result<Self, GenerationError> {
        Self::parse(value).ok_or_else(|| GenerationError::UnsupportedLocale(value.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::FrFr => "fr_FR",
            Self::PtBr => "pt_BR",
        }
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
