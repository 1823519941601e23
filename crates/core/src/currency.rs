//! Fixed currency lookup table.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// ISO 4217 currencies the parser can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Inr,
    Cad,
    Aud,
    Chf,
}

/// Symbol spellings, longest first so `CA$` wins over `$`.
pub const CURRENCY_SYMBOLS: &[(&str, Currency)] = &[
    ("CA$", Currency::Cad),
    ("US$", Currency::Usd),
    ("C$", Currency::Cad),
    ("A$", Currency::Aud),
    ("$", Currency::Usd),
    ("€", Currency::Eur),
    ("£", Currency::Gbp),
    ("¥", Currency::Jpy),
    ("₹", Currency::Inr),
];

impl Currency {
    pub const ALL: [Currency; 8] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Inr,
        Currency::Cad,
        Currency::Aud,
        Currency::Chf,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Inr => "INR",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Chf => "CHF",
        }
    }

    /// Look up an ISO code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Look up a currency symbol (exact spelling).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        CURRENCY_SYMBOLS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, c)| *c)
    }

    /// `$` alone is a generic dollar sign that an adjacent ISO code may refine.
    pub fn is_generic_dollar_symbol(symbol: &str) -> bool {
        symbol == "$"
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
            .ok_or_else(|| PipelineError::validation(format!("unknown currency code: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_case_insensitive() {
        assert_eq!(Currency::from_code("eur"), Some(Currency::Eur));
        assert_eq!(Currency::from_code(" USD "), Some(Currency::Usd));
        assert_eq!(Currency::from_code("XYZ"), None);
    }

    #[test]
    fn symbols_resolve() {
        assert_eq!(Currency::from_symbol("CA$"), Some(Currency::Cad));
        assert_eq!(Currency::from_symbol("£"), Some(Currency::Gbp));
        assert_eq!(Currency::from_symbol("₿"), None);
    }

    #[test]
    fn serializes_as_iso_code() {
        assert_eq!(serde_json::to_string(&Currency::Chf).unwrap(), "\"CHF\"");
        let parsed: Currency = serde_json::from_str("\"GBP\"").unwrap();
        assert_eq!(parsed, Currency::Gbp);
    }

    #[test]
    fn from_str_rejects_unknown_code() {
        assert!("BTC".parse::<Currency>().unwrap_err().is_validation());
    }
}
