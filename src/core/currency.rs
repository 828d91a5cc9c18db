//! Currency codes

use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

const MAX_CODE_LEN: usize = 8;

/// An upper-case currency code such as `USD`.
///
/// Request input goes through [`CurrencyCode::normalize`], which only trims and
/// upper-cases, so an unknown or odd-looking code is reported back verbatim.
/// Rate source data goes through the stricter [`FromStr`] impl.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn normalize(code: &str) -> Self {
        CurrencyCode(code.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.is_empty() || code.len() > MAX_CODE_LEN {
            return Err(anyhow::anyhow!(
                "Invalid currency code '{}': expected 1 to {} letters",
                s,
                MAX_CODE_LEN
            ));
        }
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(anyhow::anyhow!(
                "Invalid currency code '{}': only ASCII letters are allowed",
                s
            ));
        }
        Ok(Self::normalize(code))
    }
}
