//! Rate tables and the document format they are loaded from

use crate::core::currency::CurrencyCode;
use crate::core::error::{ServiceError, ServiceResult};
use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;

/// Base currency of the table served when no rates could be loaded.
pub const FALLBACK_BASE: &str = "USD";

const BASE_RATE_TOLERANCE: f64 = 1e-9;

/// Immutable snapshot of exchange rates, each expressed against `base`.
///
/// The base is always present with a rate of exactly 1.0 and every rate is
/// finite and strictly positive. A refresh builds a new table instead of
/// mutating this one.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
    as_of: Option<NaiveDate>,
}

impl RateTable {
    /// Builds a validated table. The base may be omitted from `rates`.
    pub fn new<I>(base: CurrencyCode, rates: I) -> ServiceResult<Self>
    where
        I: IntoIterator<Item = (CurrencyCode, f64)>,
    {
        let mut table = BTreeMap::new();
        for (code, rate) in rates {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ServiceError::source_unavailable(anyhow!(
                    "Rate for {} must be a positive finite number, got {}",
                    code,
                    rate
                )));
            }
            if code == base && (rate - 1.0).abs() > BASE_RATE_TOLERANCE {
                return Err(ServiceError::source_unavailable(anyhow!(
                    "Base currency {} must have a rate of 1.0, got {}",
                    code,
                    rate
                )));
            }
            if table.insert(code.clone(), rate).is_some() {
                return Err(ServiceError::source_unavailable(anyhow!(
                    "Duplicate currency code {}",
                    code
                )));
            }
        }
        table.insert(base.clone(), 1.0);

        Ok(Self {
            base,
            rates: table,
            as_of: None,
        })
    }

    /// Degraded-mode table holding only [`FALLBACK_BASE`] at 1.0.
    pub fn fallback() -> Self {
        let base = CurrencyCode::normalize(FALLBACK_BASE);
        let mut rates = BTreeMap::new();
        rates.insert(base.clone(), 1.0);
        Self {
            base,
            rates,
            as_of: None,
        }
    }

    pub fn with_as_of(mut self, as_of: Option<NaiveDate>) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    pub fn rate(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.rates.contains_key(code)
    }

    /// Currency codes in ascending order, base included.
    pub fn currencies(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.rates.keys()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// On-the-wire shape of a rate source, e.g.
/// `{"base": "USD", "date": "2024-05-01", "rates": {"EUR": 0.9}}`.
#[derive(Debug, Deserialize)]
pub struct RateDocument {
    pub base: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "rate_entries")]
    pub rates: Vec<(String, f64)>,
}

impl RateDocument {
    pub fn from_json(text: &str) -> ServiceResult<Self> {
        serde_json::from_str(text)
            .context("Failed to parse exchange rate document")
            .map_err(ServiceError::SourceUnavailable)
    }

    /// Validates codes and rates and builds the table.
    pub fn into_table(self) -> ServiceResult<RateTable> {
        let base: CurrencyCode = self
            .base
            .parse()
            .context("Invalid base currency")
            .map_err(ServiceError::SourceUnavailable)?;

        let mut entries = Vec::with_capacity(self.rates.len());
        for (raw, rate) in self.rates {
            let code: CurrencyCode = raw.parse().map_err(ServiceError::SourceUnavailable)?;
            entries.push((code, rate));
        }

        Ok(RateTable::new(base, entries)?.with_as_of(self.date))
    }
}

/// Keeps map entries as a list so repeated keys are caught during validation
/// instead of silently overwritten.
fn rate_entries<'de, D>(deserializer: D) -> Result<Vec<(String, f64)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, f64)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of currency code to rate")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((code, rate)) = map.next_entry::<String, f64>()? {
                entries.push((code, rate));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}
