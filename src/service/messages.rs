//! Request and response records of the conversion service.
//!
//! Domain failures are carried as data (`success = false` plus a message),
//! never as transport errors.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub from_currency: String,
    pub to_currency: String,
    #[serde(default = "missing_amount", deserialize_with = "lenient_amount")]
    pub amount: f64,
}

fn missing_amount() -> f64 {
    f64::NAN
}

/// Accepts a JSON number, a numeric string or null; a missing field falls back
/// to [`missing_amount`]. Anything that is not a number becomes NaN so the
/// handler reports it as invalid input instead of the transport rejecting the
/// whole request.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
        Null(()),
    }

    Ok(match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(value) => value,
        RawAmount::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        RawAmount::Null(()) => f64::NAN,
    })
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub converted_amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub exchange_rate: f64,
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateRequest {
    pub from_currency: String,
    pub to_currency: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExchangeRateResponse {
    pub success: bool,
    pub exchange_rate: f64,
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrenciesResponse {
    pub success: bool,
    pub currencies: Vec<String>,
    pub error_message: String,
}
