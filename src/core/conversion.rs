//! Rate resolution and amount conversion against a single rate table.
//!
//! All rates in a [`RateTable`] are quoted against its base, so any pair can be
//! resolved from at most two lookups:
//!
//! - base to X: `rates[X]`
//! - X to base: `1 / rates[X]`
//! - X to Y: `rates[Y] / rates[X]` (cross rate via the base)
//!
//! Converted amounts are rounded to two decimal places, half away from zero.
//! The exchange rate itself is reported at full precision.

use crate::core::currency::CurrencyCode;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::rates::RateTable;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub amount: f64,
    pub converted_amount: f64,
    pub rate: f64,
}

/// Rate that converts one unit of `from` into `to`.
///
/// `from` is checked before `to`, so when both are unknown the error names `from`.
pub fn resolve_rate(table: &RateTable, from: &str, to: &str) -> ServiceResult<f64> {
    let from = CurrencyCode::normalize(from);
    let to = CurrencyCode::normalize(to);

    let from_rate = table
        .rate(&from)
        .ok_or_else(|| ServiceError::UnknownCurrency(from.clone()))?;
    let to_rate = table
        .rate(&to)
        .ok_or_else(|| ServiceError::UnknownCurrency(to.clone()))?;

    let rate = if from == to {
        1.0
    } else if &from == table.base() {
        to_rate
    } else if &to == table.base() {
        1.0 / from_rate
    } else {
        to_rate / from_rate
    };
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ServiceError::InvalidInput(format!(
            "rate from {from} to {to} is out of range"
        )));
    }
    Ok(rate)
}

pub fn convert(table: &RateTable, from: &str, to: &str, amount: f64) -> ServiceResult<ConversionResult> {
    validate_amount(amount)?;
    let rate = resolve_rate(table, from, to)?;
    let converted = amount * rate;
    if !converted.is_finite() {
        return Err(ServiceError::InvalidInput(format!(
            "converted amount of {amount} is out of range"
        )));
    }

    Ok(ConversionResult {
        from_currency: CurrencyCode::normalize(from),
        to_currency: CurrencyCode::normalize(to),
        amount,
        converted_amount: round_amount(converted),
        rate,
    })
}

pub fn validate_amount(amount: f64) -> ServiceResult<()> {
    if amount.is_finite() {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!(
            "amount must be a finite number, got {amount}"
        )))
    }
}

/// Magnitude above which an `f64` carries no fractional cents.
const WHOLE_CENTS_LIMIT: f64 = (1u64 << 52) as f64 / 100.0;

/// Rounds to two decimal places, half away from zero.
pub fn round_amount(value: f64) -> f64 {
    if value.abs() >= WHOLE_CENTS_LIMIT {
        return value;
    }
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    fn sample_table() -> RateTable {
        RateTable::new(
            CurrencyCode::normalize("USD"),
            vec![
                (CurrencyCode::normalize("USD"), 1.0),
                (CurrencyCode::normalize("EUR"), 0.9),
                (CurrencyCode::normalize("GBP"), 0.8),
                (CurrencyCode::normalize("JPY"), 155.3),
            ],
        )
        .unwrap()
    }

    fn unknown_code(err: ServiceError) -> String {
        match err {
            ServiceError::UnknownCurrency(code) => code.to_string(),
            other => panic!("Expected UnknownCurrency, got {other:?}"),
        }
    }

    #[test]
    fn test_base_to_other() {
        let table = sample_table();
        assert_eq!(resolve_rate(&table, "USD", "EUR").unwrap(), 0.9);
        assert_eq!(resolve_rate(&table, "USD", "JPY").unwrap(), 155.3);
    }

    #[test]
    fn test_other_to_base() {
        let table = sample_table();
        assert_eq!(resolve_rate(&table, "GBP", "USD").unwrap(), 1.25);
        assert_eq!(resolve_rate(&table, "EUR", "USD").unwrap(), 1.0 / 0.9);
    }

    #[test]
    fn test_cross_rate() {
        let table = sample_table();
        let rate = resolve_rate(&table, "EUR", "GBP").unwrap();
        assert!((rate - 0.8 / 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_same_currency_is_exactly_one() {
        let table = sample_table();
        for code in ["USD", "EUR", "GBP", "JPY"] {
            assert_eq!(resolve_rate(&table, code, code).unwrap(), 1.0);
        }
        assert_eq!(resolve_rate(&table, "eur", "EUR").unwrap(), 1.0);
    }

    #[test]
    fn test_inverse_rates_multiply_to_one() {
        let table = sample_table();
        let codes: Vec<String> = table.currencies().map(|c| c.to_string()).collect();
        for from in &codes {
            for to in &codes {
                let forward = resolve_rate(&table, from, to).unwrap();
                let backward = resolve_rate(&table, to, from).unwrap();
                assert!((forward * backward - 1.0).abs() < 1e-12, "{from}/{to}");
            }
        }
    }

    #[test]
    fn test_codes_are_case_insensitive() {
        let table = sample_table();
        assert_eq!(
            resolve_rate(&table, "usd", "eur").unwrap(),
            resolve_rate(&table, "USD", "EUR").unwrap()
        );
        assert_eq!(
            resolve_rate(&table, "Eur", "gBp").unwrap(),
            resolve_rate(&table, "EUR", "GBP").unwrap()
        );
    }

    #[test]
    fn test_unknown_currency_names_the_code() {
        let table = sample_table();
        assert_eq!(unknown_code(resolve_rate(&table, "chf", "USD").unwrap_err()), "CHF");
        assert_eq!(unknown_code(resolve_rate(&table, "USD", "chf").unwrap_err()), "CHF");
        // from is checked first
        assert_eq!(unknown_code(resolve_rate(&table, "AAA", "BBB").unwrap_err()), "AAA");
    }

    #[test]
    fn test_convert_examples() {
        let table = sample_table();

        let result = convert(&table, "USD", "EUR", 100.0).unwrap();
        assert_eq!(result.rate, 0.9);
        assert_eq!(result.converted_amount, 90.0);
        assert_eq!(result.from_currency.as_str(), "USD");
        assert_eq!(result.to_currency.as_str(), "EUR");

        let result = convert(&table, "eur", "gbp", 50.0).unwrap();
        assert!((result.rate - 0.888_888_888).abs() < 1e-6);
        assert_eq!(result.converted_amount, 44.44);
        assert_eq!(result.from_currency.as_str(), "EUR");
    }

    #[test]
    fn test_rate_is_not_rounded() {
        let table = sample_table();
        let result = convert(&table, "EUR", "USD", 10.0).unwrap();
        assert_eq!(result.rate, 1.0 / 0.9);
        assert_eq!(result.converted_amount, 11.11);
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        let table = sample_table();
        // 0.125 is exact in binary, so this hits the tie
        assert_eq!(convert(&table, "USD", "USD", 0.125).unwrap().converted_amount, 0.13);
        assert_eq!(convert(&table, "USD", "USD", -0.125).unwrap().converted_amount, -0.13);
        assert_eq!(round_amount(2.5), 2.5);
    }

    #[test]
    fn test_same_currency_amount_is_rounded() {
        let table = sample_table();
        let result = convert(&table, "GBP", "GBP", 12.3456).unwrap();
        assert_eq!(result.rate, 1.0);
        assert_eq!(result.converted_amount, 12.35);
    }

    #[test]
    fn test_zero_and_negative_amounts_are_allowed() {
        let table = sample_table();
        assert_eq!(convert(&table, "USD", "EUR", 0.0).unwrap().converted_amount, 0.0);
        assert_eq!(convert(&table, "USD", "EUR", -10.0).unwrap().converted_amount, -9.0);
    }

    #[test]
    fn test_non_finite_amount_is_invalid() {
        let table = sample_table();
        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = convert(&table, "USD", "EUR", amount).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        // amount is validated before currencies
        let err = convert(&table, "XXX", "EUR", f64::NAN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_huge_amounts_stay_finite() {
        let table = sample_table();
        let result = convert(&table, "USD", "USD", 1e307).unwrap();
        assert_eq!(result.converted_amount, 1e307);
        assert_eq!(round_amount(-1e300), -1e300);
        assert_eq!(round_amount(100_000_000_000_000.5), 100_000_000_000_000.5);
    }

    #[test]
    fn test_overflowing_conversion_is_invalid() {
        let table = sample_table();
        let err = convert(&table, "USD", "JPY", 1e308).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_overflowing_cross_rate_is_invalid() {
        let table = RateTable::new(
            CurrencyCode::normalize("USD"),
            vec![
                (CurrencyCode::normalize("AAA"), 1e-300),
                (CurrencyCode::normalize("BBB"), 1e300),
            ],
        )
        .unwrap();
        for (from, to) in [("AAA", "BBB"), ("BBB", "AAA")] {
            let err = resolve_rate(&table, from, to).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{from}/{to}");
            assert!(err.to_string().contains("out of range"));
        }
        assert_eq!(resolve_rate(&table, "USD", "BBB").unwrap(), 1e300);
    }
}
