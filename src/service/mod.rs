//! Request handlers of the currency conversion service.

pub mod messages;

use crate::core::conversion;
use crate::core::currency::CurrencyCode;
use crate::store::RateStore;
use messages::{
    ConvertRequest, ConvertResponse, CurrenciesResponse, ExchangeRateRequest,
    ExchangeRateResponse,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Binds the three service operations to a shared [`RateStore`].
///
/// Each call fetches one table snapshot and computes against it, so a refresh
/// landing mid-request cannot mix rates from two tables.
#[derive(Clone)]
pub struct CurrencyService {
    store: Arc<RateStore>,
}

impl CurrencyService {
    pub fn new(store: Arc<RateStore>) -> Self {
        Self { store }
    }

    #[instrument(
        name = "Convert",
        skip(self, request),
        fields(from = %request.from_currency, to = %request.to_currency, amount = request.amount)
    )]
    pub async fn convert(&self, request: &ConvertRequest) -> ConvertResponse {
        info!("Convert request");
        let from_currency = CurrencyCode::normalize(&request.from_currency).to_string();
        let to_currency = CurrencyCode::normalize(&request.to_currency).to_string();

        if let Err(e) = conversion::validate_amount(request.amount) {
            warn!(error = %e, "Rejected convert request");
            return ConvertResponse {
                success: false,
                from_currency,
                to_currency,
                error_message: e.to_string(),
                ..Default::default()
            };
        }

        let table = self.store.get().await;
        match conversion::convert(
            &*table,
            &request.from_currency,
            &request.to_currency,
            request.amount,
        ) {
            Ok(result) => ConvertResponse {
                success: true,
                converted_amount: result.converted_amount,
                from_currency: result.from_currency.to_string(),
                to_currency: result.to_currency.to_string(),
                exchange_rate: result.rate,
                error_message: String::new(),
            },
            Err(e) => {
                warn!(error = %e, "Conversion failed");
                ConvertResponse {
                    success: false,
                    from_currency,
                    to_currency,
                    error_message: e.to_string(),
                    ..Default::default()
                }
            }
        }
    }

    #[instrument(
        name = "GetExchangeRate",
        skip(self, request),
        fields(from = %request.from_currency, to = %request.to_currency)
    )]
    pub async fn get_exchange_rate(&self, request: &ExchangeRateRequest) -> ExchangeRateResponse {
        info!("Exchange rate request");
        let table = self.store.get().await;
        match conversion::resolve_rate(&*table, &request.from_currency, &request.to_currency) {
            Ok(rate) => ExchangeRateResponse {
                success: true,
                exchange_rate: rate,
                error_message: String::new(),
            },
            Err(e) => {
                warn!(error = %e, "Rate lookup failed");
                ExchangeRateResponse {
                    success: false,
                    error_message: e.to_string(),
                    ..Default::default()
                }
            }
        }
    }

    #[instrument(name = "ListCurrencies", skip(self))]
    pub async fn list_currencies(&self) -> CurrenciesResponse {
        info!("Request for available currencies");
        let table = self.store.get().await;
        CurrenciesResponse {
            success: true,
            currencies: table.currencies().map(|code| code.to_string()).collect(),
            error_message: String::new(),
        }
    }
}
