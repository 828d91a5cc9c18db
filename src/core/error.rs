//! Domain errors reported by the rate store, the conversion engine and the handlers.

use crate::core::currency::CurrencyCode;
use serde::Serialize;
use thiserror::Error;

/// Tag for a [`ServiceError`], handy for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    UnknownCurrency,
    SourceUnavailable,
    InvalidInput,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested code is not in the current rate table.
    #[error("Currency {0} not found")]
    UnknownCurrency(CurrencyCode),

    /// Loading a rate table failed. Never escapes the rate store.
    #[error("Exchange rate source unavailable: {0:#}")]
    SourceUnavailable(#[source] anyhow::Error),

    /// Non-finite or otherwise malformed request input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::UnknownCurrency(_) => ErrorKind::UnknownCurrency,
            ServiceError::SourceUnavailable(_) => ErrorKind::SourceUnavailable,
            ServiceError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    pub fn source_unavailable(cause: impl Into<anyhow::Error>) -> Self {
        ServiceError::SourceUnavailable(cause.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
