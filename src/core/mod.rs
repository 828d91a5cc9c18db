//! Core business logic abstractions

pub mod config;
pub mod conversion;
pub mod currency;
pub mod error;
pub mod log;
pub mod rates;
pub mod source;

// Re-export main types for cleaner imports
pub use conversion::{ConversionResult, convert, resolve_rate};
pub use currency::CurrencyCode;
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use rates::{RateDocument, RateTable};
pub use source::RateSource;
