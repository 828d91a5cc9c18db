//! Rate source abstractions

use crate::core::error::ServiceResult;
use crate::core::rates::RateTable;
use async_trait::async_trait;

/// Loads a complete rate table from some external provider.
///
/// Every failure, including validation of the loaded data, is reported as
/// [`ServiceError::SourceUnavailable`](crate::core::error::ServiceError::SourceUnavailable).
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Short description used in logs, e.g. a file path or URL.
    fn describe(&self) -> String;

    async fn load(&self) -> ServiceResult<RateTable>;
}
