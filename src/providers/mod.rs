pub mod file;
pub mod http;
pub mod util;

use crate::core::config::SourceConfig;
use crate::core::source::RateSource;
use anyhow::Result;
use std::sync::Arc;

pub use file::FileRateSource;
pub use http::HttpRateSource;

/// Builds the rate source described by the configuration.
pub fn from_config(config: &SourceConfig) -> Result<Arc<dyn RateSource>> {
    let source: Arc<dyn RateSource> = match config {
        SourceConfig::File(file) => Arc::new(FileRateSource::new(&file.path)),
        SourceConfig::Http(http) => Arc::new(HttpRateSource::new(http)?),
    };
    Ok(source)
}
