use crate::core::error::{ServiceError, ServiceResult};
use crate::core::rates::{RateDocument, RateTable};
use crate::core::source::RateSource;
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Reads a JSON rate document from the local filesystem on every load.
pub struct FileRateSource {
    path: PathBuf,
}

impl FileRateSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileRateSource {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RateSource for FileRateSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(name = "FileRateLoad", skip(self))]
    async fn load(&self) -> ServiceResult<RateTable> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read rates file: {}", self.path.display()))
            .map_err(ServiceError::SourceUnavailable)?;
        debug!(bytes = text.len(), "Read rates file {}", self.path.display());

        RateDocument::from_json(&text)?.into_table()
    }
}
