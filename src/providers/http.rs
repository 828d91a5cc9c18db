use crate::core::config::HttpSourceConfig;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::rates::{RateDocument, RateTable};
use crate::core::source::RateSource;
use crate::providers::util::with_retry;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

const RETRY_DELAY_MS: u64 = 500;

/// Fetches a JSON rate document over HTTP. Each request is bounded by the
/// configured timeout; transport failures are retried, HTTP error statuses are not.
pub struct HttpRateSource {
    url: String,
    retries: usize,
    retry_delay_ms: u64,
    client: reqwest::Client,
}

impl HttpRateSource {
    pub fn new(config: &HttpSourceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("xrate/1.0")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpRateSource {
            url: config.url.clone(),
            retries: config.retries,
            retry_delay_ms: RETRY_DELAY_MS,
            client,
        })
    }

    pub fn with_retry_delay(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = delay_ms;
        self
    }

    async fn fetch(&self) -> anyhow::Result<String> {
        debug!("Requesting exchange rates from {}", self.url);
        let response = with_retry(
            || async { self.client.get(&self.url).send().await },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .with_context(|| format!("Request error for URL: {}", self.url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for URL: {}",
                response.status(),
                self.url
            ));
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", self.url))
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    #[instrument(name = "HttpRateLoad", skip(self))]
    async fn load(&self) -> ServiceResult<RateTable> {
        let text = self.fetch().await.map_err(ServiceError::SourceUnavailable)?;
        RateDocument::from_json(&text)?.into_table()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use crate::core::error::ErrorKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RATES_PATH: &str = "/latest.json";

    async fn create_mock_server(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RATES_PATH))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn source_for(server: &MockServer, timeout_secs: u64) -> HttpRateSource {
        let config = HttpSourceConfig {
            url: format!("{}{}", server.uri(), RATES_PATH),
            timeout_secs,
            retries: 1,
        };
        HttpRateSource::new(&config).unwrap().with_retry_delay(1)
    }

    #[tokio::test]
    async fn test_successful_load() {
        let body = r#"{"base": "EUR", "date": "2024-05-01", "rates": {"USD": 1.08, "GBP": 0.86}}"#;
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;

        let table = source_for(&server, 5).load().await.unwrap();
        assert_eq!(table.base().as_str(), "EUR");
        assert_eq!(table.len(), 3);
        assert_eq!(table.rate(&CurrencyCode::normalize("USD")), Some(1.08));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = create_mock_server(ResponseTemplate::new(500)).await;

        let err = source_for(&server, 5).load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
        assert!(err.to_string().contains("HTTP error: 500 Internal Server Error"));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let body = r#"{"currency": "USD", "values": []}"#;
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;

        let err = source_for(&server, 5).load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
        assert!(err.to_string().contains("Failed to parse exchange rate document"));
    }

    #[tokio::test]
    async fn test_timeout_is_source_unavailable() {
        let body = r#"{"base": "USD", "rates": {}}"#;
        let slow = ResponseTemplate::new(200)
            .set_body_string(body)
            .set_delay(Duration::from_secs(3));
        let server = create_mock_server(slow).await;

        let err = source_for(&server, 1).load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
        assert!(err.to_string().contains("Request error for URL"));
    }
}
