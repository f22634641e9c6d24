use crate::shared::error::RegistryError;
use crate::shared::Result;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// HttpFetcher - shared JSON-over-HTTP transport for the registry clients
///
/// Holds one pooled `reqwest::Client` with the configured request timeout
/// and retries transient failures up to `max_retries` times after the first
/// attempt. HTTP 404 is an answer, not a failure: it is returned as
/// `Ok(None)` without retrying.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
}

impl HttpFetcher {
    /// Creates a fetcher with the given per-request timeout and retry limit
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("arch-compat/{}", version);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            timeout,
            max_retries,
        })
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// GETs `url` and decodes the JSON body, retrying transient failures
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> std::result::Result<Option<T>, RegistryError> {
        retry_with_backoff(self.max_retries, || self.get_once(url)).await
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> std::result::Result<Option<T>, RegistryError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RegistryError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.map_error(e))?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| RegistryError::Parse(e.to_string()))
    }

    fn map_error(&self, e: reqwest::Error) -> RegistryError {
        match RegistryError::from(e) {
            RegistryError::Timeout(_) => RegistryError::Timeout(self.timeout),
            other => other,
        }
    }
}

/// Runs `op` once, then retries it up to `max_retries` more times with
/// linear backoff (100ms × retry number). Non-retryable errors are returned
/// immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    mut op: F,
) -> std::result::Result<T, RegistryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RegistryError>>,
{
    let mut retry = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && retry < max_retries => {
                retry += 1;
                tracing::debug!(retry, error = %e, "registry request failed, retrying");
                tokio::time::sleep(Duration::from_millis(100 * u64::from(retry))).await;
            }
            Err(e) => return Err(e),
        }
    }
}
