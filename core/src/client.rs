use std::time::Duration;

use reqwest::Method;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{BreakwaterError, Result};
use crate::types::Credentials;

const API_PATH: &str = "/api/v1/";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(30);
const RESULT_RETRIES: u32 = 8;
const RETRY_DELAY_UNIT: Duration = Duration::from_secs(1);

/// Client for the analysis server's REST API.
///
/// Every request carries the fixed client identifier and the credential
/// headers. Failures are collapsed per request; only result polling retries.
#[derive(Debug, Clone)]
pub struct ResultClient {
    client: reqwest::Client,
    credentials: Credentials,
    retries: u32,
    retry_delay_unit: Duration,
}

impl ResultClient {
    pub fn new(credentials: Credentials) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            credentials,
            retries: RESULT_RETRIES,
            retry_delay_unit: RETRY_DELAY_UNIT,
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay_unit(mut self, unit: Duration) -> Self {
        self.retry_delay_unit = unit;
        self
    }

    /// Lightweight auth probe; any failure reads as "not authorized".
    pub async fn is_authorized(&self) -> bool {
        self.request(Method::GET, "authorization").await.is_some()
    }

    /// Fetch the result for a scan. `Ok(None)` means the server never
    /// produced a result within the retry budget.
    pub async fn result(&self, scan_id: &str, cancel: &CancellationToken) -> Result<Option<Value>> {
        self.get_with_retry(&format!("scans/{}", scan_id), cancel)
            .await
    }

    /// Retry with linearly growing waits: 1 unit after the first failed
    /// attempt, 2 after the second, and none after the last.
    async fn get_with_retry(&self, path: &str, cancel: &CancellationToken) -> Result<Option<Value>> {
        for attempt in 1..=self.retries {
            if let Some(result) = self.request(Method::GET, path).await {
                return Ok(Some(result));
            }
            if attempt < self.retries {
                warn!(attempt, path, "attempt failed, waiting before retry");
                let delay = self.retry_delay_unit * attempt;
                tokio::select! {
                    _ = cancel.cancelled() => {
                        return Err(BreakwaterError::Execution {
                            message: "result polling was interrupted".to_string(),
                        });
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
        Ok(None)
    }

    /// Issue one request. Every verb is accepted; the pipeline only uses
    /// GET. A non-2xx status, transport failure or unreadable body all
    /// collapse to `None`.
    async fn request(&self, method: Method, path: &str) -> Option<Value> {
        let url = format!("{}{}{}", self.credentials.url(), API_PATH, path);
        let response = self
            .client
            .request(method, &url)
            .header("User-Agent", self.credentials.user_agent())
            .header("X-ApiKey", &self.credentials.api_token)
            .header("X-User", &self.credentials.user_name)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => Some(json_to_object(&body)),
                Err(e) => {
                    warn!(%url, error = %e, "failed to read response body");
                    None
                }
            },
            Ok(response) => {
                warn!(%url, status = %response.status(), "request failed");
                None
            }
            Err(e) => {
                warn!(%url, error = %e, "request failed");
                None
            }
        }
    }
}

/// Normalize a response body so callers always receive an object-shaped
/// value: objects pass through, arrays and non-JSON bodies are wrapped
/// under a `data` key.
pub fn json_to_object(body: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(value @ Value::Array(_)) => json!({ "data": value }),
        _ => json!({ "data": body }),
    }
}
