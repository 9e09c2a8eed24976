use crate::core::{DeliveryOutcome, RecordDelivery};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_url;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// base64("username:password")
pub fn basic_credential(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", username, password))
}

/// POSTs serialized records to one endpoint with Basic authentication.
///
/// The credential and the connection pool are fixed at [`DeliveryClient::configure`]
/// and only read afterwards.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    endpoint: Url,
    client: Client,
}

impl DeliveryClient {
    pub fn configure(endpoint: &str, username: &str, password: &str) -> Result<Self> {
        Self::with_timeout(endpoint, username, password, REQUEST_TIMEOUT)
    }

    pub(crate) fn with_timeout(
        endpoint: &str,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self> {
        if endpoint.trim().is_empty() {
            return Err(EtlError::ConfigError {
                message: "API endpoint cannot be empty".to_string(),
            });
        }
        let endpoint = validate_url("api_endpoint", endpoint)?;

        let mut auth = HeaderValue::from_str(&format!(
            "Basic {}",
            basic_credential(username, password)
        ))
        .map_err(|e| EtlError::ConfigError {
            message: format!("Invalid Authorization header: {}", e),
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| EtlError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        tracing::debug!("HTTP client configured for {} (timeout {:?})", endpoint, timeout);

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn failed(&self, ub_id: i32, err: reqwest::Error) -> DeliveryOutcome {
        let reason = error_chain(&err);
        if err.is_timeout() {
            tracing::error!(ub_id, status = "timeout", "⏱️ Timeout Error for UB_ID {}: {}", ub_id, reason);
            DeliveryOutcome::Timeout(reason)
        } else if err.is_connect() || err.is_request() || err.is_body() {
            tracing::error!(ub_id, status = "transport_error", "HTTP Error for UB_ID {}: {}", ub_id, reason);
            DeliveryOutcome::TransportError(reason)
        } else {
            tracing::error!(ub_id, status = "unexpected_error", "Unexpected Error for UB_ID {}: {}", ub_id, reason);
            DeliveryOutcome::TransportError(reason)
        }
    }
}

#[async_trait::async_trait]
impl RecordDelivery for DeliveryClient {
    async fn deliver(&self, ub_id: i32, payload: Vec<u8>) -> DeliveryOutcome {
        tracing::debug!("📡 POST {} for UB_ID {} ({} bytes)", self.endpoint, ub_id, payload.len());

        let response = match self.client.post(self.endpoint.clone()).body(payload).send().await {
            Ok(response) => response,
            Err(e) => return self.failed(ub_id, e),
        };

        let status = response.status();
        tracing::info!(ub_id, status = status.as_u16(), "API call for UB_ID {}: {}", ub_id, status);

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.failed(ub_id, e),
        };

        if status.is_success() {
            tracing::info!(ub_id, status = status.as_u16(), "✅ API Success for UB_ID {}: {}", ub_id, body);
            DeliveryOutcome::Success {
                status: status.as_u16(),
                body,
            }
        } else {
            tracing::warn!(ub_id, status = status.as_u16(), "API Error for UB_ID {}: {} - {}", ub_id, status, body);
            DeliveryOutcome::ApiRejected {
                status: status.as_u16(),
                body,
            }
        }
    }

    /// 釋放連線池
    fn close(self) {
        tracing::debug!("Releasing HTTP client for {}", self.endpoint);
        drop(self.client);
    }
}

// reqwest 的 Display 只有最外層訊息，底層原因 (connection refused 等) 在 source 鏈中
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
