use crate::config::LookupConfig;
use crate::error::LookupError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum number of characters of an error body kept in [`LookupError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 256;

/// A resource recommended by the inference service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceResult {
    pub address: String,
    pub type_of_resource: String,
    /// Contact number of the resource, when the service could find one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Serialize)]
struct ProcessRequest<'a> {
    text: &'a str,
}

/// Wire shape of a `/process` reply. Every field is optional here so that a
/// missing or `null` field is reported as [`LookupError::Malformed`] with the
/// field name rather than as a generic decode error.
#[derive(Deserialize)]
struct ProcessResponse {
    address: Option<String>,
    type_of_resource: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

impl ProcessResponse {
    fn into_result(self) -> Result<ResourceResult, LookupError> {
        Ok(ResourceResult {
            address: required(self.address, "address")?,
            type_of_resource: required(self.type_of_resource, "type_of_resource")?,
            phone: self.phone.filter(|phone| !phone.trim().is_empty()),
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, LookupError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(LookupError::Malformed(format!("field `{field}` is blank"))),
        None => Err(LookupError::Malformed(format!("missing field `{field}`"))),
    }
}

/// HTTP client for the inference service's `/process` endpoint.
///
/// Built once at startup and shared; cloning is cheap because the underlying
/// `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct LookupClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl LookupClient {
    /// Creates a client for the service at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] if the base URL is empty or not
    /// http(s), if the timeout is zero, or if the HTTP client cannot be built.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let base = config.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(LookupError::Config("lookup base_url is empty".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(LookupError::Config(format!(
                "lookup base_url must start with http:// or https://, got {base}"
            )));
        }
        if config.timeout_secs == 0 {
            return Err(LookupError::Config(
                "lookup timeout_secs must be greater than zero".to_string(),
            ));
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lifeline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: format!("{base}/process"),
            timeout,
        })
    }

    /// The full URL lookups are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends `transcript` to the inference service and returns its recommendation.
    ///
    /// An empty transcript is forwarded unchanged. Failures are logged here
    /// and returned to the caller without retrying.
    pub async fn lookup(&self, transcript: &str) -> Result<ResourceResult, LookupError> {
        let result = self.request(transcript).await;
        match &result {
            Ok(resource) => tracing::debug!(
                endpoint = %self.endpoint,
                type_of_resource = %resource.type_of_resource,
                has_phone = resource.phone.is_some(),
                "resource lookup succeeded"
            ),
            Err(e) => tracing::warn!(
                endpoint = %self.endpoint,
                error = %e,
                "resource lookup failed"
            ),
        }
        result
    }

    async fn request(&self, transcript: &str) -> Result<ResourceResult, LookupError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&ProcessRequest { text: transcript })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body)
                    .chars()
                    .take(MAX_ERROR_BODY_CHARS)
                    .collect(),
            });
        }

        let parsed: ProcessResponse =
            serde_json::from_slice(&body).map_err(|e| LookupError::Malformed(e.to_string()))?;
        parsed.into_result()
    }

    fn transport_error(&self, e: reqwest::Error) -> LookupError {
        if e.is_timeout() {
            LookupError::Timeout(self.timeout.as_secs())
        } else {
            LookupError::Transport(e)
        }
    }
}
