//! Shared HTTP plumbing for provider adapters.
//!
//! Adapters build their own `RequestBuilder` (auth headers, body) and hand it to
//! [`HttpUtils::execute_request`], which sends it once, logs the exchange and maps
//! transport-level failures. Requests are never retried here.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP helpers shared by adapters.
pub struct HttpUtils;

impl HttpUtils {
    /// Send a request and return `(status, body)`.
    ///
    /// Throttling and gateway statuses are mapped by [`status_error`]; every other
    /// status is returned to the adapter so it can read the provider's own error
    /// envelope.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url_or_action: &str,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{provider_name}] {method_name} {url_or_action}");

        let response = request_builder
            .send()
            .await
            .map_err(|e| transport_error(provider_name, &e))?;

        let status = response.status().as_u16();
        let retry_after = parse_retry_after(
            response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok()),
        );

        let body = response.text().await.map_err(|e| ProviderError::NetworkError {
            provider: provider_name.to_string(),
            detail: format!("Failed to read response body (HTTP {status}): {e}"),
        })?;
        log::debug!(
            "[{provider_name}] {method_name} -> {status}: {}",
            truncate_for_log(&body)
        );

        if let Some(err) = status_error(provider_name, status, retry_after, &body) {
            log::warn!("{err}");
            return Err(err);
        }

        Ok((status, body))
    }

    /// Deserialize a response body, logging the raw text on failure.
    pub fn parse_json<T>(response_text: &str, provider_name: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!(
                "[{provider_name}] JSON parse failed: {e}; body: {}",
                truncate_for_log(response_text)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }
}

fn transport_error(provider_name: &str, e: &reqwest::Error) -> ProviderError {
    let provider = provider_name.to_string();
    let detail = e.to_string();
    if e.is_timeout() {
        ProviderError::Timeout { provider, detail }
    } else {
        ProviderError::NetworkError { provider, detail }
    }
}

/// 429 becomes `RateLimited`, 502-504 become `NetworkError`.
fn status_error(
    provider_name: &str,
    status: u16,
    retry_after: Option<u64>,
    body: &str,
) -> Option<ProviderError> {
    match status {
        429 => Some(ProviderError::RateLimited {
            provider: provider_name.to_string(),
            retry_after,
            raw_message: (!body.is_empty()).then(|| truncate_for_log(body)),
        }),
        502..=504 => Some(ProviderError::NetworkError {
            provider: provider_name.to_string(),
            detail: format!("HTTP {status}: {}", truncate_for_log(body)),
        }),
        _ => None,
    }
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored.
fn parse_retry_after(header: Option<&str>) -> Option<u64> {
    header.and_then(|v| v.trim().parse::<u64>().ok())
}
