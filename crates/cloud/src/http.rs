//! Shared response handling for the reqwest-based clients.

use mailspark_core::providers::ProviderError;
use serde::de::DeserializeOwned;

/// Send `request` and decode a 2xx JSON body into `T`.
///
/// Transport failures map to [`ProviderError::Request`], non-2xx statuses to
/// [`ProviderError::Api`] carrying the response body, and undecodable bodies
/// to [`ProviderError::InvalidResponse`].
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(|e| ProviderError::Request {
        provider,
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await.map_err(|e| ProviderError::Request {
        provider,
        message: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| ProviderError::InvalidResponse {
        provider,
        message: e.to_string(),
    })
}
