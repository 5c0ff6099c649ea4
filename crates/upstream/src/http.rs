//! Response helpers shared by the clients.

use crate::error::UpstreamError;

/// Send a request, classifying transport failures.
pub(crate) async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, UpstreamError> {
    request.send().await.map_err(UpstreamError::from_transport)
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or an [`UpstreamError::ApiError`] containing the
/// status and body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(UpstreamError::ApiError {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, UpstreamError> {
    let response = ensure_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(UpstreamError::from_transport)
}
