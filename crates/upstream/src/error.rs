/// Errors from the upstream HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request to {0} timed out")]
    Timeout(String),

    /// The service returned a non-2xx status code.
    #[error("Upstream API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered its health check but is not ready to serve.
    #[error("Service not ready: {0}")]
    NotReady(String),
}

impl UpstreamError {
    /// Classify a transport error, separating timeouts from other failures.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let target = err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "upstream".to_string());
            Self::Timeout(target)
        } else {
            Self::Request(err)
        }
    }
}
