/// Errors from outbound integration calls.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream service returned a non-2xx status code.
    #[error("{service} API error ({status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        /// Raw response body for debugging, truncated.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected {service} response: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    /// A fetched page was not HTML.
    #[error("Unsupported content type: {0}")]
    UnsupportedContent(String),

    /// A fetched page exceeded the body size cap.
    #[error("Response body exceeds {0} bytes")]
    TooLarge(usize),

    /// A page URL, or a redirect it led to, is not an allowed destination.
    #[error("Refused destination: {0}")]
    Destination(String),
}

/// Longest error body kept in [`IntegrationError::Api`].
const MAX_ERROR_BODY: usize = 500;

/// Return the response unchanged on success, or an
/// [`IntegrationError::Api`] carrying the status and (truncated) body text.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, IntegrationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(IntegrationError::Api {
        service,
        status: status.as_u16(),
        body,
    })
}

/// Read a successful JSON response as an untyped value.
pub(crate) async fn json_body(
    service: &'static str,
    response: reqwest::Response,
) -> Result<serde_json::Value, IntegrationError> {
    let response = ensure_success(service, response).await?;
    Ok(response.json::<serde_json::Value>().await?)
}

pub(crate) fn parse_error(service: &'static str, message: impl Into<String>) -> IntegrationError {
    IntegrationError::Parse {
        service,
        message: message.into(),
    }
}
