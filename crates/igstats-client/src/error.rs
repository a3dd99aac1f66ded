use thiserror::Error;

/// Errors returned by the Instagram API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be parsed as JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The account must pass an interactive security check first.
    #[error("challenge required: {0}")]
    ChallengeRequired(String),

    /// Too many requests; the platform asked us to back off.
    #[error("please wait a few minutes: {0}")]
    PleaseWait(String),

    /// The request origin appears to be blacklisted.
    #[error("IP address blocked: {0}")]
    IpBlocked(String),

    /// The session is missing or no longer accepted.
    #[error("login required: {0}")]
    LoginRequired(String),

    #[error("not found: {url}")]
    NotFound { url: String },

    /// Any other non-2xx answer or `"status": "fail"` envelope.
    #[error("Instagram API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The body parsed but did not have the expected structure.
    #[error("unexpected response shape for {context}: {reason}")]
    UnexpectedShape { context: String, reason: String },

    #[error("invalid shortcode \"{0}\"")]
    InvalidShortcode(String),

    #[error("HTTP {status}: page unavailable")]
    PageUnavailable { status: u16 },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    pub(crate) fn shape(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            context: context.into(),
            reason: reason.into(),
        }
    }
}
