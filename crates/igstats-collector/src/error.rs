use igstats_client::ApiError;
use thiserror::Error;

/// Every retrieval strategy for a target failed.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("all methods failed ({}); last error: {last_error}", .attempted.join(", "))]
    Exhausted {
        attempted: Vec<&'static str>,
        #[source]
        last_error: ApiError,
    },

    /// Neither posts nor profile counters could be read for the account.
    #[error("account @{username} unavailable: {source}")]
    AccountUnavailable {
        username: String,
        #[source]
        source: ApiError,
    },
}

/// Per-target failure inside a batch; rendered into the entry's `error`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not extract a shortcode from the URL; expected /p/, /reel/ or /tv/")]
    Extraction,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Page(ApiError),
}
