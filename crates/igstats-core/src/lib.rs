pub mod app_config;
pub mod config;
pub mod identifier;
pub mod result;

use thiserror::Error;

pub use app_config::{AppConfig, Credentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use identifier::{extract_shortcode, post_url, CanonicalIdentifier, PLATFORM_DOMAIN};
pub use result::{
    BatchTotals, NormalizedResult, ProfileSnapshot, ResultBatch, RunMode, UNKNOWN_IDENTIFIER,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
