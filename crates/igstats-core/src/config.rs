use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "Instagram 269.0.0.18.75 Android (26/8.0.0; 480dpi; 1080x1920; OnePlus; 6T Dev; devitron; qcom; en_US; 314665256)";
pub const DEFAULT_API_BASE_URL: &str = "https://i.instagram.com/api/v1/";
pub const DEFAULT_WEB_BASE_URL: &str = "https://www.instagram.com/";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Credentials are read here but only validated by
/// [`AppConfig::credentials`], because the manual and public modes run
/// without an account login.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let username = optional("INSTAGRAM_USERNAME");
    let password = optional("INSTAGRAM_PASSWORD");

    let log_level = or_default("IGSTATS_LOG_LEVEL", "info");
    let session_dir = PathBuf::from(or_default("IGSTATS_SESSION_DIR", "."));
    let output_dir = PathBuf::from(or_default("IGSTATS_OUTPUT_DIR", "."));
    let links_path = PathBuf::from(or_default("IGSTATS_LINKS_PATH", "instagram_links.txt"));

    let request_timeout_secs = parse_u64("IGSTATS_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("IGSTATS_USER_AGENT", DEFAULT_USER_AGENT);

    let login_max_attempts = parse_u32("IGSTATS_LOGIN_MAX_ATTEMPTS", "3")?;
    if login_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "IGSTATS_LOGIN_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let login_backoff_step_secs = parse_u64("IGSTATS_LOGIN_BACKOFF_STEP_SECS", "5")?;
    let login_warmup_secs = parse_u64("IGSTATS_LOGIN_WARMUP_SECS", "2")?;
    let inter_request_delay_ms = parse_u64("IGSTATS_INTER_REQUEST_DELAY_MS", "1000")?;

    let caption_limit = parse_usize("IGSTATS_CAPTION_LIMIT", "200")?;
    let account_post_limit = parse_usize("IGSTATS_ACCOUNT_POST_LIMIT", "5")?;

    let api_base_url = or_default("IGSTATS_API_BASE_URL", DEFAULT_API_BASE_URL);
    let web_base_url = or_default("IGSTATS_WEB_BASE_URL", DEFAULT_WEB_BASE_URL);

    Ok(AppConfig {
        username,
        password,
        log_level,
        session_dir,
        output_dir,
        links_path,
        request_timeout_secs,
        user_agent,
        login_max_attempts,
        login_backoff_step_secs,
        login_warmup_secs,
        inter_request_delay_ms,
        caption_limit,
        account_post_limit,
        api_base_url,
        web_base_url,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
