use std::path::PathBuf;

use crate::ConfigError;

/// Account credentials for the authenticated retrieval modes.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub log_level: String,
    pub session_dir: PathBuf,
    pub output_dir: PathBuf,
    pub links_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub login_max_attempts: u32,
    pub login_backoff_step_secs: u64,
    pub login_warmup_secs: u64,
    pub inter_request_delay_ms: u64,
    pub caption_limit: usize,
    pub account_post_limit: usize,
    pub api_base_url: String,
    pub web_base_url: String,
}

impl AppConfig {
    /// Returns the credential pair required by the authenticated modes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first absent
    /// variable when either `INSTAGRAM_USERNAME` or `INSTAGRAM_PASSWORD`
    /// is unset or empty.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let username = self
            .username
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("INSTAGRAM_USERNAME".to_string()))?;
        let password = self
            .password
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("INSTAGRAM_PASSWORD".to_string()))?;
        Ok(Credentials { username, password })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("log_level", &self.log_level)
            .field("session_dir", &self.session_dir)
            .field("output_dir", &self.output_dir)
            .field("links_path", &self.links_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("login_max_attempts", &self.login_max_attempts)
            .field("login_backoff_step_secs", &self.login_backoff_step_secs)
            .field("login_warmup_secs", &self.login_warmup_secs)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("caption_limit", &self.caption_limit)
            .field("account_post_limit", &self.account_post_limit)
            .field("api_base_url", &self.api_base_url)
            .field("web_base_url", &self.web_base_url)
            .finish()
    }
}
