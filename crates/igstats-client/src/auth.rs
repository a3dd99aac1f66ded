//! Session acquisition: reuse a persisted session when it still works,
//! otherwise log in with linear back-off and persist the result.

use std::time::Duration;

use igstats_core::{AppConfig, Credentials};
use thiserror::Error;

use crate::api::InstagramApi;
use crate::error::ApiError;
use crate::retry::{retry_linear, RetryExhausted};
use crate::session::{Session, SessionStore};

/// Why a session could not be obtained.
///
/// The first three categories are terminal: they are reported after a single
/// attempt and each has its own remedy.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("security verification required: {message}")]
    VerificationRequired { message: String },

    #[error("too many login attempts: {message}")]
    RateLimited { message: String },

    #[error("network blocked by the platform: {message}")]
    NetworkBlocked { message: String },

    #[error("login failed after {attempts} attempt(s): {message}")]
    Failed { attempts: u32, message: String },
}

impl AuthError {
    /// A hint for the operator on how to get past this failure.
    #[must_use]
    pub fn remedy(&self) -> &'static str {
        match self {
            Self::VerificationRequired { .. } => {
                "Log in once from the Instagram app, complete the security check, then run again."
            }
            Self::RateLimited { .. } => "Wait a few minutes before trying again.",
            Self::NetworkBlocked { .. } => {
                "Your IP address is temporarily blocked: use a VPN, wait a few hours, or switch to another network."
            }
            Self::Failed { .. } => {
                "Check INSTAGRAM_USERNAME and INSTAGRAM_PASSWORD, or use the manual entry mode."
            }
        }
    }
}

impl From<RetryExhausted> for AuthError {
    fn from(exhausted: RetryExhausted) -> Self {
        let RetryExhausted { attempts, error } = exhausted;
        match error {
            ApiError::ChallengeRequired(message) => Self::VerificationRequired { message },
            ApiError::PleaseWait(message) => Self::RateLimited { message },
            ApiError::IpBlocked(message) => Self::NetworkBlocked { message },
            other => Self::Failed {
                attempts,
                message: other.to_string(),
            },
        }
    }
}

/// Timing of the login sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
    pub warmup: Duration,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(5),
            warmup: Duration::from_secs(2),
        }
    }
}

impl LoginPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.login_max_attempts,
            backoff_step: Duration::from_secs(config.login_backoff_step_secs),
            warmup: Duration::from_secs(config.login_warmup_secs),
        }
    }

    /// Sleep after the given failed attempt (1-based) before the next one.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

/// Produces a usable [`Session`] for one credential pair.
pub struct SessionManager<'a, A: ?Sized, S: ?Sized> {
    api: &'a A,
    store: &'a S,
    policy: LoginPolicy,
}

impl<'a, A, S> SessionManager<'a, A, S>
where
    A: InstagramApi + ?Sized,
    S: SessionStore + ?Sized,
{
    pub fn new(api: &'a A, store: &'a S, policy: LoginPolicy) -> Self {
        Self { api, store, policy }
    }

    /// Returns a live session, logging in only when no stored session passes
    /// the probe.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when every login attempt fails or a terminal
    /// failure category is hit.
    pub async fn acquire(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        if !self.policy.warmup.is_zero() {
            tokio::time::sleep(self.policy.warmup).await;
        }

        if let Some(session) = self.reuse_stored(&credentials.username).await {
            return Ok(session);
        }

        let session = retry_linear(self.policy.max_attempts, self.policy.backoff_step, || {
            self.api.login(credentials)
        })
        .await?;

        match self.store.save(&session) {
            Ok(()) => tracing::info!(username = %session.username, "session saved"),
            Err(e) => tracing::warn!(error = %e, "could not persist session"),
        }
        tracing::info!(username = %session.username, "logged in");
        Ok(session)
    }

    async fn reuse_stored(&self, username: &str) -> Option<Session> {
        let session = match self.store.load(username) {
            Ok(Some(session)) => session,
            Ok(None) => {
                tracing::debug!(username, "no stored session");
                return None;
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "stored session unreadable, logging in again");
                return None;
            }
        };

        match self.api.probe(&session).await {
            Ok(()) => {
                tracing::info!(username, "stored session is valid");
                Some(session)
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "stored session rejected, logging in again");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
