//! HTTP client for Instagram's private mobile API and web endpoints.
//!
//! Wraps `reqwest` with session headers, base-URL management and failure
//! classification. Every non-2xx answer (and every 2xx answer carrying a
//! `"status": "fail"` envelope) is mapped to a specific [`ApiError`] variant
//! so callers can tell a security challenge from a rate limit.

mod account;
mod auth;
mod media;

use std::time::Duration;

use igstats_core::AppConfig;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;

use crate::error::ApiError;
use crate::session::Session;

pub(crate) const MOBILE_APP_ID: &str = "567067343352427";
pub(crate) const WEB_APP_ID: &str = "936619743392459";

/// Which endpoint family a request targets; selects the app id header.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Surface {
    Mobile,
    Web,
}

/// Client for the Instagram API.
///
/// Use [`InstagramClient::new`] for production or
/// [`InstagramClient::with_base_urls`] to point at a mock server in tests.
pub struct InstagramClient {
    http: Client,
    api_base: Url,
    web_base: Url,
}

impl InstagramClient {
    /// Creates a client pointed at the production endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        Self::with_base_urls(
            timeout_secs,
            user_agent,
            igstats_core::config::DEFAULT_API_BASE_URL,
            igstats_core::config::DEFAULT_WEB_BASE_URL,
        )
    }

    /// Creates a client from the loaded application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`InstagramClient::with_base_urls`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::with_base_urls(
            config.request_timeout_secs,
            &config.user_agent,
            &config.api_base_url,
            &config.web_base_url,
        )
    }

    /// Creates a client with custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`ApiError::InvalidBaseUrl`] if either base URL does not parse.
    pub fn with_base_urls(
        timeout_secs: u64,
        user_agent: &str,
        api_base: &str,
        web_base: &str,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            http,
            api_base: normalise_base(api_base)?,
            web_base: normalise_base(web_base)?,
        })
    }

    fn join(base: &Url, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = base.join(path).map_err(|e| ApiError::InvalidBaseUrl {
            url: format!("{base}{path}"),
            reason: e.to_string(),
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    pub(crate) fn api_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        Self::join(&self.api_base, path, query)
    }

    pub(crate) fn web_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        Self::join(&self.web_base, path, query)
    }

    /// Attaches the session's credentials and device identity.
    pub(crate) fn authed(
        &self,
        request: RequestBuilder,
        session: &Session,
        surface: Surface,
    ) -> RequestBuilder {
        let app_id = match surface {
            Surface::Mobile => MOBILE_APP_ID,
            Surface::Web => WEB_APP_ID,
        };
        let mut request = request
            .header("X-IG-App-ID", app_id)
            .header("X-IG-Device-ID", &session.device.uuid)
            .header("X-IG-Android-ID", &session.device.android_device_id);
        if let Some(authorization) = &session.authorization {
            request = request.header(reqwest::header::AUTHORIZATION, authorization);
        }
        if let Some(cookie) = session.cookie_header() {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(csrf) = session.csrf_token() {
            request = request.header("X-CSRFToken", csrf);
        }
        request
    }

    /// Sends a request and parses the body as JSON, classifying failures.
    pub(crate) async fn send_json(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await?;
        parse_envelope(status.as_u16(), &url, &body, context)
    }
}

fn normalise_base(base: &str) -> Result<Url, ApiError> {
    // A trailing slash makes `Url::join` append rather than replace the last
    // path segment.
    let normalised = format!("{}/", base.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Turns a raw HTTP answer into JSON or a classified [`ApiError`].
pub(crate) fn parse_envelope(
    status: u16,
    url: &str,
    body: &str,
    context: &str,
) -> Result<Value, ApiError> {
    if !(200..300).contains(&status) {
        return Err(classify_failure(status, url, body));
    }
    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::Deserialize {
        context: context.to_string(),
        source: e,
    })?;
    if value.get("status").and_then(Value::as_str) == Some("fail") {
        return Err(classify_failure(status, url, body));
    }
    Ok(value)
}

/// Maps an upstream failure to the most specific [`ApiError`] variant.
///
/// Checked in order: security challenge, rate limit, IP block, expired
/// login, 404, anything else.
pub(crate) fn classify_failure(status: u16, url: &str, body: &str) -> ApiError {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let field = |key: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .map(str::to_owned)
    };
    let error_type = field("error_type").unwrap_or_default();
    let message = field("message")
        .filter(|m| !m.is_empty())
        .or_else(|| (!error_type.is_empty()).then(|| error_type.clone()))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {status}")
            } else {
                trimmed.chars().take(200).collect()
            }
        });
    let lower = message.to_lowercase();
    let has_challenge = parsed
        .as_ref()
        .is_some_and(|v| v.get("challenge").is_some_and(Value::is_object));

    if has_challenge
        || matches!(message.as_str(), "challenge_required" | "checkpoint_required")
        || error_type.contains("checkpoint")
        || error_type.contains("challenge")
    {
        ApiError::ChallengeRequired(message)
    } else if status == 429 || lower.contains("please wait") {
        ApiError::PleaseWait(message)
    } else if lower.contains("blacklist") || lower.contains("ip address") {
        ApiError::IpBlocked(message)
    } else if status == 401 || message == "login_required" {
        ApiError::LoginRequired(message)
    } else if status == 404 {
        ApiError::NotFound {
            url: url.to_string(),
        }
    } else {
        ApiError::Api { status, message }
    }
}

/// Array at `path`, or an [`ApiError::UnexpectedShape`] naming `context`.
pub(crate) fn array_at<'a>(
    body: &'a Value,
    path: &str,
    context: &str,
) -> Result<&'a Vec<Value>, ApiError> {
    crate::record::lookup(body, path)
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::shape(context, format!("missing array at {path}")))
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
