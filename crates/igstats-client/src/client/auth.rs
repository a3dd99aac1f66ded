//! Login and session probe endpoints.

use std::collections::BTreeMap;

use chrono::Utc;
use igstats_core::Credentials;
use reqwest::header::{HeaderMap, SET_COOKIE};

use super::{parse_envelope, InstagramClient, Surface, MOBILE_APP_ID};
use crate::error::ApiError;
use crate::record::{lookup, AccountInfo};
use crate::session::{DeviceSettings, Session};

impl InstagramClient {
    /// Performs a fresh credential login with a newly generated device.
    ///
    /// # Errors
    ///
    /// - [`ApiError::ChallengeRequired`] if the account must pass a security check.
    /// - [`ApiError::PleaseWait`] if login attempts are being throttled.
    /// - [`ApiError::IpBlocked`] if the network appears blacklisted.
    /// - [`ApiError::Api`] for bad credentials and other rejections.
    /// - [`ApiError::Http`] on network failure.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let device = DeviceSettings::generate();
        let url = self.api_url("accounts/login/", &[])?;
        let enc_password = format!(
            "#PWD_INSTAGRAM:0:{}:{}",
            Utc::now().timestamp(),
            credentials.password
        );
        let form = [
            ("username", credentials.username.as_str()),
            ("enc_password", enc_password.as_str()),
            ("device_id", device.android_device_id.as_str()),
            ("guid", device.uuid.as_str()),
            ("phone_id", device.phone_id.as_str()),
            ("login_attempt_count", "0"),
        ];

        let response = self
            .http
            .post(url)
            .header("X-IG-App-ID", MOBILE_APP_ID)
            .header("X-IG-Device-ID", &device.uuid)
            .form(&form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let authorization = response
            .headers()
            .get("ig-set-authorization")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .map(str::to_owned);
        let cookies = parse_set_cookies(response.headers());
        let body = response.text().await?;

        let value = parse_envelope(status, &url, &body, "login")?;
        let user = lookup(&value, "logged_in_user")
            .ok_or_else(|| ApiError::shape("login", "response has no logged_in_user"))?;
        let account = AccountInfo::from_user(user, "login")?;

        let mut session = Session::new(credentials.username.clone(), device);
        session.user_id = Some(account.pk);
        session.authorization = authorization;
        session.cookies = cookies;
        tracing::debug!(
            username = %session.username,
            cookies = session.cookies.len(),
            has_authorization = session.authorization.is_some(),
            "login accepted"
        );
        Ok(session)
    }

    /// Fetches the home timeline; success means the session is still valid.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::LoginRequired`] for an expired session, or any
    /// other classified failure.
    pub async fn timeline_probe(&self, session: &Session) -> Result<(), ApiError> {
        let url = self.api_url("feed/timeline/", &[])?;
        let request = self
            .authed(self.http.post(url), session, Surface::Mobile)
            .form(&[("reason", "cold_start_fetch"), ("is_pull_to_refresh", "0")]);
        self.send_json(request, "feed/timeline").await.map(|_| ())
    }
}

/// Collects `name=value` pairs from `Set-Cookie` headers, ignoring
/// attributes and deletion markers.
fn parse_set_cookies(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| {
            let pair = raw.split(';').next()?;
            let (name, value) = pair.split_once('=')?;
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() || value.is_empty() || value == "\"\"" {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}
