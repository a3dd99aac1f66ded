//! Unauthenticated access to a post's public embed page.
//!
//! Used only as a degraded mode when no session is available. The page is
//! fetched to confirm the post is reachable; its markup is not parsed, so
//! no engagement counters come from here.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ApiError;

/// Desktop browser identity for the embed page, which refuses the mobile
/// app user agent.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Outcome of a successful embed page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedPage {
    pub url: String,
    pub status: u16,
    pub body_len: usize,
}

pub struct PublicPageScraper {
    client: Client,
    web_base: Url,
}

impl PublicPageScraper {
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`ApiError::InvalidBaseUrl`] if `web_base` does not parse.
    pub fn new(timeout_secs: u64, web_base: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        let web_base = Url::parse(&format!("{}/", web_base.trim_end_matches('/'))).map_err(|e| {
            ApiError::InvalidBaseUrl {
                url: web_base.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { client, web_base })
    }

    /// Fetches `<web_base>p/<code>/embed/`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::PageUnavailable`] for any non-2xx status.
    /// - [`ApiError::Http`] on network failure.
    pub async fn fetch_embed(&self, code: &str) -> Result<EmbedPage, ApiError> {
        let url = self
            .web_base
            .join(&format!("p/{code}/embed/"))
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: format!("{}p/{code}/embed/", self.web_base),
                reason: e.to_string(),
            })?;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html")
            .send()
            .await?;
        let status = response.status();
        let url = response.url().to_string();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "embed page unavailable");
            return Err(ApiError::PageUnavailable {
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        Ok(EmbedPage {
            url,
            status: status.as_u16(),
            body_len: body.len(),
        })
    }
}
