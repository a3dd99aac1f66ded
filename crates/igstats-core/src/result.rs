//! Output data model handed to the serializer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier used for entries whose URL yielded no shortcode.
pub const UNKNOWN_IDENTIFIER: &str = "unknown";

/// Fixed-schema statistics for one post.
///
/// When `error` is set the counters are zero and the optional fields are
/// absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResult {
    #[serde(rename = "shortcode")]
    pub identifier: String,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "media_id", default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(rename = "taken_at", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub likes: u64,
    pub comments: u64,
    pub saves: u64,
    pub plays: u64,
    pub reach: Option<u64>,
    pub impressions: Option<u64>,
    #[serde(rename = "method_used", default, skip_serializing_if = "Option::is_none")]
    pub strategy_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizedResult {
    /// An empty, successful record for `identifier`. Callers fill in fields.
    #[must_use]
    pub fn new(identifier: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source_url: source_url.into(),
            internal_id: None,
            media_type: None,
            created_at: None,
            caption: None,
            likes: 0,
            comments: 0,
            saves: 0,
            plays: 0,
            reach: None,
            impressions: None,
            strategy_used: None,
            note: None,
            entered_at: None,
            error: None,
        }
    }

    /// Degraded record: zero counters, `error` populated.
    ///
    /// A missing identifier is recorded as `"unknown"`.
    #[must_use]
    pub fn failed(identifier: Option<&str>, source_url: &str, error: impl Into<String>) -> Self {
        let mut result = Self::new(identifier.unwrap_or(UNKNOWN_IDENTIFIER), source_url);
        result.error = Some(error.into());
        result
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Account counters reported when no posts could be listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub username: String,
    pub follower_count: Option<u64>,
    pub following_count: Option<u64>,
    pub media_count: Option<u64>,
    pub note: String,
}

/// Run mode label; also selects the output artifact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    LinkBased,
    AccountRecent,
    ManualEntry,
    WebScrapingAlternative,
}

impl RunMode {
    #[must_use]
    pub fn output_file_name(self) -> &'static str {
        match self {
            Self::LinkBased => "results_links.json",
            Self::AccountRecent => "results_account.json",
            Self::ManualEntry => "results_manual.json",
            Self::WebScrapingAlternative => "results_public.json",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LinkBased => write!(f, "link_based"),
            Self::AccountRecent => write!(f, "account_recent"),
            Self::ManualEntry => write!(f, "manual_entry"),
            Self::WebScrapingAlternative => write!(f, "web_scraping_alternative"),
        }
    }
}

/// One run's output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultBatch {
    pub username: String,
    pub scraped_at: DateTime<Utc>,
    pub total_posts: usize,
    pub method: RunMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSnapshot>,
    pub posts: Vec<NormalizedResult>,
}

impl ResultBatch {
    #[must_use]
    pub fn new(username: impl Into<String>, method: RunMode, posts: Vec<NormalizedResult>) -> Self {
        Self {
            username: username.into(),
            scraped_at: Utc::now(),
            total_posts: posts.len(),
            method,
            note: None,
            profile: None,
            posts,
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: ProfileSnapshot) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Sums counters over the entries that carry no `error`.
    #[must_use]
    pub fn totals(&self) -> BatchTotals {
        self.posts
            .iter()
            .filter(|p| p.is_success())
            .fold(BatchTotals::default(), |mut acc, p| {
                acc.successful += 1;
                acc.likes = acc.likes.saturating_add(p.likes);
                acc.comments = acc.comments.saturating_add(p.comments);
                acc.saves = acc.saves.saturating_add(p.saves);
                acc
            })
    }
}

/// Aggregate counters across the successful entries of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTotals {
    pub successful: usize,
    pub likes: u64,
    pub comments: u64,
    pub saves: u64,
}
