//! Sequential batch orchestration: extract → resolve → normalize → enrich
//! for each target, with a fixed pause between upstream requests.
//!
//! Per-target failures never abort a batch; they become entries with
//! `error` set, so the output always has one entry per input target.

use std::time::Duration;

use igstats_client::{InstagramApi, PublicPageScraper, Session};
use igstats_core::{
    extract_shortcode, AppConfig, NormalizedResult, ProfileSnapshot, ResultBatch, RunMode,
};

use crate::enrich::enrich;
use crate::error::{PipelineError, ResolutionError};
use crate::normalize::{normalize, NormalizeOptions, Source, ACCOUNT_CAPTION_LIMIT};
use crate::resolve::{resolve_account, resolve_post, AccountOutcome};

/// Longest error text kept on a failed entry.
const MAX_ERROR_CHARS: usize = 200;

/// Strategy label recorded on public-page entries.
pub const PUBLIC_EMBED_STRATEGY: &str = "public_embed";

const PUBLIC_ENTRY_NOTE: &str = "Public page reached; engagement counters are not exposed \
    without a session. Use manual entry for exact numbers.";
const PUBLIC_BATCH_NOTE: &str = "Unauthenticated fallback: entries carry no real metrics.";
const PROFILE_ONLY_NOTE: &str = "Posts could not be listed; only profile counters are available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub inter_request_delay: Duration,
    pub link_caption_limit: usize,
    pub account_caption_limit: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            inter_request_delay: Duration::from_secs(1),
            link_caption_limit: NormalizeOptions::link_mode().caption_limit,
            account_caption_limit: ACCOUNT_CAPTION_LIMIT,
        }
    }
}

impl BatchOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            inter_request_delay: Duration::from_millis(config.inter_request_delay_ms),
            link_caption_limit: config.caption_limit,
            account_caption_limit: ACCOUNT_CAPTION_LIMIT,
        }
    }
}

/// Runs authenticated batches over one session.
pub struct BatchRunner<'a, A: ?Sized> {
    api: &'a A,
    session: &'a Session,
    options: BatchOptions,
}

impl<'a, A> BatchRunner<'a, A>
where
    A: InstagramApi + ?Sized,
{
    pub fn new(api: &'a A, session: &'a Session, options: BatchOptions) -> Self {
        Self {
            api,
            session,
            options,
        }
    }

    /// Processes each post URL in order. The batch has exactly one entry per
    /// target, in input order.
    pub async fn run_links(&self, targets: &[String]) -> ResultBatch {
        let total = targets.len();
        let mut posts = Vec::with_capacity(total);

        for (index, url) in targets.iter().enumerate() {
            if index > 0 {
                pause(self.options.inter_request_delay).await;
            }
            tracing::info!(position = index + 1, total, %url, "processing link");

            let entry = match self.process_link(url).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(%url, error = %e, "link failed");
                    let code = extract_shortcode(url);
                    NormalizedResult::failed(
                        code.as_ref().map(|c| c.as_str()),
                        url,
                        error_text(&e),
                    )
                }
            };
            posts.push(entry);
        }

        ResultBatch::new(self.session.username.clone(), RunMode::LinkBased, posts)
    }

    async fn process_link(&self, url: &str) -> Result<NormalizedResult, PipelineError> {
        let code = extract_shortcode(url).ok_or(PipelineError::Extraction)?;
        let resolved = resolve_post(self.api, self.session, &code).await?;

        let options = NormalizeOptions {
            caption_limit: self.options.link_caption_limit,
        };
        let source = Source {
            identifier: Some(code.as_str()),
            url: Some(url),
            strategy: resolved.strategy.name(),
        };
        let mut result = normalize(&resolved.record, &source, &options);
        enrich(self.api, self.session, &mut result).await;
        Ok(result)
    }

    /// Fetches the last `limit` posts of `username`.
    ///
    /// When no listing produces posts the batch is empty and carries a
    /// profile snapshot instead.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::AccountUnavailable`] when neither posts nor
    /// profile counters can be read.
    pub async fn run_account(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<ResultBatch, ResolutionError> {
        let outcome = resolve_account(self.api, self.session, username, limit).await?;

        let (strategy, records) = match outcome {
            AccountOutcome::Posts {
                strategy, records, ..
            } => (strategy, records),
            AccountOutcome::ProfileOnly(info) => {
                let profile = ProfileSnapshot {
                    username: info.username.unwrap_or_else(|| username.to_string()),
                    follower_count: info.follower_count,
                    following_count: info.following_count,
                    media_count: info.media_count,
                    note: PROFILE_ONLY_NOTE.to_string(),
                };
                return Ok(ResultBatch::new(username, RunMode::AccountRecent, Vec::new())
                    .with_note(PROFILE_ONLY_NOTE)
                    .with_profile(profile));
            }
        };

        let options = NormalizeOptions {
            caption_limit: self.options.account_caption_limit,
        };
        let source = Source {
            identifier: None,
            url: None,
            strategy: strategy.name(),
        };
        let mut posts = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let mut result = normalize(record, &source, &options);
            if result.internal_id.is_some() && result.is_success() {
                if index > 0 {
                    pause(self.options.inter_request_delay).await;
                }
                enrich(self.api, self.session, &mut result).await;
            }
            posts.push(result);
        }

        Ok(ResultBatch::new(username, RunMode::AccountRecent, posts))
    }
}

/// Degraded mode: confirms each post's public embed page is reachable.
///
/// Entries never carry real metrics. Reachable pages yield zero counters and
/// a note; unreachable ones carry `"HTTP <status>: page unavailable"`.
pub async fn run_public(
    scraper: &PublicPageScraper,
    targets: &[String],
    username: &str,
    delay: Duration,
) -> ResultBatch {
    let mut posts = Vec::with_capacity(targets.len());

    for (index, url) in targets.iter().enumerate() {
        if index > 0 {
            pause(delay).await;
        }
        let Some(code) = extract_shortcode(url) else {
            posts.push(NormalizedResult::failed(
                None,
                url,
                error_text(&PipelineError::Extraction),
            ));
            continue;
        };

        let entry = match scraper.fetch_embed(code.as_str()).await {
            Ok(page) => {
                tracing::debug!(shortcode = %code, status = page.status, "embed page reachable");
                let mut result = NormalizedResult::new(code.as_str(), url.as_str());
                result.strategy_used = Some(PUBLIC_EMBED_STRATEGY.to_string());
                result.note = Some(PUBLIC_ENTRY_NOTE.to_string());
                result
            }
            Err(e) => {
                tracing::warn!(shortcode = %code, error = %e, "embed page failed");
                NormalizedResult::failed(
                    Some(code.as_str()),
                    url,
                    error_text(&PipelineError::Page(e)),
                )
            }
        };
        posts.push(entry);
    }

    ResultBatch::new(username, RunMode::WebScrapingAlternative, posts).with_note(PUBLIC_BATCH_NOTE)
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn error_text(error: &PipelineError) -> String {
    error.to_string().chars().take(MAX_ERROR_CHARS).collect()
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
