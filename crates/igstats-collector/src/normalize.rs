//! Normalization from [`RawMediaRecord`] to [`NormalizedResult`].
//!
//! Decoding is field-by-field against the record's optional-field schema.
//! Missing fields take their defaults; a field that is present but cannot be
//! interpreted degrades the whole entry to a minimal record with `error`
//! set. Normalization itself never fails.

use igstats_client::{FieldError, RawMediaRecord};
use igstats_core::{post_url, NormalizedResult, UNKNOWN_IDENTIFIER};

/// Caption limit for link-based runs.
pub const LINK_CAPTION_LIMIT: usize = 200;
/// Caption limit for account and manual runs.
pub const ACCOUNT_CAPTION_LIMIT: usize = 100;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub caption_limit: usize,
}

impl NormalizeOptions {
    #[must_use]
    pub fn link_mode() -> Self {
        Self {
            caption_limit: LINK_CAPTION_LIMIT,
        }
    }

    #[must_use]
    pub fn account_mode() -> Self {
        Self {
            caption_limit: ACCOUNT_CAPTION_LIMIT,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::link_mode()
    }
}

/// Where a record came from.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    /// Shortcode extracted from the input, if any. Falls back to the record's
    /// own shortcode.
    pub identifier: Option<&'a str>,
    /// Input URL. Falls back to the canonical permalink.
    pub url: Option<&'a str>,
    /// Name of the strategy that produced the record.
    pub strategy: &'a str,
}

/// Maps a raw record onto the fixed output schema.
#[must_use]
pub fn normalize(
    record: &RawMediaRecord,
    source: &Source<'_>,
    options: &NormalizeOptions,
) -> NormalizedResult {
    let identifier = source
        .identifier
        .map(str::to_owned)
        .or_else(|| record.shortcode().ok().flatten())
        .unwrap_or_else(|| UNKNOWN_IDENTIFIER.to_owned());
    let url = source
        .url
        .map_or_else(|| post_url(&identifier), str::to_owned);

    match decode(record, &identifier, &url, source.strategy, options) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(shortcode = %identifier, error = %e, "record could not be decoded");
            NormalizedResult::failed(
                Some(identifier.as_str()),
                &url,
                format!("malformed record: {e}"),
            )
        }
    }
}

fn decode(
    record: &RawMediaRecord,
    identifier: &str,
    url: &str,
    strategy: &str,
    options: &NormalizeOptions,
) -> Result<NormalizedResult, FieldError> {
    record.ensure_object()?;

    let mut result = NormalizedResult::new(identifier, url);
    result.internal_id = record.internal_id()?;
    result.media_type = record.media_type()?;
    result.created_at = record.taken_at()?;
    result.caption = record
        .caption()?
        .map(|text| truncate_caption(&text, options.caption_limit));
    result.likes = record.like_count()?.unwrap_or(0);
    result.comments = record.comment_count()?.unwrap_or(0);
    result.saves = record.save_count()?.unwrap_or(0);
    result.plays = record.play_count()?.unwrap_or(0);
    result.strategy_used = Some(strategy.to_owned());
    Ok(result)
}

/// Keeps the first `limit` characters, appending `...` when text was cut.
#[must_use]
pub fn truncate_caption(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
