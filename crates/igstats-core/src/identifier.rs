//! Post URL parsing into canonical shortcodes.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Substring every accepted target URL must contain.
pub const PLATFORM_DOMAIN: &str = "instagram.com";

/// Path matchers tried in order: feed posts, reels, long-form video.
static SHORTCODE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"/p/([A-Za-z0-9_-]+)").expect("valid regex"),
        Regex::new(r"/reel/([A-Za-z0-9_-]+)").expect("valid regex"),
        Regex::new(r"/tv/([A-Za-z0-9_-]+)").expect("valid regex"),
    ]
});

/// Short opaque token naming one post, e.g. `C1a2B3c4D5e` from
/// `https://www.instagram.com/p/C1a2B3c4D5e/`.
///
/// Always non-empty and restricted to `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalIdentifier(String);

impl CanonicalIdentifier {
    /// Wraps `raw` if it satisfies the shortcode alphabet.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extracts the shortcode from a post, reel or tv URL.
///
/// Returns `None` for anything that does not match one of the known path
/// shapes; never panics on malformed input.
#[must_use]
pub fn extract_shortcode(url: &str) -> Option<CanonicalIdentifier> {
    SHORTCODE_PATTERNS.iter().find_map(|re| {
        re.captures(url)
            .and_then(|caps| caps.get(1))
            .and_then(|m| CanonicalIdentifier::parse(m.as_str()))
    })
}

/// Canonical permalink for a shortcode.
#[must_use]
pub fn post_url(code: &str) -> String {
    format!("https://www.instagram.com/p/{code}/")
}
