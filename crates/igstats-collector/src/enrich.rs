//! Optional insights overlay for business and creator accounts.

use igstats_client::record::lookup;
use igstats_client::{InstagramApi, Session};
use igstats_core::NormalizedResult;
use serde_json::Value;

const REACH_KEYS: &[&str] = &["reach", "accounts_engaged"];
const IMPRESSION_KEYS: &[&str] = &["impressions", "profile_visits"];
const SAVE_KEYS: &[&str] = &["saves", "saved_count"];

/// Overlays reach, impressions and saves from the insights endpoint.
///
/// Skipped for entries without an internal id or with an `error`. Any
/// failure leaves `result` untouched; personal accounts are never allowed to
/// read insights, so this is the common case. Returns whether an overlay was
/// applied.
pub async fn enrich<A>(api: &A, session: &Session, result: &mut NormalizedResult) -> bool
where
    A: InstagramApi + ?Sized,
{
    if result.error.is_some() {
        return false;
    }
    let Some(pk) = result.internal_id.as_deref() else {
        return false;
    };

    let outcome = api.media_insights(session, pk).await;
    match outcome {
        Ok(body) => {
            apply_insights(result, &body);
            true
        }
        Err(e) => {
            tracing::debug!(
                shortcode = %result.identifier,
                error = %e,
                "insights unavailable (business or creator account required)"
            );
            false
        }
    }
}

/// Copies the first present value of each metric onto `result`. Metrics
/// absent from `body` keep their current value.
pub fn apply_insights(result: &mut NormalizedResult, body: &Value) {
    let scope = lookup(body, "media_organic_insights")
        .filter(|v| v.is_object())
        .unwrap_or(body);

    if let Some(reach) = first_count(scope, REACH_KEYS) {
        result.reach = Some(reach);
    }
    if let Some(impressions) = first_count(scope, IMPRESSION_KEYS) {
        result.impressions = Some(impressions);
    }
    if let Some(saves) = first_count(scope, SAVE_KEYS) {
        result.saves = saves;
    }
}

fn first_count(scope: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .find_map(|key| lookup(scope, key))
        .and_then(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
}
