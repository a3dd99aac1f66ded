//! Method-fallback resolution.
//!
//! A post is looked up through an ordered list of strategies; the first one
//! that answers wins and its name is carried into the result. Accounts go
//! through an equivalent chain of listing endpoints and degrade to profile
//! counters when none of them yields posts.

use igstats_client::{
    media_pk_from_code, AccountInfo, ApiError, InstagramApi, RawMediaRecord, Session,
};
use igstats_core::CanonicalIdentifier;

use crate::error::ResolutionError;

/// Ways to fetch a single post, tried in [`MediaStrategy::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStrategy {
    /// Web GraphQL lookup by shortcode.
    MediaInfo,
    /// oEmbed id resolution, then mobile lookup by pk.
    MediaInfoById,
    /// Local shortcode decoding, then mobile lookup by pk.
    MediaPkFromCode,
}

impl MediaStrategy {
    pub const ORDER: [Self; 3] = [Self::MediaInfo, Self::MediaInfoById, Self::MediaPkFromCode];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MediaInfo => "media_info",
            Self::MediaInfoById => "media_info_by_id",
            Self::MediaPkFromCode => "media_pk_from_code",
        }
    }

    async fn attempt<A>(
        self,
        api: &A,
        session: &Session,
        code: &CanonicalIdentifier,
    ) -> Result<RawMediaRecord, ApiError>
    where
        A: InstagramApi + ?Sized,
    {
        match self {
            Self::MediaInfo => api.media_info_gql(session, code.as_str()).await,
            Self::MediaInfoById => {
                let pk = api.media_pk_from_oembed(session, code.as_str()).await?;
                api.media_info_v1(session, &pk).await
            }
            Self::MediaPkFromCode => {
                let pk = media_pk_from_code(code.as_str())?;
                api.media_info_v1(session, &pk.to_string()).await
            }
        }
    }
}

/// Ways to list an account's recent posts, tried in [`ListingStrategy::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStrategy {
    /// Mobile feed by account id.
    UserMediasV1,
    /// Timeline page embedded in the web profile, by username.
    UserMediasWeb,
    /// Web GraphQL timeline by account id.
    UserMediasGql,
}

impl ListingStrategy {
    pub const ORDER: [Self; 3] = [Self::UserMediasV1, Self::UserMediasWeb, Self::UserMediasGql];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::UserMediasV1 => "user_medias_v1",
            Self::UserMediasWeb => "user_medias_web",
            Self::UserMediasGql => "user_medias_gql",
        }
    }

    async fn attempt<A>(
        self,
        api: &A,
        session: &Session,
        account: &AccountRef<'_>,
        limit: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError>
    where
        A: InstagramApi + ?Sized,
    {
        let user_id = account.user_id;
        match self {
            Self::UserMediasV1 => api.user_medias_v1(session, user_id, limit).await,
            Self::UserMediasWeb => api.user_medias_web(session, account.username, limit).await,
            Self::UserMediasGql => api.user_medias_gql(session, user_id, limit).await,
        }
    }
}

/// Both keys an account is addressed by.
#[derive(Debug, Clone, Copy)]
struct AccountRef<'a> {
    username: &'a str,
    user_id: &'a str,
}

/// A post fetched by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub record: RawMediaRecord,
    pub strategy: MediaStrategy,
}

/// What could be learned about an account.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountOutcome {
    Posts {
        user_id: String,
        strategy: ListingStrategy,
        records: Vec<RawMediaRecord>,
    },
    /// Every listing failed or came back empty; only counters are known.
    ProfileOnly(AccountInfo),
}

/// Tries each [`MediaStrategy`] in order and returns the first success.
///
/// # Errors
///
/// Returns [`ResolutionError::Exhausted`] with the last strategy's error when
/// all strategies fail.
pub async fn resolve_post<A>(
    api: &A,
    session: &Session,
    code: &CanonicalIdentifier,
) -> Result<Resolved, ResolutionError>
where
    A: InstagramApi + ?Sized,
{
    let mut attempted = Vec::with_capacity(MediaStrategy::ORDER.len());
    let mut last_error = None;

    for strategy in MediaStrategy::ORDER {
        attempted.push(strategy.name());
        match strategy.attempt(api, session, code).await {
            Ok(record) => {
                tracing::debug!(shortcode = %code, strategy = strategy.name(), "post resolved");
                return Ok(Resolved { record, strategy });
            }
            Err(e) => {
                tracing::warn!(
                    shortcode = %code,
                    strategy = strategy.name(),
                    error = %e,
                    "strategy failed"
                );
                last_error = Some(e);
            }
        }
    }

    Err(ResolutionError::Exhausted {
        attempted,
        last_error: last_error.unwrap_or_else(|| ApiError::Api {
            status: 0,
            message: "no strategy attempted".to_string(),
        }),
    })
}

/// Resolves the account id, then lists up to `limit` recent posts.
///
/// # Errors
///
/// Returns [`ResolutionError::AccountUnavailable`] when the account id cannot
/// be resolved, or when no listing produced posts and the profile counters
/// cannot be read either.
pub async fn resolve_account<A>(
    api: &A,
    session: &Session,
    username: &str,
    limit: usize,
) -> Result<AccountOutcome, ResolutionError>
where
    A: InstagramApi + ?Sized,
{
    let user_id = resolve_user_id(api, session, username).await?;
    let account = AccountRef {
        username,
        user_id: &user_id,
    };

    for strategy in ListingStrategy::ORDER {
        match strategy.attempt(api, session, &account, limit).await {
            Ok(records) if !records.is_empty() => {
                tracing::info!(
                    username,
                    strategy = strategy.name(),
                    count = records.len(),
                    "posts listed"
                );
                return Ok(AccountOutcome::Posts {
                    user_id,
                    strategy,
                    records,
                });
            }
            Ok(_) => {
                tracing::warn!(username, strategy = strategy.name(), "listing returned no posts");
            }
            Err(e) => {
                tracing::warn!(username, strategy = strategy.name(), error = %e, "listing failed");
            }
        }
    }

    tracing::warn!(username, "no listing produced posts, falling back to profile counters");
    api.user_info(session, &user_id)
        .await
        .map(AccountOutcome::ProfileOnly)
        .map_err(|source| ResolutionError::AccountUnavailable {
            username: username.to_string(),
            source,
        })
}

async fn resolve_user_id<A>(
    api: &A,
    session: &Session,
    username: &str,
) -> Result<String, ResolutionError>
where
    A: InstagramApi + ?Sized,
{
    match api.user_id_from_username(session, username).await {
        Ok(id) => return Ok(id),
        Err(e) => {
            tracing::warn!(username, error = %e, "user id lookup failed, trying username info");
        }
    }
    api.user_info_by_username(session, username)
        .await
        .map(|info| info.pk)
        .map_err(|source| ResolutionError::AccountUnavailable {
            username: username.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gql_node, session, v1_item, ScriptedApi};

    fn code(raw: &str) -> CanonicalIdentifier {
        CanonicalIdentifier::parse(raw).expect("valid shortcode")
    }

    #[tokio::test]
    async fn first_strategy_success_short_circuits() {
        let mut api = ScriptedApi::default();
        api.gql.insert("ABC".into(), gql_node("1", "ABC", 10, 2));

        let resolved = resolve_post(&api, &session(), &code("ABC")).await.unwrap();

        assert_eq!(resolved.strategy, MediaStrategy::MediaInfo);
        assert_eq!(api.calls(), vec!["media_info_gql:ABC"]);
    }

    #[tokio::test]
    async fn fail_fail_succeed_records_third_strategy() {
        // "B" decodes locally to pk 1.
        let mut api = ScriptedApi::default();
        api.v1.insert("1".into(), v1_item(1, "B", 5, 1));

        let resolved = resolve_post(&api, &session(), &code("B")).await.unwrap();

        assert_eq!(resolved.strategy, MediaStrategy::MediaPkFromCode);
        assert_eq!(resolved.strategy.name(), "media_pk_from_code");
        assert_eq!(
            api.calls(),
            vec!["media_info_gql:B", "media_pk_from_oembed:B", "media_info_v1:1"]
        );
    }

    #[tokio::test]
    async fn second_strategy_uses_oembed_pk() {
        let mut api = ScriptedApi::default();
        api.oembed.insert("XYZ".into(), "777".into());
        api.v1.insert("777".into(), v1_item(777, "XYZ", 3, 0));

        let resolved = resolve_post(&api, &session(), &code("XYZ")).await.unwrap();

        assert_eq!(resolved.strategy, MediaStrategy::MediaInfoById);
        assert_eq!(api.count("media_info_v1"), 1);
    }

    #[tokio::test]
    async fn all_failing_reports_every_attempt() {
        let api = ScriptedApi::default();

        let err = resolve_post(&api, &session(), &code("NOPE")).await.unwrap_err();

        match err {
            ResolutionError::Exhausted { attempted, .. } => {
                assert_eq!(
                    attempted,
                    vec!["media_info", "media_info_by_id", "media_pk_from_code"]
                );
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn account_falls_back_to_username_info_for_id() {
        let api = ScriptedApi {
            user_by_username: Some(serde_json::json!({ "pk": 178 })),
            medias_v1: Some(vec![v1_item(1, "A1", 1, 1)]),
            ..ScriptedApi::default()
        };

        let outcome = resolve_account(&api, &session(), "arhaval", 5).await.unwrap();

        match outcome {
            AccountOutcome::Posts { user_id, strategy, records } => {
                assert_eq!(user_id, "178");
                assert_eq!(strategy, ListingStrategy::UserMediasV1);
                assert_eq!(records.len(), 1);
            }
            other => panic!("expected posts, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_feed_falls_through_to_full_web_timeline() {
        let mut video = gql_node("22", "W2", 7, 0);
        video["__typename"] = serde_json::json!("GraphVideo");
        let mut album = gql_node("23", "W3", 9, 1);
        album["__typename"] = serde_json::json!("GraphSidecar");
        let api = ScriptedApi {
            user_id: Some("178".into()),
            medias_web: Some(vec![gql_node("21", "W1", 3, 1), video, album]),
            ..ScriptedApi::default()
        };

        let outcome = resolve_account(&api, &session(), "arhaval", 5).await.unwrap();

        let (strategy, records) = match outcome {
            AccountOutcome::Posts {
                strategy, records, ..
            } => (strategy, records),
            other => panic!("expected posts, got {other:?}"),
        };
        assert_eq!(strategy, ListingStrategy::UserMediasWeb);
        let types: Vec<_> = records
            .iter()
            .map(|r| r.media_type().unwrap().unwrap_or_default())
            .collect();
        assert_eq!(types, vec!["photo", "video", "album"]);
        assert_eq!(
            api.calls(),
            vec![
                "user_id_from_username:arhaval",
                "user_medias_v1:178",
                "user_medias_web:arhaval"
            ]
        );
    }

    #[tokio::test]
    async fn empty_listing_moves_to_next_strategy() {
        let api = ScriptedApi {
            user_id: Some("178".into()),
            medias_v1: Some(vec![]),
            medias_gql: Some(vec![gql_node("9", "G9", 4, 4)]),
            ..ScriptedApi::default()
        };

        let outcome = resolve_account(&api, &session(), "arhaval", 5).await.unwrap();

        assert!(matches!(
            outcome,
            AccountOutcome::Posts {
                strategy: ListingStrategy::UserMediasGql,
                ..
            }
        ));
        assert_eq!(api.count("user_medias_web"), 1);
    }

    #[tokio::test]
    async fn no_posts_degrades_to_profile_counters() {
        let api = ScriptedApi {
            user_id: Some("178".into()),
            user_info: Some(serde_json::json!({
                "pk": "178",
                "username": "arhaval",
                "follower_count": 1200,
                "following_count": 80,
                "media_count": 45
            })),
            ..ScriptedApi::default()
        };

        let outcome = resolve_account(&api, &session(), "arhaval", 5).await.unwrap();

        match outcome {
            AccountOutcome::ProfileOnly(info) => {
                assert_eq!(info.follower_count, Some(1200));
                assert_eq!(info.media_count, Some(45));
            }
            other => panic!("expected profile, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unresolvable_account_is_unavailable() {
        let api = ScriptedApi::default();

        let err = resolve_account(&api, &session(), "ghost", 5).await.unwrap_err();

        assert!(matches!(
            err,
            ResolutionError::AccountUnavailable { ref username, .. } if username == "ghost"
        ));
        assert_eq!(api.count("user_medias_v1"), 0);
    }
}
