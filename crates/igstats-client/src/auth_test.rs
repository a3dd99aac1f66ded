use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use super::*;
use crate::record::{AccountInfo, RawMediaRecord};
use crate::session::{DeviceSettings, SessionStoreError};

fn unused<T>() -> Result<T, ApiError> {
    Err(ApiError::Api {
        status: 500,
        message: "not scripted".to_owned(),
    })
}

fn generic_failure() -> ApiError {
    ApiError::Api {
        status: 400,
        message: "The password you entered is incorrect.".to_owned(),
    }
}

fn session_for(username: &str, marker: &str) -> Session {
    let mut session = Session::new(username, DeviceSettings::generate());
    session.authorization = Some(marker.to_owned());
    session
}

/// Scripted login and probe outcomes; records when each login happened.
struct FakeApi {
    probe_ok: bool,
    logins: Mutex<VecDeque<Result<Session, ApiError>>>,
    login_times: Mutex<Vec<Instant>>,
    probe_times: Mutex<Vec<Instant>>,
}

impl FakeApi {
    fn new(probe_ok: bool, logins: Vec<Result<Session, ApiError>>) -> Self {
        Self {
            probe_ok,
            logins: Mutex::new(logins.into()),
            login_times: Mutex::new(Vec::new()),
            probe_times: Mutex::new(Vec::new()),
        }
    }

    fn login_count(&self) -> usize {
        self.login_times.lock().unwrap().len()
    }
}

#[async_trait]
impl InstagramApi for FakeApi {
    async fn login(&self, _credentials: &Credentials) -> Result<Session, ApiError> {
        self.login_times.lock().unwrap().push(Instant::now());
        self.logins
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(generic_failure()))
    }

    async fn probe(&self, _session: &Session) -> Result<(), ApiError> {
        self.probe_times.lock().unwrap().push(Instant::now());
        if self.probe_ok {
            Ok(())
        } else {
            Err(ApiError::LoginRequired("login_required".to_owned()))
        }
    }

    async fn media_info_gql(&self, _: &Session, _: &str) -> Result<RawMediaRecord, ApiError> {
        unused()
    }

    async fn media_pk_from_oembed(&self, _: &Session, _: &str) -> Result<String, ApiError> {
        unused()
    }

    async fn media_info_v1(&self, _: &Session, _: &str) -> Result<RawMediaRecord, ApiError> {
        unused()
    }

    async fn user_id_from_username(&self, _: &Session, _: &str) -> Result<String, ApiError> {
        unused()
    }

    async fn user_info_by_username(&self, _: &Session, _: &str) -> Result<AccountInfo, ApiError> {
        unused()
    }

    async fn user_info(&self, _: &Session, _: &str) -> Result<AccountInfo, ApiError> {
        unused()
    }

    async fn user_medias_v1(
        &self,
        _: &Session,
        _: &str,
        _: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        unused()
    }

    async fn user_medias_web(
        &self,
        _: &Session,
        _: &str,
        _: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        unused()
    }

    async fn user_medias_gql(
        &self,
        _: &Session,
        _: &str,
        _: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        unused()
    }

    async fn media_insights(&self, _: &Session, _: &str) -> Result<Value, ApiError> {
        unused()
    }
}

#[derive(Default)]
struct MemoryStore {
    slot: Mutex<Option<Session>>,
    saves: Mutex<usize>,
    fail_saves: bool,
}

impl MemoryStore {
    fn holding(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
            ..Self::default()
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, username: &str) -> Result<Option<Session>, SessionStoreError> {
        Ok(self
            .slot
            .lock()
            .unwrap()
            .clone()
            .filter(|s| s.username == username))
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        *self.saves.lock().unwrap() += 1;
        if self.fail_saves {
            return Err(SessionStoreError::Io(std::io::Error::other("read-only")));
        }
        *self.slot.lock().unwrap() = Some(session.clone());
        Ok(())
    }
}

fn credentials() -> Credentials {
    Credentials::new("arhaval", "hunter2")
}

#[tokio::test(start_paused = true)]
async fn valid_stored_session_skips_login() {
    let api = FakeApi::new(true, vec![]);
    let store = MemoryStore::holding(session_for("arhaval", "stored"));
    let manager = SessionManager::new(&api, &store, LoginPolicy::default());

    let session = manager.acquire(&credentials()).await.expect("session");

    assert_eq!(session.authorization.as_deref(), Some("stored"));
    assert_eq!(api.login_count(), 0);
    assert_eq!(*store.saves.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn rejected_stored_session_triggers_one_login() {
    let api = FakeApi::new(false, vec![Ok(session_for("arhaval", "fresh"))]);
    let store = MemoryStore::holding(session_for("arhaval", "stale"));
    let manager = SessionManager::new(&api, &store, LoginPolicy::default());

    let session = manager.acquire(&credentials()).await.expect("session");

    assert_eq!(session.authorization.as_deref(), Some("fresh"));
    assert_eq!(api.login_count(), 1);
    assert_eq!(*store.saves.lock().unwrap(), 1);
    let stored = store.slot.lock().unwrap().clone().expect("persisted");
    assert_eq!(stored.authorization.as_deref(), Some("fresh"));
}

#[tokio::test(start_paused = true)]
async fn empty_store_logs_in_without_probing() {
    let api = FakeApi::new(true, vec![Ok(session_for("arhaval", "fresh"))]);
    let store = MemoryStore::default();
    let manager = SessionManager::new(&api, &store, LoginPolicy::default());

    manager.acquire(&credentials()).await.expect("session");

    assert!(api.probe_times.lock().unwrap().is_empty());
    assert_eq!(api.login_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn three_failures_surface_after_three_attempts_with_growing_delays() {
    let api = FakeApi::new(
        false,
        vec![
            Err(generic_failure()),
            Err(generic_failure()),
            Err(generic_failure()),
        ],
    );
    let store = MemoryStore::default();
    let manager = SessionManager::new(&api, &store, LoginPolicy::default());

    let err = manager.acquire(&credentials()).await.unwrap_err();

    match err {
        AuthError::Failed { attempts, ref message } => {
            assert_eq!(attempts, 3);
            assert!(message.contains("incorrect"), "message: {message}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    let times = api.login_times.lock().unwrap().clone();
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_secs(5));
    assert_eq!(times[2] - times[1], Duration::from_secs(10));
    assert_eq!(*store.saves.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn challenge_is_reported_without_retry() {
    let api = FakeApi::new(
        false,
        vec![Err(ApiError::ChallengeRequired("challenge_required".to_owned()))],
    );
    let store = MemoryStore::default();
    let manager = SessionManager::new(&api, &store, LoginPolicy::default());

    let err = manager.acquire(&credentials()).await.unwrap_err();

    assert!(matches!(err, AuthError::VerificationRequired { .. }));
    assert_eq!(api.login_count(), 1);
}

async fn acquire_with_single_failure(error: ApiError) -> (AuthError, usize) {
    let api = FakeApi::new(false, vec![Err(error)]);
    let store = MemoryStore::default();
    let manager = SessionManager::new(&api, &store, LoginPolicy::default());
    let err = manager.acquire(&credentials()).await.unwrap_err();
    (err, api.login_count())
}

#[tokio::test(start_paused = true)]
async fn rate_limit_is_reported_without_retry() {
    let (err, logins) =
        acquire_with_single_failure(ApiError::PleaseWait("Please wait a few minutes".to_owned()))
            .await;
    assert!(matches!(err, AuthError::RateLimited { .. }), "got {err:?}");
    assert_eq!(logins, 1);
}

#[tokio::test(start_paused = true)]
async fn network_block_is_reported_without_retry() {
    let (err, logins) =
        acquire_with_single_failure(ApiError::IpBlocked("blacklist".to_owned())).await;
    assert!(matches!(err, AuthError::NetworkBlocked { .. }), "got {err:?}");
    assert_eq!(logins, 1);
}

#[tokio::test(start_paused = true)]
async fn save_failure_is_ignored() {
    let api = FakeApi::new(false, vec![Ok(session_for("arhaval", "fresh"))]);
    let store = MemoryStore {
        fail_saves: true,
        ..MemoryStore::default()
    };
    let manager = SessionManager::new(&api, &store, LoginPolicy::default());

    let session = manager.acquire(&credentials()).await.expect("session");

    assert_eq!(session.authorization.as_deref(), Some("fresh"));
    assert_eq!(*store.saves.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn warmup_runs_before_any_network_activity() {
    let api = FakeApi::new(true, vec![]);
    let store = MemoryStore::holding(session_for("arhaval", "stored"));
    let manager = SessionManager::new(&api, &store, LoginPolicy::default());
    let start = Instant::now();

    manager.acquire(&credentials()).await.expect("session");

    let probes = api.probe_times.lock().unwrap().clone();
    assert_eq!(probes.len(), 1);
    assert_eq!(probes[0] - start, Duration::from_secs(2));
}

#[test]
fn delay_schedule_is_linear() {
    let policy = LoginPolicy::default();
    assert_eq!(policy.delay_after(1), Duration::from_secs(5));
    assert_eq!(policy.delay_after(2), Duration::from_secs(10));
    assert_eq!(policy.delay_after(3), Duration::from_secs(15));
}

#[test]
fn each_category_has_a_distinct_remedy() {
    let errors = [
        AuthError::VerificationRequired {
            message: String::new(),
        },
        AuthError::RateLimited {
            message: String::new(),
        },
        AuthError::NetworkBlocked {
            message: String::new(),
        },
        AuthError::Failed {
            attempts: 3,
            message: String::new(),
        },
    ];
    let mut remedies: Vec<_> = errors.iter().map(AuthError::remedy).collect();
    remedies.sort_unstable();
    remedies.dedup();
    assert_eq!(remedies.len(), 4);
}
