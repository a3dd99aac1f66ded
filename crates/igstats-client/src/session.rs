//! Authenticated session state and its on-disk persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Device identity presented to the mobile API. Generated once per login and
/// persisted with the session so a reused session keeps the same device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub uuid: String,
    pub phone_id: String,
    pub android_device_id: String,
}

impl DeviceSettings {
    #[must_use]
    pub fn generate() -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            phone_id: Uuid::new_v4().to_string(),
            android_device_id: format!("android-{:016x}", rand::random::<u64>()),
        }
    }
}

/// An authenticated handle bound to one account.
///
/// Callers hold the session and lend it (`&Session`) to every API call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub user_id: Option<String>,
    pub authorization: Option<String>,
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    pub device: DeviceSettings,
    pub created_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn new(username: impl Into<String>, device: DeviceSettings) -> Self {
        Self {
            username: username.into(),
            user_id: None,
            authorization: None,
            cookies: BTreeMap::new(),
            device,
            created_at: Utc::now(),
        }
    }

    /// `Cookie` header value, or `None` when no cookies are held.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    #[must_use]
    pub fn csrf_token(&self) -> Option<&str> {
        self.cookies.get("csrftoken").map(String::as_str)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("user_id", &self.user_id)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "[redacted]"),
            )
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .field("device", &self.device)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence for session blobs, keyed by account username.
pub trait SessionStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been stored for `username`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError`] if a stored blob exists but cannot be read.
    fn load(&self, username: &str) -> Result<Option<Session>, SessionStoreError>;

    /// # Errors
    ///
    /// Returns [`SessionStoreError`] if the blob cannot be written.
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;
}

/// Stores each session as `<dir>/<username>_session.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{username}_session.json"))
    }

    fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, username: &str) -> Result<Option<Session>, SessionStoreError> {
        let path = self.path_for(username);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        std::fs::create_dir_all(self.dir())?;
        let body = serde_json::to_string_pretty(session)?;
        std::fs::write(self.path_for(&session.username), body)?;
        Ok(())
    }
}
