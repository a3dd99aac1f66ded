//! Raw upstream media payloads and their optional-field schema.
//!
//! The same post comes back in two unrelated JSON layouts depending on the
//! endpoint: the mobile API's `items[]` entries ([`RecordShape::V1`]) and the
//! web GraphQL nodes ([`RecordShape::Graphql`]). Each semantic field declares
//! the alternate paths it may live under per shape; the first present path
//! wins. Absent and `null` values read as "not present"; a present value of
//! the wrong type is a [`FieldError`].

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ApiError;

/// Which endpoint family produced a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    V1,
    Graphql,
}

/// A post as returned by one retrieval strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMediaRecord {
    pub shape: RecordShape,
    pub payload: Value,
}

/// A field was present but could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field {field}: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    InternalId,
    Shortcode,
    MediaType,
    ProductType,
    TakenAt,
    Caption,
    Likes,
    Comments,
    Saves,
    Plays,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Self::InternalId => "internal_id",
            Self::Shortcode => "shortcode",
            Self::MediaType => "media_type",
            Self::ProductType => "product_type",
            Self::TakenAt => "taken_at",
            Self::Caption => "caption",
            Self::Likes => "like_count",
            Self::Comments => "comment_count",
            Self::Saves => "save_count",
            Self::Plays => "play_count",
        }
    }

    fn paths(self, shape: RecordShape) -> &'static [&'static str] {
        match (self, shape) {
            (Self::InternalId, RecordShape::V1) => &["pk", "id"],
            (Self::InternalId, RecordShape::Graphql) => &["id"],
            (Self::Shortcode, RecordShape::V1) => &["code"],
            (Self::Shortcode, RecordShape::Graphql) => &["shortcode"],
            (Self::MediaType, RecordShape::V1) => &["media_type"],
            (Self::MediaType, RecordShape::Graphql) => &["__typename"],
            (Self::ProductType, _) => &["product_type"],
            (Self::TakenAt, RecordShape::V1) => &["taken_at"],
            (Self::TakenAt, RecordShape::Graphql) => &["taken_at_timestamp"],
            (Self::Caption, RecordShape::V1) => &["caption.text"],
            (Self::Caption, RecordShape::Graphql) => &["edge_media_to_caption.edges.0.node.text"],
            (Self::Likes, RecordShape::V1) => &["like_count"],
            (Self::Likes, RecordShape::Graphql) => {
                &["edge_media_preview_like.count", "edge_liked_by.count"]
            }
            (Self::Comments, RecordShape::V1) => &["comment_count"],
            (Self::Comments, RecordShape::Graphql) => &[
                "edge_media_to_comment.count",
                "edge_media_to_parent_comment.count",
            ],
            (Self::Saves, RecordShape::V1) => &["saved_count", "save_count"],
            (Self::Saves, RecordShape::Graphql) => &["saved_count"],
            (Self::Plays, RecordShape::V1) => &["play_count", "view_count"],
            (Self::Plays, RecordShape::Graphql) => &["video_play_count", "video_view_count"],
        }
    }

    fn error(self, reason: impl Into<String>) -> FieldError {
        FieldError {
            field: self.name(),
            reason: reason.into(),
        }
    }
}

/// Walks a dotted path (`"caption.text"`, `"edges.0.node"`) through objects
/// and arrays. Missing segments and a final `null` yield `None`.
#[must_use]
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!current.is_null()).then_some(current)
}

/// Reads an unsigned counter, accepting numeric strings.
fn as_count(value: &Value) -> Result<u64, String> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| format!("expected a non-negative integer, got {n}")),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("expected a numeric string, got \"{s}\"")),
        other => Err(format!("expected a number, got {}", type_name(other))),
    }
}

/// Reads an identifier. Mobile ids arrive as `"<pk>_<owner>"`; only the
/// media part is kept.
fn as_id(value: &Value) -> Result<String, String> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => return Err(format!("expected a string or number, got {}", type_name(other))),
    };
    let pk = raw.split('_').next().unwrap_or_default().trim();
    if pk.is_empty() {
        return Err("empty identifier".to_string());
    }
    Ok(pk.to_string())
}

fn as_text(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("expected a string, got {}", type_name(value)))
}

fn as_timestamp(value: &Value) -> Result<DateTime<Utc>, String> {
    let secs = match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("expected integer seconds, got {n}"))?,
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("expected integer seconds, got \"{s}\""))?,
        other => return Err(format!("expected a timestamp, got {}", type_name(other))),
    };
    DateTime::from_timestamp(secs, 0).ok_or_else(|| format!("timestamp {secs} out of range"))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl RawMediaRecord {
    #[must_use]
    pub fn new(shape: RecordShape, payload: Value) -> Self {
        Self { shape, payload }
    }

    fn read<T>(
        &self,
        field: Field,
        decode: impl Fn(&Value) -> Result<T, String>,
    ) -> Result<Option<T>, FieldError> {
        field
            .paths(self.shape)
            .iter()
            .find_map(|path| lookup(&self.payload, path))
            .map(|v| decode(v).map_err(|reason| field.error(reason)))
            .transpose()
    }

    /// Fails when the payload is not a JSON object at all.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] naming the record itself.
    pub fn ensure_object(&self) -> Result<(), FieldError> {
        if self.payload.is_object() {
            Ok(())
        } else {
            Err(FieldError {
                field: "record",
                reason: format!("expected an object, got {}", type_name(&self.payload)),
            })
        }
    }

    /// # Errors
    ///
    /// Returns a [`FieldError`] if the id is present but not a string or number.
    pub fn internal_id(&self) -> Result<Option<String>, FieldError> {
        self.read(Field::InternalId, as_id)
    }

    /// # Errors
    ///
    /// Returns a [`FieldError`] if the shortcode is present but not a string.
    pub fn shortcode(&self) -> Result<Option<String>, FieldError> {
        self.read(Field::Shortcode, as_text)
    }

    /// Media kind as a stable label: `photo`, `video`, `reel`, `album`.
    /// Unrecognised codes pass through verbatim.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] if the type field has an unexpected JSON type.
    pub fn media_type(&self) -> Result<Option<String>, FieldError> {
        let is_reel = self
            .read(Field::ProductType, as_text)?
            .is_some_and(|p| p == "clips");
        let label = match self.shape {
            RecordShape::V1 => self
                .read(Field::MediaType, as_count)?
                .map(|code| match code {
                    1 => "photo".to_string(),
                    2 if is_reel => "reel".to_string(),
                    2 => "video".to_string(),
                    8 => "album".to_string(),
                    other => other.to_string(),
                }),
            RecordShape::Graphql => self.read(Field::MediaType, as_text)?.map(|typename| {
                match typename.trim_start_matches("XDT") {
                    "GraphImage" => "photo".to_string(),
                    "GraphVideo" if is_reel => "reel".to_string(),
                    "GraphVideo" => "video".to_string(),
                    "GraphSidecar" => "album".to_string(),
                    _ => typename,
                }
            }),
        };
        Ok(label)
    }

    /// # Errors
    ///
    /// Returns a [`FieldError`] if the timestamp is malformed or out of range.
    pub fn taken_at(&self) -> Result<Option<DateTime<Utc>>, FieldError> {
        self.read(Field::TakenAt, as_timestamp)
    }

    /// # Errors
    ///
    /// Returns a [`FieldError`] if the caption text is not a string.
    pub fn caption(&self) -> Result<Option<String>, FieldError> {
        self.read(Field::Caption, as_text)
    }

    /// # Errors
    ///
    /// Returns a [`FieldError`] if the counter is not a non-negative integer.
    pub fn like_count(&self) -> Result<Option<u64>, FieldError> {
        self.read(Field::Likes, as_count)
    }

    /// # Errors
    ///
    /// Returns a [`FieldError`] if the counter is not a non-negative integer.
    pub fn comment_count(&self) -> Result<Option<u64>, FieldError> {
        self.read(Field::Comments, as_count)
    }

    /// # Errors
    ///
    /// Returns a [`FieldError`] if the counter is not a non-negative integer.
    pub fn save_count(&self) -> Result<Option<u64>, FieldError> {
        self.read(Field::Saves, as_count)
    }

    /// # Errors
    ///
    /// Returns a [`FieldError`] if the counter is not a non-negative integer.
    pub fn play_count(&self) -> Result<Option<u64>, FieldError> {
        self.read(Field::Plays, as_count)
    }
}

/// Account identity and public counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub pk: String,
    pub username: Option<String>,
    pub follower_count: Option<u64>,
    pub following_count: Option<u64>,
    pub media_count: Option<u64>,
}

impl AccountInfo {
    /// Decodes a `user` object from either the mobile or the web API.
    /// Counters that fail to decode are dropped; only the id is mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedShape`] if no usable id is present.
    pub fn from_user(user: &Value, context: &str) -> Result<Self, ApiError> {
        let pk = ["pk", "pk_id", "id"]
            .iter()
            .find_map(|path| lookup(user, path))
            .ok_or_else(|| ApiError::shape(context, "user object has no id"))
            .and_then(|v| as_id(v).map_err(|reason| ApiError::shape(context, reason)))?;

        let count = |paths: &[&str]| {
            paths
                .iter()
                .find_map(|path| lookup(user, path))
                .and_then(|v| as_count(v).ok())
        };

        Ok(Self {
            pk,
            username: lookup(user, "username").and_then(|v| as_text(v).ok()),
            follower_count: count(&["follower_count", "edge_followed_by.count"]),
            following_count: count(&["following_count", "edge_follow.count"]),
            media_count: count(&["media_count", "edge_owner_to_timeline_media.count"]),
        })
    }
}
