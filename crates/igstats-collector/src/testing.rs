//! Scripted in-memory `InstagramApi` for resolver, enricher and batch tests.
//!
//! Anything not scripted answers with an `ApiError::Api` failure. Every call
//! is appended to `calls` as `"<method>:<argument>"`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use igstats_client::{
    AccountInfo, ApiError, DeviceSettings, InstagramApi, RawMediaRecord, RecordShape, Session,
};
use igstats_core::Credentials;
use serde_json::{json, Value};

#[derive(Default)]
pub(crate) struct ScriptedApi {
    pub gql: HashMap<String, Value>,
    pub oembed: HashMap<String, String>,
    pub v1: HashMap<String, Value>,
    pub user_id: Option<String>,
    pub user_by_username: Option<Value>,
    pub user_info: Option<Value>,
    pub medias_v1: Option<Vec<Value>>,
    pub medias_web: Option<Vec<Value>>,
    pub medias_gql: Option<Vec<Value>>,
    pub insights: Option<Value>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    fn record(&self, method: &str, arg: &str) {
        self.calls.lock().unwrap().push(format!("{method}:{arg}"));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        let prefix = format!("{method}:");
        self.calls()
            .iter()
            .filter(|c| c.starts_with(&prefix))
            .count()
    }
}

pub(crate) fn fail(message: &str) -> ApiError {
    ApiError::Api {
        status: 400,
        message: message.to_owned(),
    }
}

pub(crate) fn session() -> Session {
    Session::new("arhaval", DeviceSettings::generate())
}

/// A mobile-API media item with the given counters.
pub(crate) fn v1_item(pk: u64, code: &str, likes: u64, comments: u64) -> Value {
    json!({
        "pk": pk,
        "id": format!("{pk}_178"),
        "code": code,
        "media_type": 1,
        "taken_at": 1_700_000_000,
        "like_count": likes,
        "comment_count": comments,
        "caption": { "text": format!("caption for {code}") }
    })
}

/// A web GraphQL node with the given counters.
pub(crate) fn gql_node(id: &str, code: &str, likes: u64, comments: u64) -> Value {
    json!({
        "__typename": "GraphImage",
        "id": id,
        "shortcode": code,
        "taken_at_timestamp": 1_700_000_000,
        "edge_media_preview_like": { "count": likes },
        "edge_media_to_comment": { "count": comments },
        "edge_media_to_caption": { "edges": [ { "node": { "text": format!("caption for {code}") } } ] }
    })
}

fn records(
    items: Option<&Vec<Value>>,
    shape: RecordShape,
) -> Result<Vec<RawMediaRecord>, ApiError> {
    items
        .map(|items| {
            items
                .iter()
                .map(|v| RawMediaRecord::new(shape, v.clone()))
                .collect()
        })
        .ok_or_else(|| fail("listing not scripted"))
}

#[async_trait]
impl InstagramApi for ScriptedApi {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        self.record("login", &credentials.username);
        Err(fail("login not scripted"))
    }

    async fn probe(&self, _session: &Session) -> Result<(), ApiError> {
        self.record("probe", "");
        Ok(())
    }

    async fn media_info_gql(&self, _: &Session, code: &str) -> Result<RawMediaRecord, ApiError> {
        self.record("media_info_gql", code);
        self.gql
            .get(code)
            .map(|v| RawMediaRecord::new(RecordShape::Graphql, v.clone()))
            .ok_or_else(|| fail("graphql lookup failed"))
    }

    async fn media_pk_from_oembed(&self, _: &Session, code: &str) -> Result<String, ApiError> {
        self.record("media_pk_from_oembed", code);
        self.oembed
            .get(code)
            .cloned()
            .ok_or_else(|| fail("oembed failed"))
    }

    async fn media_info_v1(&self, _: &Session, pk: &str) -> Result<RawMediaRecord, ApiError> {
        self.record("media_info_v1", pk);
        self.v1
            .get(pk)
            .map(|v| RawMediaRecord::new(RecordShape::V1, v.clone()))
            .ok_or_else(|| fail("v1 lookup failed"))
    }

    async fn user_id_from_username(&self, _: &Session, username: &str) -> Result<String, ApiError> {
        self.record("user_id_from_username", username);
        self.user_id.clone().ok_or_else(|| fail("web profile failed"))
    }

    async fn user_info_by_username(
        &self,
        _: &Session,
        username: &str,
    ) -> Result<AccountInfo, ApiError> {
        self.record("user_info_by_username", username);
        let user = self
            .user_by_username
            .as_ref()
            .ok_or_else(|| fail("usernameinfo failed"))?;
        AccountInfo::from_user(user, "usernameinfo")
    }

    async fn user_info(&self, _: &Session, user_id: &str) -> Result<AccountInfo, ApiError> {
        self.record("user_info", user_id);
        let user = self
            .user_info
            .as_ref()
            .ok_or_else(|| fail("user info failed"))?;
        AccountInfo::from_user(user, "user_info")
    }

    async fn user_medias_v1(
        &self,
        _: &Session,
        user_id: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        self.record("user_medias_v1", user_id);
        let mut list = records(self.medias_v1.as_ref(), RecordShape::V1)?;
        list.truncate(amount);
        Ok(list)
    }

    async fn user_medias_web(
        &self,
        _: &Session,
        username: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        self.record("user_medias_web", username);
        let mut list = records(self.medias_web.as_ref(), RecordShape::Graphql)?;
        list.truncate(amount);
        Ok(list)
    }

    async fn user_medias_gql(
        &self,
        _: &Session,
        user_id: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        self.record("user_medias_gql", user_id);
        let mut list = records(self.medias_gql.as_ref(), RecordShape::Graphql)?;
        list.truncate(amount);
        Ok(list)
    }

    async fn media_insights(&self, _: &Session, pk: &str) -> Result<Value, ApiError> {
        self.record("media_insights", pk);
        self.insights
            .clone()
            .ok_or_else(|| fail("insights are only available for business accounts"))
    }
}
