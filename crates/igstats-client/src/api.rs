//! The upstream surface the retrieval pipeline depends on.
//!
//! [`InstagramClient`] is the production implementation; tests substitute
//! scripted fakes.

use async_trait::async_trait;
use igstats_core::Credentials;
use serde_json::Value;

use crate::client::InstagramClient;
use crate::error::ApiError;
use crate::record::{AccountInfo, RawMediaRecord};
use crate::session::Session;

#[async_trait]
pub trait InstagramApi: Send + Sync {
    /// Fresh credential login producing a new session.
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError>;

    /// Cheap authenticated call used to check that a stored session is alive.
    async fn probe(&self, session: &Session) -> Result<(), ApiError>;

    /// Web GraphQL lookup by shortcode.
    async fn media_info_gql(
        &self,
        session: &Session,
        code: &str,
    ) -> Result<RawMediaRecord, ApiError>;

    /// Resolves a shortcode to its media pk through the oEmbed endpoint.
    async fn media_pk_from_oembed(&self, session: &Session, code: &str) -> Result<String, ApiError>;

    /// Mobile API lookup by media pk.
    async fn media_info_v1(&self, session: &Session, pk: &str) -> Result<RawMediaRecord, ApiError>;

    async fn user_id_from_username(
        &self,
        session: &Session,
        username: &str,
    ) -> Result<String, ApiError>;

    async fn user_info_by_username(
        &self,
        session: &Session,
        username: &str,
    ) -> Result<AccountInfo, ApiError>;

    async fn user_info(&self, session: &Session, user_id: &str) -> Result<AccountInfo, ApiError>;

    async fn user_medias_v1(
        &self,
        session: &Session,
        user_id: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError>;

    /// Timeline page embedded in the web profile; keyed by username.
    async fn user_medias_web(
        &self,
        session: &Session,
        username: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError>;

    async fn user_medias_gql(
        &self,
        session: &Session,
        user_id: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError>;

    /// Privileged per-post insights; requires a business or creator account.
    async fn media_insights(&self, session: &Session, pk: &str) -> Result<Value, ApiError>;
}

#[async_trait]
impl InstagramApi for InstagramClient {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        InstagramClient::login(self, credentials).await
    }

    async fn probe(&self, session: &Session) -> Result<(), ApiError> {
        self.timeline_probe(session).await
    }

    async fn media_info_gql(
        &self,
        session: &Session,
        code: &str,
    ) -> Result<RawMediaRecord, ApiError> {
        InstagramClient::media_info_gql(self, session, code).await
    }

    async fn media_pk_from_oembed(
        &self,
        session: &Session,
        code: &str,
    ) -> Result<String, ApiError> {
        InstagramClient::media_pk_from_oembed(self, session, code).await
    }

    async fn media_info_v1(&self, session: &Session, pk: &str) -> Result<RawMediaRecord, ApiError> {
        InstagramClient::media_info_v1(self, session, pk).await
    }

    async fn user_id_from_username(
        &self,
        session: &Session,
        username: &str,
    ) -> Result<String, ApiError> {
        InstagramClient::user_id_from_username(self, session, username).await
    }

    async fn user_info_by_username(
        &self,
        session: &Session,
        username: &str,
    ) -> Result<AccountInfo, ApiError> {
        InstagramClient::user_info_by_username(self, session, username).await
    }

    async fn user_info(&self, session: &Session, user_id: &str) -> Result<AccountInfo, ApiError> {
        InstagramClient::user_info(self, session, user_id).await
    }

    async fn user_medias_v1(
        &self,
        session: &Session,
        user_id: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        InstagramClient::user_medias_v1(self, session, user_id, amount).await
    }

    async fn user_medias_web(
        &self,
        session: &Session,
        username: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        InstagramClient::user_medias_web(self, session, username, amount).await
    }

    async fn user_medias_gql(
        &self,
        session: &Session,
        user_id: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        InstagramClient::user_medias_gql(self, session, user_id, amount).await
    }

    async fn media_insights(&self, session: &Session, pk: &str) -> Result<Value, ApiError> {
        InstagramClient::media_insights(self, session, pk).await
    }
}
