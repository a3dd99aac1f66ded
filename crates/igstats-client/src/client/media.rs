//! Single-post endpoints: GraphQL lookup, oEmbed id resolution, mobile
//! lookup by pk, and insights.

use igstats_core::post_url;
use serde_json::{json, Value};

use super::{InstagramClient, Surface};
use crate::error::ApiError;
use crate::record::{lookup, RawMediaRecord, RecordShape};
use crate::session::Session;

const MEDIA_QUERY_HASH: &str = "477b65a610463740ccdb83135b2014db";

impl InstagramClient {
    /// Looks a post up by shortcode through the web GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotFound`] if `data.shortcode_media` is absent or `null`.
    /// - Any classified HTTP or API failure.
    pub async fn media_info_gql(
        &self,
        session: &Session,
        code: &str,
    ) -> Result<RawMediaRecord, ApiError> {
        let variables = json!({
            "shortcode": code,
            "child_comment_count": 3,
            "fetch_comment_count": 40,
            "parent_comment_count": 24,
            "has_threaded_comments": true,
        })
        .to_string();
        let url = self.web_url(
            "graphql/query/",
            &[("query_hash", MEDIA_QUERY_HASH), ("variables", &variables)],
        )?;
        let request = self.authed(self.http.get(url), session, Surface::Web);
        let body = self
            .send_json(request, &format!("media_info_gql(code={code})"))
            .await?;

        let node = lookup(&body, "data.shortcode_media").ok_or_else(|| ApiError::NotFound {
            url: post_url(code),
        })?;
        Ok(RawMediaRecord::new(RecordShape::Graphql, node.clone()))
    }

    /// Resolves a shortcode to a media pk via the oEmbed endpoint.
    ///
    /// oEmbed reports `media_id` as `"<pk>_<owner id>"`; only the pk is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedShape`] if `media_id` is missing, or any
    /// classified HTTP or API failure.
    pub async fn media_pk_from_oembed(
        &self,
        session: &Session,
        code: &str,
    ) -> Result<String, ApiError> {
        let permalink = post_url(code);
        let url = self.api_url("oembed/", &[("url", &permalink)])?;
        let request = self.authed(self.http.get(url), session, Surface::Mobile);
        let body = self
            .send_json(request, &format!("oembed(code={code})"))
            .await?;

        let media_id = lookup(&body, "media_id")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::shape("oembed", "response has no media_id"))?;
        let pk = media_id.split('_').next().unwrap_or_default();
        if pk.is_empty() {
            return Err(ApiError::shape("oembed", format!("unusable media_id \"{media_id}\"")));
        }
        Ok(pk.to_string())
    }

    /// Looks a post up by pk through the mobile API.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotFound`] if the response has no items.
    /// - Any classified HTTP or API failure.
    pub async fn media_info_v1(
        &self,
        session: &Session,
        pk: &str,
    ) -> Result<RawMediaRecord, ApiError> {
        let url = self.api_url(&format!("media/{pk}/info/"), &[])?;
        let not_found = url.to_string();
        let request = self.authed(self.http.get(url), session, Surface::Mobile);
        let body = self
            .send_json(request, &format!("media_info_v1(pk={pk})"))
            .await?;

        let item = lookup(&body, "items.0").ok_or(ApiError::NotFound { url: not_found })?;
        Ok(RawMediaRecord::new(RecordShape::V1, item.clone()))
    }

    /// Fetches organic insights for one post. Only business and creator
    /// accounts are allowed to read these.
    ///
    /// # Errors
    ///
    /// Any classified HTTP or API failure; a personal account typically gets
    /// [`ApiError::Api`] with status 400 or 403.
    pub async fn media_insights(&self, session: &Session, pk: &str) -> Result<Value, ApiError> {
        let url = self.api_url(
            &format!("insights/media_organic_insights/{pk}/"),
            &[("ig_sig_key_version", "4")],
        )?;
        let request = self.authed(self.http.get(url), session, Surface::Mobile);
        self.send_json(request, &format!("media_insights(pk={pk})"))
            .await
    }
}
