//! Account endpoints: id resolution, profile counters and recent-post
//! listings.

use serde_json::json;

use super::{array_at, InstagramClient, Surface};
use crate::error::ApiError;
use crate::record::{lookup, AccountInfo, RawMediaRecord, RecordShape};
use crate::session::Session;

const USER_MEDIA_QUERY_HASH: &str = "e7e2f4da4b02303f74f0841279e52d76";

impl InstagramClient {
    /// Resolves a username to its account id via the web profile endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedShape`] if `data.user` is missing, or any
    /// classified HTTP or API failure.
    pub async fn user_id_from_username(
        &self,
        session: &Session,
        username: &str,
    ) -> Result<String, ApiError> {
        let url = self.web_url("api/v1/users/web_profile_info/", &[("username", username)])?;
        let request = self.authed(self.http.get(url), session, Surface::Web);
        let context = format!("web_profile_info(username={username})");
        let body = self.send_json(request, &context).await?;

        let user = lookup(&body, "data.user")
            .ok_or_else(|| ApiError::shape(&context, "response has no data.user"))?;
        Ok(AccountInfo::from_user(user, &context)?.pk)
    }

    /// Fetches the account record by username through the mobile API.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedShape`] if `user` is missing, or any
    /// classified HTTP or API failure.
    pub async fn user_info_by_username(
        &self,
        session: &Session,
        username: &str,
    ) -> Result<AccountInfo, ApiError> {
        let url = self.api_url(&format!("users/{username}/usernameinfo/"), &[])?;
        self.fetch_user(url, session, &format!("usernameinfo(username={username})"))
            .await
    }

    /// Fetches the account record by id through the mobile API.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedShape`] if `user` is missing, or any
    /// classified HTTP or API failure.
    pub async fn user_info(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<AccountInfo, ApiError> {
        let url = self.api_url(&format!("users/{user_id}/info/"), &[])?;
        self.fetch_user(url, session, &format!("user_info(id={user_id})"))
            .await
    }

    async fn fetch_user(
        &self,
        url: reqwest::Url,
        session: &Session,
        context: &str,
    ) -> Result<AccountInfo, ApiError> {
        let request = self.authed(self.http.get(url), session, Surface::Mobile);
        let body = self.send_json(request, context).await?;
        let user = lookup(&body, "user")
            .ok_or_else(|| ApiError::shape(context, "response has no user"))?;
        AccountInfo::from_user(user, context)
    }

    /// Lists the account's most recent feed posts from the mobile feed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedShape`] if `items` is missing, or any
    /// classified HTTP or API failure.
    pub async fn user_medias_v1(
        &self,
        session: &Session,
        user_id: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        let count = amount.to_string();
        let url = self.api_url(&format!("feed/user/{user_id}/"), &[("count", &count)])?;
        let request = self.authed(self.http.get(url), session, Surface::Mobile);
        let context = format!("user_medias_v1(id={user_id})");
        let body = self.send_json(request, &context).await?;

        Ok(array_at(&body, "items", &context)?
            .iter()
            .take(amount)
            .map(|item| RawMediaRecord::new(RecordShape::V1, item.clone()))
            .collect())
    }

    /// Lists the account's most recent posts from the web profile payload,
    /// which embeds the first page of the timeline (every media type).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedShape`] if the edge list is missing, or
    /// any classified HTTP or API failure.
    pub async fn user_medias_web(
        &self,
        session: &Session,
        username: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        let url = self.web_url("api/v1/users/web_profile_info/", &[("username", username)])?;
        let request = self.authed(self.http.get(url), session, Surface::Web);
        let context = format!("user_medias_web(username={username})");
        let body = self.send_json(request, &context).await?;

        timeline_nodes(&body, amount, &context)
    }

    /// Lists the account's most recent posts through web GraphQL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedShape`] if the edge list is missing, or
    /// any classified HTTP or API failure.
    pub async fn user_medias_gql(
        &self,
        session: &Session,
        user_id: &str,
        amount: usize,
    ) -> Result<Vec<RawMediaRecord>, ApiError> {
        let variables = json!({ "id": user_id, "first": amount }).to_string();
        let url = self.web_url(
            "graphql/query/",
            &[("query_hash", USER_MEDIA_QUERY_HASH), ("variables", &variables)],
        )?;
        let request = self.authed(self.http.get(url), session, Surface::Web);
        let context = format!("user_medias_gql(id={user_id})");
        let body = self.send_json(request, &context).await?;

        timeline_nodes(&body, amount, &context)
    }
}

/// Reads `data.user.edge_owner_to_timeline_media.edges[].node`.
fn timeline_nodes(
    body: &serde_json::Value,
    amount: usize,
    context: &str,
) -> Result<Vec<RawMediaRecord>, ApiError> {
    Ok(
        array_at(body, "data.user.edge_owner_to_timeline_media.edges", context)?
            .iter()
            .filter_map(|edge| lookup(edge, "node"))
            .take(amount)
            .map(|node| RawMediaRecord::new(RecordShape::Graphql, node.clone()))
            .collect(),
    )
}
