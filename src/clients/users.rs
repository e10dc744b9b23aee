use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use log::warn;
use uuid::Uuid;

use super::error::{ClientError, ResponseExt};
use super::trim_base;
use crate::context::RequestContext;
use crate::protocol::UserSummary;

/// Identity lookups against the user service. Usernames are display data
/// only and never take part in an access decision.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<Option<UserSummary>, ClientError>;

    async fn resolve_usernames(
        &self,
        ctx: &RequestContext,
        ids: &HashSet<Uuid>,
    ) -> HashMap<Uuid, String>;
}

#[derive(Clone)]
pub struct UserServiceClient {
    url: String,
    client: reqwest::Client,
}

impl UserServiceClient {
    pub fn new(url: &str, client: reqwest::Client) -> Self {
        Self {
            url: trim_base(url),
            client,
        }
    }

    fn by_username_url(&self, username: &str) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.url)
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Transport("Invalid user service url".to_string()))?
            .pop_if_empty()
            .extend(["api", "internal", "users", "by-username", username]);
        Ok(url)
    }

    async fn fetch_summaries(
        &self,
        ctx: &RequestContext,
        ids: &HashSet<Uuid>,
    ) -> Result<Vec<UserSummary>, ClientError> {
        let url = format!("{}/api/internal/users/summaries", self.url);
        let ids: Vec<&Uuid> = ids.iter().collect();
        let res = ctx
            .apply(self.client.post(url))
            .json(&ids)
            .send()
            .await
            .error_for_client()
            .await?;
        Ok(res.json().await?)
    }
}

#[async_trait]
impl UserDirectory for UserServiceClient {
    async fn find_by_username(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<Option<UserSummary>, ClientError> {
        let url = self.by_username_url(username)?;
        let res = ctx.apply(self.client.get(url)).send().await.error_for_client().await;
        match res {
            Ok(res) => Ok(Some(res.json().await?)),
            Err(ClientError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn resolve_usernames(
        &self,
        ctx: &RequestContext,
        ids: &HashSet<Uuid>,
    ) -> HashMap<Uuid, String> {
        if ids.is_empty() {
            return HashMap::new();
        }
        match self.fetch_summaries(ctx, ids).await {
            Ok(summaries) => summaries
                .into_iter()
                .map(|user| (user.id, user.username))
                .collect(),
            Err(err) => {
                warn!("users: couldn't resolve usernames: {}", err);
                HashMap::new()
            }
        }
    }
}
