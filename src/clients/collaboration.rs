use async_trait::async_trait;
use uuid::Uuid;

use super::error::{ClientError, ResponseExt};
use super::trim_base;
use crate::context::RequestContext;

/// Presence layer that holds live editing sessions. A reload signal tells it
/// to drop its in-memory copy of the document and refetch.
#[async_trait]
pub trait CollaborationLayer: Send + Sync {
    async fn notify_reload(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<(), ClientError>;
}

#[derive(Clone)]
pub struct CollaborationServiceClient {
    url: String,
    client: reqwest::Client,
}

impl CollaborationServiceClient {
    pub fn new(url: &str, client: reqwest::Client) -> Self {
        Self {
            url: trim_base(url),
            client,
        }
    }
}

#[async_trait]
impl CollaborationLayer for CollaborationServiceClient {
    async fn notify_reload(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<(), ClientError> {
        let url = format!("{}/reload-document/{}", self.url, document_id);
        ctx.apply(self.client.post(url))
            .send()
            .await
            .error_for_client()
            .await?;
        Ok(())
    }
}
