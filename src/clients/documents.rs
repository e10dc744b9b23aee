use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use uuid::Uuid;

use super::error::{ClientError, ResponseExt};
use super::trim_base;
use crate::context::RequestContext;
use crate::protocol::{CollaboratorsResponse, OwnerResponse};

/// Live document body, owned by the document service.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn read_content(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<Option<Vec<u8>>, ClientError>;

    async fn write_content(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        content: Vec<u8>,
    ) -> Result<(), ClientError>;
}

/// Ownership and collaborator membership, owned by the document service.
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    async fn get_owner(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<Uuid, ClientError>;

    async fn get_collaborator_ids(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<HashSet<Uuid>, ClientError>;
}

#[derive(Clone)]
pub struct DocumentServiceClient {
    url: String,
    client: reqwest::Client,
}

impl DocumentServiceClient {
    pub fn new(url: &str, client: reqwest::Client) -> Self {
        Self {
            url: trim_base(url),
            client,
        }
    }
}

#[async_trait]
impl ContentStore for DocumentServiceClient {
    async fn read_content(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<Option<Vec<u8>>, ClientError> {
        let url = format!("{}/api/documents/{}/content", self.url, document_id);
        let res = ctx
            .apply(self.client.get(url))
            .send()
            .await
            .error_for_client()
            .await?;
        let bytes = res.bytes().await?;
        if bytes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(bytes.to_vec()))
        }
    }

    async fn write_content(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        content: Vec<u8>,
    ) -> Result<(), ClientError> {
        let url = format!(
            "{}/api/internal/documents/{}/content",
            self.url, document_id
        );
        ctx.apply(self.client.post(url))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content)
            .send()
            .await
            .error_for_client()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MembershipProvider for DocumentServiceClient {
    async fn get_owner(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<Uuid, ClientError> {
        let url = format!(
            "{}/api/internal/documents/{}/owner",
            self.url, document_id
        );
        let res = ctx
            .apply(self.client.get(url))
            .send()
            .await
            .error_for_client()
            .await?;
        let owner: OwnerResponse = res.json().await?;
        Ok(owner.owner_id)
    }

    async fn get_collaborator_ids(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<HashSet<Uuid>, ClientError> {
        let url = format!(
            "{}/api/internal/documents/{}/collaborators",
            self.url, document_id
        );
        let res = ctx
            .apply(self.client.get(url))
            .send()
            .await
            .error_for_client()
            .await?;
        let body: CollaboratorsResponse = res.json().await?;
        Ok(body.collaborator_ids.into_iter().collect())
    }
}
