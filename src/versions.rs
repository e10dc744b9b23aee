use std::collections::HashSet;
use std::sync::Arc;

use log::{trace, warn};
use uuid::Uuid;

use crate::access::{authorize_access, authorize_owner};
use crate::clients::{ClientError, ContentStore, MembershipProvider, UserDirectory};
use crate::context::RequestContext;
use crate::error::ServiceError;
use crate::models::Version;
use crate::restore::RestoreCoordinator;
use crate::retention::MAX_VERSIONS_PER_DOCUMENT;
use crate::store::{VersionDraft, VersionStore};
use crate::types::VersionInfo;

pub const MAX_LABEL_LENGTH: usize = 100;

/// Version history operations. Every operation authorizes against the
/// document service first and carries the caller's credential through.
pub struct VersionService {
    store: Arc<dyn VersionStore>,
    content: Arc<dyn ContentStore>,
    membership: Arc<dyn MembershipProvider>,
    users: Arc<dyn UserDirectory>,
    restorer: RestoreCoordinator,
}

fn normalize_label(label: Option<String>) -> Result<Option<String>, ServiceError> {
    let Some(label) = label else {
        return Ok(None);
    };
    let label = label.trim();
    if label.is_empty() {
        return Ok(None);
    }
    if label.chars().count() > MAX_LABEL_LENGTH {
        return Err(ServiceError::bad_request(
            "Label must not exceed 100 characters",
        ));
    }
    Ok(Some(label.to_string()))
}

impl VersionService {
    pub fn new(
        store: Arc<dyn VersionStore>,
        content: Arc<dyn ContentStore>,
        membership: Arc<dyn MembershipProvider>,
        users: Arc<dyn UserDirectory>,
        restorer: RestoreCoordinator,
    ) -> Self {
        Self {
            store,
            content,
            membership,
            users,
            restorer,
        }
    }

    pub async fn create_version(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        user: Uuid,
        label: Option<String>,
    ) -> Result<VersionInfo, ServiceError> {
        let label = normalize_label(label)?;
        authorize_access(self.membership.as_ref(), ctx, document_id, user).await?;

        let content = match self.content.read_content(ctx, document_id).await {
            Ok(Some(content)) if !content.is_empty() => content,
            Ok(_) => {
                return Err(ServiceError::invalid_state(
                    "Document has no content to version",
                ))
            }
            Err(ClientError::NotFound) => {
                return Err(ServiceError::not_found("Document not found"))
            }
            Err(err) => {
                warn!("versions: content read failed for doc {}: {}", document_id, err);
                return Err(ServiceError::upstream_failure(
                    "Couldn't read document content",
                ));
            }
        };

        let draft = VersionDraft {
            document_id,
            author_id: user,
            label,
            content,
        };
        let appended = self.store.append(draft, MAX_VERSIONS_PER_DOCUMENT).await?;
        for evicted in &appended.evicted {
            trace!("versions: evicted {} from doc {}", evicted, document_id);
        }
        trace!(
            "versions: created v{} for doc {}",
            appended.version.seq,
            document_id
        );

        let names = self
            .users
            .resolve_usernames(ctx, &HashSet::from([user]))
            .await;
        let username = names.get(&user).cloned();
        Ok(VersionInfo::from_model(appended.version, username))
    }

    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        user: Uuid,
    ) -> Result<Vec<VersionInfo>, ServiceError> {
        authorize_access(self.membership.as_ref(), ctx, document_id, user).await?;
        let versions = self.store.list(document_id).await?;
        let authors: HashSet<Uuid> = versions.iter().map(|v| v.author_id).collect();
        let names = self.users.resolve_usernames(ctx, &authors).await;
        Ok(versions
            .into_iter()
            .map(|v| {
                let username = names.get(&v.author_id).cloned();
                VersionInfo::from_model(v, username)
            })
            .collect())
    }

    pub async fn get_version_content(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        user: Uuid,
        version_id: Uuid,
    ) -> Result<Vec<u8>, ServiceError> {
        authorize_access(self.membership.as_ref(), ctx, document_id, user).await?;
        let version = self.find_version(document_id, version_id).await?;
        Ok(version.content)
    }

    pub async fn restore_version(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        user: Uuid,
        version_id: Uuid,
    ) -> Result<(), ServiceError> {
        authorize_access(self.membership.as_ref(), ctx, document_id, user).await?;
        let version = self.find_version(document_id, version_id).await?;
        self.restorer
            .restore(ctx, document_id, version.content)
            .await?;
        trace!("versions: restored v{} of doc {}", version.seq, document_id);
        Ok(())
    }

    pub async fn delete_version(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        user: Uuid,
        version_id: Uuid,
    ) -> Result<(), ServiceError> {
        authorize_owner(self.membership.as_ref(), ctx, document_id, user).await?;
        self.find_version(document_id, version_id).await?;
        if !self.store.delete(version_id).await? {
            return Err(ServiceError::not_found("Version not found"));
        }
        trace!("versions: deleted {} from doc {}", version_id, document_id);
        Ok(())
    }

    // A version id is only meaningful together with its own document.
    async fn find_version(
        &self,
        document_id: Uuid,
        version_id: Uuid,
    ) -> Result<Version, ServiceError> {
        match self.store.get(version_id).await? {
            Some(version) if version.document_id == document_id => Ok(version),
            _ => Err(ServiceError::not_found("Version not found")),
        }
    }
}
