use std::collections::HashSet;

use log::{trace, warn};
use uuid::Uuid;

use crate::clients::{ClientError, MembershipProvider};
use crate::context::RequestContext;
use crate::error::ServiceError;

// Access rules for a document. Owner access is implicit: the owner is
// never stored as a collaborator.

pub fn is_owner(user: Uuid, owner: Uuid) -> bool {
    user == owner
}

pub fn is_collaborator(user: Uuid, collaborators: &HashSet<Uuid>) -> bool {
    collaborators.contains(&user)
}

pub fn has_access(user: Uuid, owner: Uuid, collaborators: &HashSet<Uuid>) -> bool {
    is_owner(user, owner) || is_collaborator(user, collaborators)
}

pub fn can_add_collaborator(
    candidate: Uuid,
    owner: Uuid,
    existing: &HashSet<Uuid>,
) -> bool {
    candidate != owner && !existing.contains(&candidate)
}

// Remote checks. A missing document is reported as such; every other
// failure of the lookup denies access.

fn lookup_failed(document_id: Uuid, err: ClientError) -> ServiceError {
    match err {
        ClientError::NotFound => ServiceError::not_found("Document not found"),
        err => {
            warn!("access: lookup failed for doc {}, denying: {}", document_id, err);
            ServiceError::access_denied("Access denied")
        }
    }
}

pub async fn authorize_access(
    provider: &dyn MembershipProvider,
    ctx: &RequestContext,
    document_id: Uuid,
    user: Uuid,
) -> Result<(), ServiceError> {
    let owner = provider
        .get_owner(ctx, document_id)
        .await
        .map_err(|err| lookup_failed(document_id, err))?;
    if is_owner(user, owner) {
        return Ok(());
    }
    let collaborators = provider
        .get_collaborator_ids(ctx, document_id)
        .await
        .map_err(|err| lookup_failed(document_id, err))?;
    if has_access(user, owner, &collaborators) {
        Ok(())
    } else {
        trace!("access: user {} denied on doc {}", user, document_id);
        Err(ServiceError::access_denied("Access denied"))
    }
}

pub async fn authorize_owner(
    provider: &dyn MembershipProvider,
    ctx: &RequestContext,
    document_id: Uuid,
    user: Uuid,
) -> Result<(), ServiceError> {
    let owner = provider
        .get_owner(ctx, document_id)
        .await
        .map_err(|err| lookup_failed(document_id, err))?;
    if is_owner(user, owner) {
        Ok(())
    } else {
        Err(ServiceError::access_denied("Only the owner can do this"))
    }
}
