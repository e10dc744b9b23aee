use std::sync::Arc;

use log::{trace, warn};
use uuid::Uuid;

use crate::clients::{CollaborationLayer, ContentStore};
use crate::context::RequestContext;
use crate::error::{internal_error, ServiceError};

// Restore puts a snapshot back as the live document body. The write to the
// content store has to be confirmed before collaborators are told to
// reload, otherwise a reload could fetch the old body.

#[derive(Clone)]
pub struct RestoreCoordinator {
    content: Arc<dyn ContentStore>,
    collaboration: Arc<dyn CollaborationLayer>,
}

impl RestoreCoordinator {
    pub fn new(
        content: Arc<dyn ContentStore>,
        collaboration: Arc<dyn CollaborationLayer>,
    ) -> Self {
        Self {
            content,
            collaboration,
        }
    }

    /// Writes `snapshot` as the live content of the document, then signals
    /// a reload. Both steps run on a detached task that the caller awaits,
    /// so a dropped request can't stop between the write and the signal.
    pub async fn restore(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        snapshot: Vec<u8>,
    ) -> Result<(), ServiceError> {
        let coordinator = self.clone();
        let ctx = ctx.clone();
        let task = tokio::spawn(async move {
            coordinator.commit(&ctx, document_id, snapshot).await?;
            coordinator.notify(&ctx, document_id).await;
            Ok::<(), ServiceError>(())
        });
        task.await.map_err(internal_error)?
    }

    async fn commit(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        snapshot: Vec<u8>,
    ) -> Result<(), ServiceError> {
        self.content
            .write_content(ctx, document_id, snapshot)
            .await
            .map_err(|err| {
                warn!("restore: content write failed for doc {}: {}", document_id, err);
                ServiceError::upstream_failure("Couldn't write document content")
            })?;
        trace!("restore: content committed for doc {}", document_id);
        Ok(())
    }

    // Single attempt, never fails the restore.
    async fn notify(&self, ctx: &RequestContext, document_id: Uuid) {
        match self.collaboration.notify_reload(ctx, document_id).await {
            Ok(()) => trace!("restore: reload signalled for doc {}", document_id),
            Err(err) => warn!(
                "restore: reload signal for doc {} failed: {}",
                document_id, err
            ),
        }
    }
}
