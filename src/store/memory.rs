use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Appended, VersionDraft, VersionStore};
use crate::error::ServiceError;
use crate::models::{Version, VersionSummary};
use crate::retention::{self, VersionKey};

#[derive(Default)]
struct Log {
    versions: Vec<Version>,
    last_seq: i64,
}

/// In-process version store; one mutex stands in for the counter row lock.
#[derive(Default)]
pub struct MemoryVersionStore {
    logs: Mutex<HashMap<Uuid, Log>>,
}

impl MemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a version as-is, bypassing retention. Lets tests build logs
    /// that an older writer may have left over the cap.
    pub async fn seed(&self, version: Version) {
        let mut logs = self.logs.lock().await;
        let log = logs.entry(version.document_id).or_default();
        log.last_seq = log.last_seq.max(version.seq);
        log.versions.push(version);
    }
}

#[async_trait]
impl VersionStore for MemoryVersionStore {
    async fn append(
        &self,
        draft: VersionDraft,
        cap: usize,
    ) -> Result<Appended, ServiceError> {
        let mut logs = self.logs.lock().await;
        let log = logs.entry(draft.document_id).or_default();

        let keys: Vec<VersionKey> = log
            .versions
            .iter()
            .map(|v| VersionKey {
                id: v.id,
                seq: v.seq,
                created_at: v.created_at,
            })
            .collect();
        let evicted = retention::select_evictions(&keys, cap);
        log.versions.retain(|v| !evicted.contains(&v.id));

        let max_seq = keys.iter().map(|key| key.seq).max();
        let seq = retention::next_seq(max_seq, log.last_seq);
        let latest = keys.iter().map(|key| key.created_at).max();
        let version = Version {
            id: Uuid::new_v4(),
            document_id: draft.document_id,
            seq,
            content: draft.content,
            label: draft.label,
            author_id: draft.author_id,
            created_at: retention::next_created_at(latest, Utc::now()),
        };
        let summary = VersionSummary::from(&version);
        log.versions.push(version);
        log.last_seq = seq;

        Ok(Appended {
            version: summary,
            evicted,
        })
    }

    async fn list(
        &self,
        document_id: Uuid,
    ) -> Result<Vec<VersionSummary>, ServiceError> {
        let logs = self.logs.lock().await;
        let mut list: Vec<VersionSummary> = logs
            .get(&document_id)
            .map(|log| log.versions.iter().map(VersionSummary::from).collect())
            .unwrap_or_default();
        list.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(list)
    }

    async fn get(&self, version_id: Uuid) -> Result<Option<Version>, ServiceError> {
        let logs = self.logs.lock().await;
        Ok(logs
            .values()
            .flat_map(|log| log.versions.iter())
            .find(|v| v.id == version_id)
            .cloned())
    }

    async fn delete(&self, version_id: Uuid) -> Result<bool, ServiceError> {
        let mut logs = self.logs.lock().await;
        for log in logs.values_mut() {
            let before = log.versions.len();
            log.versions.retain(|v| v.id != version_id);
            if log.versions.len() != before {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
