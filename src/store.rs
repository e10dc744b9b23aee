use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::db;
use crate::error::{internal_error, ServiceError};
use crate::models::{self, Version, VersionSummary};
use crate::retention::{self, VersionKey};
use crate::schema::{document_versions, version_counters};

#[cfg(test)]
pub mod memory;

/// Content and metadata of a version that is about to be appended.
pub struct VersionDraft {
    pub document_id: Uuid,
    pub author_id: Uuid,
    pub label: Option<String>,
    pub content: Vec<u8>,
}

pub struct Appended {
    pub version: VersionSummary,
    pub evicted: Vec<Uuid>,
}

/// Per-document bounded version log.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Assigns the next sequence number, evicts down to `cap - 1` entries and
    /// stores the draft, as one serialized step per document.
    async fn append(
        &self,
        draft: VersionDraft,
        cap: usize,
    ) -> Result<Appended, ServiceError>;

    /// Versions of a document, newest first.
    async fn list(
        &self,
        document_id: Uuid,
    ) -> Result<Vec<VersionSummary>, ServiceError>;

    async fn get(&self, version_id: Uuid) -> Result<Option<Version>, ServiceError>;

    async fn delete(&self, version_id: Uuid) -> Result<bool, ServiceError>;
}

pub struct PgVersionStore {
    pool: db::DbConnectionPool,
}

impl PgVersionStore {
    pub fn new(pool: db::DbConnectionPool) -> Self {
        Self { pool }
    }

    async fn connect(&self) -> Result<db::DbConnection, ServiceError> {
        self.pool.get().await.map_err(internal_error)
    }
}

#[async_trait]
impl VersionStore for PgVersionStore {
    async fn append(
        &self,
        draft: VersionDraft,
        cap: usize,
    ) -> Result<Appended, ServiceError> {
        let mut conn = self.connect().await?;
        let document_id = draft.document_id;

        conn.transaction::<_, diesel::result::Error, _>(move |conn| {
            async move {
                // The counter row is the per-document lock for the whole
                // read-evict-insert sequence.
                diesel::insert_into(version_counters::table)
                    .values(version_counters::document_id.eq(document_id))
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;
                let last_seq: i64 = version_counters::table
                    .find(document_id)
                    .select(version_counters::last_seq)
                    .for_update()
                    .get_result(conn)
                    .await?;

                let keys: Vec<VersionKey> = document_versions::table
                    .filter(document_versions::document_id.eq(document_id))
                    .select((
                        document_versions::id,
                        document_versions::seq,
                        document_versions::created_at,
                    ))
                    .load::<(Uuid, i64, DateTime<Utc>)>(conn)
                    .await?
                    .into_iter()
                    .map(|(id, seq, created_at)| VersionKey {
                        id,
                        seq,
                        created_at,
                    })
                    .collect();

                let evicted = retention::select_evictions(&keys, cap);
                if !evicted.is_empty() {
                    diesel::delete(
                        document_versions::table
                            .filter(document_versions::id.eq_any(evicted.clone())),
                    )
                    .execute(conn)
                    .await?;
                }

                let max_seq = keys.iter().map(|key| key.seq).max();
                let seq = retention::next_seq(max_seq, last_seq);
                // Stamped under the lock, not at transaction start.
                let latest = keys.iter().map(|key| key.created_at).max();
                let new_version = models::NewVersion {
                    document_id,
                    seq,
                    content: &draft.content,
                    label: draft.label.as_deref(),
                    author_id: draft.author_id,
                    created_at: retention::next_created_at(latest, Utc::now()),
                };
                let version = diesel::insert_into(document_versions::table)
                    .values(&new_version)
                    .returning(VersionSummary::as_returning())
                    .get_result(conn)
                    .await?;

                diesel::update(version_counters::table.find(document_id))
                    .set(version_counters::last_seq.eq(seq))
                    .execute(conn)
                    .await?;

                Ok(Appended { version, evicted })
            }
            .scope_boxed()
        })
        .await
        .map_err(internal_error)
    }

    async fn list(
        &self,
        document_id: Uuid,
    ) -> Result<Vec<VersionSummary>, ServiceError> {
        let mut conn = self.connect().await?;
        document_versions::table
            .filter(document_versions::document_id.eq(document_id))
            .order(document_versions::seq.desc())
            .select(VersionSummary::as_select())
            .load(&mut conn)
            .await
            .map_err(internal_error)
    }

    async fn get(&self, version_id: Uuid) -> Result<Option<Version>, ServiceError> {
        let mut conn = self.connect().await?;
        document_versions::table
            .find(version_id)
            .select(Version::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(internal_error)
    }

    async fn delete(&self, version_id: Uuid) -> Result<bool, ServiceError> {
        let mut conn = self.connect().await?;
        let num = diesel::delete(document_versions::table.find(version_id))
            .execute(&mut conn)
            .await
            .map_err(internal_error)?;
        Ok(num != 0)
    }
}
