use diesel::prelude::*;

use crate::schema;

/// Immutable snapshot of a document body.
#[derive(Selectable, Queryable, Debug, Clone)]
#[diesel(table_name = schema::document_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Version {
    pub id: uuid::Uuid,
    pub document_id: uuid::Uuid,
    pub seq: i64,
    pub content: Vec<u8>,
    pub label: Option<String>,
    pub author_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Version metadata without the snapshot bytes, for listings.
#[derive(Selectable, Queryable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = schema::document_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VersionSummary {
    pub id: uuid::Uuid,
    pub document_id: uuid::Uuid,
    pub seq: i64,
    pub label: Option<String>,
    pub author_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Version> for VersionSummary {
    fn from(version: &Version) -> Self {
        Self {
            id: version.id,
            document_id: version.document_id,
            seq: version.seq,
            label: version.label.clone(),
            author_id: version.author_id,
            created_at: version.created_at,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = schema::document_versions)]
pub struct NewVersion<'a> {
    pub document_id: uuid::Uuid,
    pub seq: i64,
    pub content: &'a [u8],
    pub label: Option<&'a str>,
    pub author_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
