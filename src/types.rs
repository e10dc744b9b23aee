use crate::models;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub id: uuid::Uuid,
    pub document_id: uuid::Uuid,
    pub version_number: i64,
    pub label: Option<String>,
    pub created_by: uuid::Uuid,
    pub created_by_username: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl VersionInfo {
    pub fn from_model(
        version: models::VersionSummary,
        username: Option<String>,
    ) -> Self {
        Self {
            id: version.id,
            document_id: version.document_id,
            version_number: version.seq,
            label: version.label,
            created_by: version.author_id,
            created_by_username: username,
            created_at: version.created_at,
        }
    }
}

/// Authenticated caller, resolved from the identity the gateway forwards.
#[derive(Clone, Debug)]
pub struct Caller {
    pub id: uuid::Uuid,
    pub username: String,
}
