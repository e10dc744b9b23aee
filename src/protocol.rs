use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "bad_request")]
    BadRequest,
    #[serde(rename = "auth_failed")]
    AuthFailed,
    #[serde(rename = "access_denied")]
    AccessDenied,
    #[serde(rename = "not_found")]
    NotFound,
    #[serde(rename = "invalid_state")]
    InvalidState,
    #[serde(rename = "upstream_failure")]
    UpstreamFailure,
    #[serde(rename = "internal_server_error")]
    InternalServerError,
}

#[derive(Serialize, Deserialize, Default)]
pub struct CreateVersionRequest {
    #[serde(default)]
    pub label: Option<String>,
}

// Internal endpoints of the document service

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub owner_id: Uuid,
    #[serde(default)]
    pub owner_username: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorsResponse {
    pub collaborator_ids: Vec<Uuid>,
}

// Internal endpoints of the user service

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}
