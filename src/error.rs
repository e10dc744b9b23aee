use log::error;

use crate::protocol::ErrorCode;

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
}

impl ServiceError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            code: ErrorCode::BadRequest,
            message: msg.to_string(),
        }
    }
    pub fn auth_failed(msg: &str) -> Self {
        Self {
            code: ErrorCode::AuthFailed,
            message: msg.to_string(),
        }
    }
    pub fn access_denied(msg: &str) -> Self {
        Self {
            code: ErrorCode::AccessDenied,
            message: msg.to_string(),
        }
    }
    pub fn not_found(msg: &str) -> Self {
        Self {
            code: ErrorCode::NotFound,
            message: msg.to_string(),
        }
    }
    pub fn invalid_state(msg: &str) -> Self {
        Self {
            code: ErrorCode::InvalidState,
            message: msg.to_string(),
        }
    }
    pub fn upstream_failure(msg: &str) -> Self {
        Self {
            code: ErrorCode::UpstreamFailure,
            message: msg.to_string(),
        }
    }
    pub fn internal(msg: &str) -> Self {
        Self {
            code: ErrorCode::InternalServerError,
            message: msg.to_string(),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Utility function for mapping any error into an Internal Server Error
pub fn internal_error<E>(err: E) -> ServiceError
where
    E: std::error::Error,
{
    error!("internal error: {:?}", err);
    ServiceError::internal(&err.to_string())
}
