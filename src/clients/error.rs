use async_trait::async_trait;
use reqwest::{Response, StatusCode};

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("not found")]
    NotFound,
    #[error("unexpected status: {status} {message}")]
    Status { status: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub trait ResponseExt {
    /// Passes 2xx responses through, maps everything else to `ClientError`.
    async fn error_for_client(self) -> Result<Response, ClientError>;
}

#[async_trait]
impl ResponseExt for Response {
    async fn error_for_client(self) -> Result<Response, ClientError> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        Err(ClientError::Status {
            status: status.as_u16(),
            message: self.text().await.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl ResponseExt for Result<Response, reqwest::Error> {
    async fn error_for_client(self) -> Result<Response, ClientError> {
        match self {
            Ok(response) => response.error_for_client().await,
            Err(err) => Err(err.into()),
        }
    }
}
