use std::time::Duration;

pub mod collaboration;
pub mod documents;
pub mod error;
pub mod users;

pub use collaboration::{CollaborationLayer, CollaborationServiceClient};
pub use documents::{ContentStore, DocumentServiceClient, MembershipProvider};
pub use error::ClientError;
pub use users::{UserDirectory, UserServiceClient};

/// Shared HTTP client for every upstream call. The timeout bounds each
/// request end to end; hitting it surfaces as `ClientError::Timeout`.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
