use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
};

// Credential of the inbound request. It is handed explicitly to every
// outbound call made on behalf of that request and dropped with it.

#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    credential: Option<HeaderValue>,
}

impl RequestContext {
    pub fn new(credential: Option<HeaderValue>) -> Self {
        Self { credential }
    }

    pub fn credential(&self) -> Option<&HeaderValue> {
        self.credential.as_ref()
    }

    /// Attaches the inbound `Authorization` value verbatim, or nothing.
    pub fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credential {
            Some(value) => builder.header(AUTHORIZATION, value.clone()),
            None => builder,
        }
    }
}

#[cfg(test)]
impl RequestContext {
    pub fn anonymous() -> Self {
        Self { credential: None }
    }

    pub fn bearer(token: &str) -> Self {
        let credential = HeaderValue::from_str(&format!("Bearer {}", token)).ok();
        Self { credential }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::new(parts.headers.get(AUTHORIZATION).cloned()))
    }
}
