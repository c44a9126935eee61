//! Shared HTTP plumbing for the remote CRUD API.
//!
//! Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.

use crate::domain::DomainError;
use crate::ports::TokenSource;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    /// `timeout`: optional per-request timeout; `None` leaves it to the transport defaults.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, DomainError> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| DomainError::Transport(format!("build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("Content-Type", "application/json")
    }

    /// Request against a tenant-scoped endpoint. Without a workspace token no request is
    /// built and `TokenNotFound` is returned.
    pub(crate) fn scoped(
        &self,
        method: Method,
        path: &str,
        action: &'static str,
    ) -> Result<RequestBuilder, DomainError> {
        let Some(token) = self.tokens.current_token() else {
            debug!(action, "no workspace token; request not sent");
            return Err(DomainError::TokenNotFound { action });
        };
        Ok(self.request(method, path).query(&[("token", token)]))
    }

    /// Send and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<T, DomainError> {
        let res = Self::send_checked(req).await?;
        res.json::<T>()
            .await
            .map_err(|e| DomainError::Decode(e.to_string()))
    }

    /// Send and discard the body.
    pub(crate) async fn send_empty(&self, req: RequestBuilder) -> Result<(), DomainError> {
        Self::send_checked(req).await.map(|_| ())
    }

    async fn send_checked(req: RequestBuilder) -> Result<Response, DomainError> {
        let res = req
            .send()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            warn!(status = %status, url = %res.url(), "API returned error");
            return Err(DomainError::Status {
                code: status.as_u16(),
            });
        }
        Ok(res)
    }
}
