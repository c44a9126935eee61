use super::client::ApiClient;
use super::dto::TenantReadDto;
use crate::domain::{DomainError, TenantModel};
use crate::ports::TenantApi;
use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

pub struct HttpTenantApi {
    client: ApiClient,
}

impl HttpTenantApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TenantApi for HttpTenantApi {
    async fn get_tenant(&self, token: &str) -> Result<TenantModel, DomainError> {
        if token.is_empty() {
            return Err(DomainError::TokenNotFound {
                action: "get workspace info",
            });
        }
        let path = format!("/tokens/{}", token);
        let req = self
            .client
            .request(Method::GET, &path)
            .query(&[("token", token)]);
        let dto: TenantReadDto = self.client.send_json(req).await?;
        Ok(dto.into())
    }

    async fn create_tenant(&self) -> Result<TenantModel, DomainError> {
        let req = self.client.request(Method::POST, "/tokens/");
        let dto: TenantReadDto = self.client.send_json(req).await?;
        info!(tag = %dto.tag, "tenant created on server");
        Ok(dto.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TokenSource;
    use std::sync::Arc;

    struct NoToken;

    impl TokenSource for NoToken {
        fn current_token(&self) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn test_empty_token_rejected_without_request() {
        let api = HttpTenantApi::new(
            ApiClient::new("http://localhost:8000", None, Arc::new(NoToken)).unwrap(),
        );
        let err = api.get_tenant("").await.unwrap_err();
        assert_eq!(
            err,
            DomainError::TokenNotFound {
                action: "get workspace info"
            }
        );
    }
}
