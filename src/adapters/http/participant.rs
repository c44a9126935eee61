use super::client::ApiClient;
use super::dto::{ParticipantReadDto, ParticipantWriteDto};
use crate::domain::{DomainError, NewParticipant, ParticipantModel};
use crate::ports::EntityApi;
use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

pub struct HttpParticipantApi {
    client: ApiClient,
}

impl HttpParticipantApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EntityApi for HttpParticipantApi {
    type Entity = ParticipantModel;
    type Draft = NewParticipant;

    async fn fetch_all(&self) -> Result<Vec<ParticipantModel>, DomainError> {
        let req = self
            .client
            .scoped(Method::GET, "/participants/", "get participants")?;
        let rows: Vec<ParticipantReadDto> = self.client.send_json(req).await?;
        debug!(count = rows.len(), "participants fetched");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, draft: &NewParticipant) -> Result<ParticipantModel, DomainError> {
        let req = self
            .client
            .scoped(Method::POST, "/participants/", "create participant")?
            .json(&ParticipantWriteDto::from(draft));
        let created: ParticipantReadDto = self.client.send_json(req).await?;
        Ok(created.into())
    }

    async fn update(&self, participant: &ParticipantModel) -> Result<(), DomainError> {
        let path = format!("/participants/{}", participant.id);
        let req = self
            .client
            .scoped(Method::PATCH, &path, "update participant")?
            .json(&ParticipantWriteDto::from(participant));
        self.client.send_empty(req).await
    }

    async fn delete(&self, participant: &ParticipantModel) -> Result<(), DomainError> {
        let path = format!("/participants/{}", participant.id);
        let req = self
            .client
            .scoped(Method::DELETE, &path, "delete participant")?;
        self.client.send_empty(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Status;
    use crate::usecases::{ParticipantStore, RemovePolicy, TokenStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_without_token_settles_to_error_without_network() {
        let tokens = Arc::new(TokenStore::new());
        // Unroutable port: any request that did go out would fail as Transport instead.
        let client = ApiClient::new("http://127.0.0.1:9", None, tokens).unwrap();
        let store = ParticipantStore::new(
            "participants",
            Arc::new(HttpParticipantApi::new(client)),
            RemovePolicy::default(),
        );

        let state = store.list().settled().await;
        assert_eq!(state.status(), Status::Error);
        assert!(state.data().is_empty());
        assert_eq!(
            state.error(),
            Some(&DomainError::TokenNotFound {
                action: "get participants"
            })
        );
    }
}
