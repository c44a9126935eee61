use super::client::ApiClient;
use super::dto::{EventReadDto, EventWriteDto};
use crate::domain::{DomainError, EventModel};
use crate::ports::EntityApi;
use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

pub struct HttpEventApi {
    client: ApiClient,
}

impl HttpEventApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn item_path(event: &EventModel, action: &str) -> Result<String, DomainError> {
        event
            .id
            .as_deref()
            .map(|id| format!("/events/{}", id))
            .ok_or_else(|| {
                DomainError::InvalidInput(format!("cannot {} an event that has no id", action))
            })
    }
}

#[async_trait]
impl EntityApi for HttpEventApi {
    type Entity = EventModel;
    type Draft = EventModel;

    async fn fetch_all(&self) -> Result<Vec<EventModel>, DomainError> {
        let req = self.client.scoped(Method::GET, "/events", "get events")?;
        let rows: Vec<EventReadDto> = self.client.send_json(req).await?;
        debug!(count = rows.len(), "events fetched");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, draft: &EventModel) -> Result<EventModel, DomainError> {
        draft.validate()?;
        let req = self
            .client
            .scoped(Method::POST, "/events", "create event")?
            .json(&EventWriteDto::from(draft));
        let created: EventReadDto = self.client.send_json(req).await?;
        Ok(created.into())
    }

    async fn update(&self, event: &EventModel) -> Result<(), DomainError> {
        event.validate()?;
        let path = Self::item_path(event, "update")?;
        let req = self
            .client
            .scoped(Method::PATCH, &path, "update event")?
            .json(&EventWriteDto::from(event));
        self.client.send_empty(req).await
    }

    async fn delete(&self, event: &EventModel) -> Result<(), DomainError> {
        let path = Self::item_path(event, "delete")?;
        let req = self.client.scoped(Method::DELETE, &path, "delete event")?;
        self.client.send_empty(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryModel, ParticipantModel};
    use crate::ports::TokenSource;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    struct NoToken;

    impl TokenSource for NoToken {
        fn current_token(&self) -> Option<String> {
            None
        }
    }

    fn draft() -> EventModel {
        let start = Utc.with_ymd_and_hms(2025, 10, 22, 1, 0, 0).unwrap();
        EventModel {
            id: None,
            title: "Gym".into(),
            start,
            end: start,
            category: CategoryModel {
                id: "1".into(),
                title: "Health".into(),
            },
            participant: ParticipantModel {
                id: "1".into(),
                firstname: "Jo".into(),
                lastname: "Doe".into(),
                image_url: String::new(),
            },
        }
    }

    fn api() -> HttpEventApi {
        HttpEventApi::new(ApiClient::new("http://localhost:8000", None, Arc::new(NoToken)).unwrap())
    }

    #[tokio::test]
    async fn test_update_without_id_is_rejected_locally() {
        let err = api().update(&draft()).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_create_with_inverted_range_is_rejected() {
        let mut event = draft();
        event.start = event.end + chrono::Duration::minutes(5);
        let err = api().create(&event).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_fetch_without_token_fails_before_network() {
        let err = api().fetch_all().await.unwrap_err();
        assert_eq!(err, DomainError::TokenNotFound { action: "get events" });
    }
}
