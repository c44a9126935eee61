//! In-memory adapters for running without a backend.
//!
//! Start empty. Tenant-agnostic: every token sees the same collections.

use crate::domain::{
    CategoryModel, DomainError, Entity, EventModel, NewCategory, NewParticipant,
    ParticipantModel, Role, TenantModel,
};
use crate::ports::{EntityApi, TenantApi};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Builds a stored entity from a draft and a freshly assigned id.
pub trait FromDraft<D>: Sized {
    fn from_draft(id: String, draft: &D) -> Self;
}

impl FromDraft<NewCategory> for CategoryModel {
    fn from_draft(id: String, draft: &NewCategory) -> Self {
        Self {
            id,
            title: draft.title.clone(),
        }
    }
}

impl FromDraft<NewParticipant> for ParticipantModel {
    fn from_draft(id: String, draft: &NewParticipant) -> Self {
        Self {
            id,
            firstname: draft.firstname.clone(),
            lastname: draft.lastname.clone(),
            image_url: draft.image_url.clone(),
        }
    }
}

impl FromDraft<EventModel> for EventModel {
    fn from_draft(id: String, draft: &EventModel) -> Self {
        Self {
            id: Some(id),
            ..draft.clone()
        }
    }
}

/// One in-memory collection. `kind` only labels log lines and errors.
pub struct InMemoryEntityApi<E, D> {
    kind: &'static str,
    items: RwLock<Vec<E>>,
    next_id: AtomicU64,
    delay_ms: u64,
    _draft: PhantomData<fn(D)>,
}

pub type InMemoryCategoryApi = InMemoryEntityApi<CategoryModel, NewCategory>;
pub type InMemoryEventApi = InMemoryEntityApi<EventModel, EventModel>;
pub type InMemoryParticipantApi = InMemoryEntityApi<ParticipantModel, NewParticipant>;

impl<E, D> InMemoryEntityApi<E, D> {
    pub fn new(kind: &'static str) -> Self {
        Self::with_delay(kind, 0)
    }

    /// Simulate network latency on every call.
    pub fn with_delay(kind: &'static str, delay_ms: u64) -> Self {
        Self {
            kind,
            items: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            delay_ms,
            _draft: PhantomData,
        }
    }

    async fn latency(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn missing(&self, verb: &str, id: Option<&str>) -> DomainError {
        DomainError::NotFound(format!(
            "failed {} {}, id {} not found",
            verb,
            self.kind,
            id.unwrap_or("<none>")
        ))
    }
}

#[async_trait::async_trait]
impl<E, D> EntityApi for InMemoryEntityApi<E, D>
where
    E: Entity + FromDraft<D>,
    D: Send + Sync + 'static,
{
    type Entity = E;
    type Draft = D;

    async fn fetch_all(&self) -> Result<Vec<E>, DomainError> {
        self.latency().await;
        let items = self.items.read().await;
        debug!(kind = self.kind, count = items.len(), "[MEMORY] fetch all");
        Ok(items.clone())
    }

    async fn create(&self, draft: &D) -> Result<E, DomainError> {
        self.latency().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let entity = E::from_draft(id, draft);
        self.items.write().await.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: &E) -> Result<(), DomainError> {
        self.latency().await;
        let mut items = self.items.write().await;
        let slot = items
            .iter_mut()
            .find(|e| e.same_id(entity))
            .ok_or_else(|| self.missing("updating", entity.id()))?;
        *slot = entity.clone();
        Ok(())
    }

    async fn delete(&self, entity: &E) -> Result<(), DomainError> {
        self.latency().await;
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|e| !e.same_id(entity));
        if items.len() == before {
            return Err(self.missing("deleting", entity.id()));
        }
        Ok(())
    }
}

/// Mints admin workspaces and resolves them by token.
#[derive(Default)]
pub struct InMemoryTenantApi {
    tenants: RwLock<HashMap<String, TenantModel>>,
    counter: AtomicU64,
}

impl InMemoryTenantApi {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TenantApi for InMemoryTenantApi {
    async fn get_tenant(&self, token: &str) -> Result<TenantModel, DomainError> {
        self.tenants
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("no workspace for token {}", token)))
    }

    async fn create_tenant(&self) -> Result<TenantModel, DomainError> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("mem-{:x}-{}", millis, n);
        let tenant = TenantModel {
            role: Role::Admin,
            tag: format!("Workspace {}", n),
            admin_token: Some(token.clone()),
            editor_token: None,
            visitor_token: None,
        };
        self.tenants.write().await.insert(token, tenant.clone());
        info!(tag = %tenant.tag, "[MEMORY] workspace created");
        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collections_start_empty_and_assign_ids() {
        let api = InMemoryCategoryApi::new("category");
        assert!(api.fetch_all().await.unwrap().is_empty());

        let a = api.create(&NewCategory { title: "A".into() }).await.unwrap();
        let b = api.create(&NewCategory { title: "B".into() }).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(api.fetch_all().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id_fail() {
        let api = InMemoryCategoryApi::new("category");
        let ghost = CategoryModel {
            id: "42".into(),
            title: "ghost".into(),
        };
        let err = api.update(&ghost).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::NotFound("failed updating category, id 42 not found".into())
        );
        assert!(matches!(
            api.delete(&ghost).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_stored_entity() {
        let api = InMemoryParticipantApi::new("participant");
        let mut p = api
            .create(&NewParticipant {
                firstname: "Jo".into(),
                lastname: "Doe".into(),
                image_url: String::new(),
            })
            .await
            .unwrap();
        p.lastname = "Roe".into();
        api.update(&p).await.unwrap();
        assert_eq!(api.fetch_all().await.unwrap()[0].full_name(), "Jo Roe");

        api.delete(&p).await.unwrap();
        assert!(api.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_created_tenant_resolves_by_token() {
        let api = InMemoryTenantApi::new();
        let created = api.create_tenant().await.unwrap();
        let token = created.token().unwrap().to_string();

        assert_eq!(api.get_tenant(&token).await.unwrap(), created);
        assert!(matches!(
            api.get_tenant("unknown").await,
            Err(DomainError::NotFound(_))
        ));
    }
}
