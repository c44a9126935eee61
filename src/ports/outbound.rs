//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters. Every method is a lazy future: nothing happens until it is
//! polled, it resolves exactly once, and dropping it abandons the call.

use crate::domain::{
    CategoryModel, DomainError, Entity, EventModel, NewCategory, NewParticipant,
    ParticipantModel, SavedWorkspace, TenantModel,
};

/// CRUD for one entity collection.
#[async_trait::async_trait]
pub trait EntityApi: Send + Sync {
    type Entity: Entity;
    /// Input accepted by `create` (a draft record).
    type Draft: Send + Sync + 'static;

    /// Fetch the whole collection.
    async fn fetch_all(&self) -> Result<Vec<Self::Entity>, DomainError>;

    /// Persist a draft. Returns the server-confirmed entity (with its id).
    async fn create(&self, draft: &Self::Draft) -> Result<Self::Entity, DomainError>;

    async fn update(&self, entity: &Self::Entity) -> Result<(), DomainError>;

    async fn delete(&self, entity: &Self::Entity) -> Result<(), DomainError>;
}

pub type CategoryApi = dyn EntityApi<Entity = CategoryModel, Draft = NewCategory>;
pub type EventApi = dyn EntityApi<Entity = EventModel, Draft = EventModel>;
pub type ParticipantApi = dyn EntityApi<Entity = ParticipantModel, Draft = NewParticipant>;

/// Workspace (tenant) resolution and creation.
#[async_trait::async_trait]
pub trait TenantApi: Send + Sync {
    /// Resolve the workspace a token belongs to.
    async fn get_tenant(&self, token: &str) -> Result<TenantModel, DomainError>;

    /// Create a fresh workspace. The returned tenant carries its admin token.
    async fn create_tenant(&self) -> Result<TenantModel, DomainError>;
}

/// Synchronous read of the active workspace credential. Implemented by the token store;
/// adapters read it at call time to scope requests.
pub trait TokenSource: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

/// Persisted `{tag, token}` entries, one per workspace tag.
#[async_trait::async_trait]
pub trait WorkspaceStoragePort: Send + Sync {
    /// Save (or overwrite) the entry for `tenant.tag`. Fails when the tenant has no token.
    async fn save_workspace(&self, tenant: &TenantModel) -> Result<(), DomainError>;

    /// Look up a saved workspace. Missing tag is `DomainError::NotFound`.
    async fn get_workspace(&self, tag: &str) -> Result<SavedWorkspace, DomainError>;

    /// All saved workspaces, sorted by tag.
    async fn list_workspaces(&self) -> Result<Vec<SavedWorkspace>, DomainError>;
}
