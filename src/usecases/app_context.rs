//! Composition of every store for one process, plus the workspace lifecycle flows.
//!
//! Built once in `main` and shared by `Arc`; nothing here is a global.

use crate::domain::{DomainError, SavedWorkspace, TenantModel};
use crate::ports::{
    CategoryApi, EventApi, ParticipantApi, TenantApi, TokenSource, WorkspaceStoragePort,
};
use crate::usecases::entity_store::{CategoryStore, EventStore, ParticipantStore, RemovePolicy};
use crate::usecases::tenant_store::TenantStore;
use crate::usecases::token_store::TokenStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Adapter set the stores are wired to.
pub struct Backends {
    pub tenants: Arc<dyn TenantApi>,
    pub categories: Arc<CategoryApi>,
    pub events: Arc<EventApi>,
    pub participants: Arc<ParticipantApi>,
    pub workspaces: Arc<dyn WorkspaceStoragePort>,
}

pub struct AppContext {
    tokens: Arc<TokenStore>,
    tenant: TenantStore,
    categories: CategoryStore,
    events: EventStore,
    participants: ParticipantStore,
    workspaces: Arc<dyn WorkspaceStoragePort>,
}

impl AppContext {
    /// `tokens` must be the same store the backends read credentials from.
    /// Spawns the store workers, so call inside a Tokio runtime.
    pub fn new(tokens: Arc<TokenStore>, backends: Backends, remove_policy: RemovePolicy) -> Self {
        let scope = || Arc::clone(&tokens) as Arc<dyn TokenSource>;
        Self {
            tenant: TenantStore::new(backends.tenants, Arc::clone(&tokens)),
            categories: CategoryStore::new_scoped(
                "categories",
                backends.categories,
                remove_policy,
                scope(),
            ),
            events: EventStore::new_scoped("events", backends.events, remove_policy, scope()),
            participants: ParticipantStore::new_scoped(
                "participants",
                backends.participants,
                remove_policy,
                scope(),
            ),
            workspaces: backends.workspaces,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn tenant(&self) -> &TenantStore {
        &self.tenant
    }

    pub fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    pub fn participants(&self) -> &ParticipantStore {
        &self.participants
    }

    /// Resolve `token`, make it the active credential and remember it under its tag.
    /// Switching to a different token drops every cached collection. When resolution
    /// fails nothing changes: the current workspace stays open.
    pub async fn open_workspace(&self, token: &str) -> Result<TenantModel, DomainError> {
        let tenant = self.tenant.resolve(token).await.map_err(|e| {
            warn!(error = %e, "workspace resolution failed");
            e
        })?;

        if self.tokens.snapshot().as_deref() != Some(token) {
            // Caches are dropped before the credential changes.
            self.reset_entity_stores();
            self.tokens.set_token(Some(token.to_string()));
        }
        self.tenant.adopt(tenant.clone());
        self.remember(&tenant).await;
        info!(tag = %tenant.tag, role = ?tenant.role, "workspace opened");
        Ok(tenant)
    }

    /// Create a workspace on the backend and open it. Refused while one is loaded.
    pub async fn create_workspace(&self) -> Result<TenantModel, DomainError> {
        let created = self.tenant.create_tenant().settled().await;
        if let Some(e) = created.error() {
            return Err(e.clone());
        }
        let tenant = created
            .into_data()
            .ok_or_else(|| DomainError::NotFound("workspace was not created".to_string()))?;
        let token = tenant.token().ok_or_else(|| {
            DomainError::InvalidInput(format!("workspace \"{}\" came without a token", tenant.tag))
        })?;

        self.reset_entity_stores();
        self.tokens.set_token(Some(token.to_string()));
        self.remember(&tenant).await;
        info!(tag = %tenant.tag, "workspace created and opened");
        Ok(tenant)
    }

    /// Reopen a previously saved workspace by tag.
    pub async fn restore_workspace(&self, tag: &str) -> Result<TenantModel, DomainError> {
        let saved = self.workspaces.get_workspace(tag).await?;
        self.open_workspace(&saved.token).await
    }

    pub async fn saved_workspaces(&self) -> Result<Vec<SavedWorkspace>, DomainError> {
        self.workspaces.list_workspaces().await
    }

    /// Forget the active credential and every cached collection.
    pub fn logout(&self) {
        self.tenant.destroy();
        self.reset_entity_stores();
        self.tokens.clear();
        info!("logged out");
    }

    fn reset_entity_stores(&self) {
        self.categories.reset();
        self.events.reset();
        self.participants.reset();
    }

    async fn remember(&self, tenant: &TenantModel) {
        if let Err(e) = self.workspaces.save_workspace(tenant).await {
            warn!(tag = %tenant.tag, error = %e, "could not save workspace");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryCategoryApi, InMemoryEventApi, InMemoryParticipantApi, InMemoryTenantApi,
    };
    use crate::adapters::persistence::WorkspaceJson;
    use crate::domain::{NewCategory, Status};
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> AppContext {
        let backends = Backends {
            tenants: Arc::new(InMemoryTenantApi::new()),
            categories: Arc::new(InMemoryCategoryApi::new("category")),
            events: Arc::new(InMemoryEventApi::new("event")),
            participants: Arc::new(InMemoryParticipantApi::new("participant")),
            workspaces: Arc::new(WorkspaceJson::new(dir.path().join("workspaces.json"))),
        };
        AppContext::new(Arc::new(TokenStore::new()), backends, RemovePolicy::default())
    }

    #[tokio::test]
    async fn test_create_logout_restore_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        let created = ctx.create_workspace().await.unwrap();
        let token = created.token().unwrap().to_string();
        assert_eq!(ctx.tokens().snapshot().as_deref(), Some(token.as_str()));

        let saved = ctx.saved_workspaces().await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].tag, created.tag);

        ctx.logout();
        assert_eq!(ctx.tokens().snapshot(), None);
        assert_eq!(ctx.tenant().snapshot().status(), Status::Never);

        let restored = ctx.restore_workspace(&created.tag).await.unwrap();
        assert_eq!(restored, created);
        assert_eq!(ctx.tokens().snapshot(), Some(token));
    }

    #[tokio::test]
    async fn test_create_refused_while_workspace_open() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        ctx.create_workspace().await.unwrap();

        let err = ctx.create_workspace().await.unwrap_err();
        assert_eq!(err, DomainError::WorkspaceAlreadyLoaded);
    }

    #[tokio::test]
    async fn test_logout_clears_entity_caches() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        ctx.create_workspace().await.unwrap();

        ctx.categories()
            .add(NewCategory {
                title: "Chores".into(),
            })
            .outcome()
            .await;
        let loaded = ctx.categories().list().settled().await;
        assert_eq!(loaded.data().len(), 1);

        ctx.logout();
        let state = ctx.categories().snapshot();
        assert_eq!(state.status(), Status::Never);
        assert!(state.data().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_token_leaves_no_credential() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        let err = ctx.open_workspace("nope").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(ctx.tokens().snapshot(), None);
        assert!(ctx.saved_workspaces().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_switch_keeps_current_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let current = ctx.create_workspace().await.unwrap();
        let token = current.token().map(str::to_string);
        ctx.categories()
            .add(NewCategory {
                title: "Chores".into(),
            })
            .outcome()
            .await;
        let before = ctx.categories().list().settled().await;

        let err = ctx.open_workspace("typo").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        assert_eq!(ctx.tokens().snapshot(), token);
        let tenant = ctx.tenant().snapshot();
        assert!(tenant.is_success());
        assert_eq!(tenant.data().as_ref(), Some(&current));
        assert_eq!(ctx.categories().snapshot(), before);
    }

    #[tokio::test]
    async fn test_switch_drops_caches_of_previous_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let first = ctx.create_workspace().await.unwrap();
        ctx.categories()
            .add(NewCategory {
                title: "Chores".into(),
            })
            .outcome()
            .await;
        ctx.logout();
        let second = ctx.create_workspace().await.unwrap();

        let reopened = ctx.open_workspace(first.token().unwrap()).await.unwrap();
        assert_eq!(reopened, first);
        assert_ne!(reopened, second);
        assert_eq!(ctx.categories().snapshot().status(), Status::Never);
        assert_eq!(ctx.tenant().snapshot().data().as_ref(), Some(&first));
    }

    #[tokio::test]
    async fn test_restore_missing_tag_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let err = ctx.restore_workspace("Office").await.unwrap_err();
        assert_eq!(
            err,
            DomainError::NotFound("Workspace \"Office\" not found".into())
        );
    }
}
