//! Tenant (workspace) store. Caches the resolved workspace for the active token.
//!
//! Same at-most-one-fetch discipline as the entity stores; the token is inferred from the
//! token store when the caller does not pass one.

use crate::domain::{DataStatus, DomainError, Status, TenantModel};
use crate::ports::TenantApi;
use crate::usecases::token_store::TokenStore;
use crate::usecases::view::View;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

type TenantState = watch::Sender<DataStatus<Option<TenantModel>>>;

pub struct TenantStore {
    api: Arc<dyn TenantApi>,
    tokens: Arc<TokenStore>,
    state: Arc<TenantState>,
    fetch_status: Arc<watch::Sender<Status>>,
    generation: Arc<AtomicU64>,
}

impl TenantStore {
    pub fn new(api: Arc<dyn TenantApi>, tokens: Arc<TokenStore>) -> Self {
        let (state, _) = watch::channel(DataStatus::never(None));
        let (fetch_status, _) = watch::channel(Status::Never);
        Self {
            api,
            tokens,
            state: Arc::new(state),
            fetch_status: Arc::new(fetch_status),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> View<DataStatus<Option<TenantModel>>> {
        View::new(self.state.subscribe())
    }

    pub fn snapshot(&self) -> DataStatus<Option<TenantModel>> {
        self.state.borrow().clone()
    }

    /// Create a new workspace. Refused (no request sent) while a token is loaded.
    pub fn create_tenant(&self) -> View<DataStatus<Option<TenantModel>>> {
        if self.tokens.snapshot().is_some() {
            warn!("create tenant refused: workspace already loaded");
            self.state
                .send_modify(|s| s.fail(DomainError::WorkspaceAlreadyLoaded));
            return self.subscribe();
        }

        self.state.send_modify(|s| {
            s.mark_loading();
            *s.data_mut() = None;
        });
        let view = self.subscribe();

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let generation = Arc::clone(&self.generation);
        let started_at = generation.load(Ordering::SeqCst);
        tokio::spawn(async move {
            let result = api.create_tenant().await;
            if generation.load(Ordering::SeqCst) != started_at {
                return;
            }
            match &result {
                Ok(tenant) => info!(tag = %tenant.tag, role = ?tenant.role, "workspace created"),
                Err(e) => warn!(error = %e, "workspace creation failed"),
            }
            state.send_replace(DataStatus::from_result(result.map(Some), None));
        });

        view
    }

    /// Resolve the workspace for `token` (or the token store's current token).
    /// Without any token this returns the current view and fetches nothing.
    pub fn get_tenant(&self, token: Option<&str>) -> View<DataStatus<Option<TenantModel>>> {
        let Some(token) = token.map(str::to_string).or_else(|| self.tokens.snapshot()) else {
            debug!("no workspace token; returning current tenant view");
            return self.subscribe();
        };

        let mut should_fetch = false;
        self.fetch_status.send_if_modified(|status| {
            if matches!(status, Status::Loading | Status::Success) {
                return false;
            }
            *status = Status::Loading;
            should_fetch = true;
            true
        });
        if !should_fetch {
            debug!("tenant served from cache");
            return self.subscribe();
        }

        self.state.send_modify(DataStatus::mark_loading);
        let view = self.subscribe();

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let fetch_status = Arc::clone(&self.fetch_status);
        let generation = Arc::clone(&self.generation);
        let started_at = generation.load(Ordering::SeqCst);
        tokio::spawn(async move {
            let result = api.get_tenant(&token).await;
            if generation.load(Ordering::SeqCst) != started_at {
                debug!("discarding tenant fetch started before destroy");
                return;
            }
            let status = match &result {
                Ok(tenant) => {
                    info!(tag = %tenant.tag, role = ?tenant.role, "workspace resolved");
                    Status::Success
                }
                Err(e) => {
                    warn!(error = %e, "workspace resolution failed");
                    Status::Error
                }
            };
            state.send_replace(DataStatus::from_result(result.map(Some), None));
            fetch_status.send_replace(status);
        });

        view
    }

    /// Look up the workspace for `token` without touching the cached view.
    pub async fn resolve(&self, token: &str) -> Result<TenantModel, DomainError> {
        self.api.get_tenant(token).await
    }

    /// Publish a workspace resolved elsewhere. Any fetch still in flight is discarded.
    pub fn adopt(&self, tenant: TenantModel) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        info!(tag = %tenant.tag, role = ?tenant.role, "workspace adopted");
        self.state.send_replace(DataStatus::success(Some(tenant)));
        self.fetch_status.send_replace(Status::Success);
    }

    /// Drop the cached workspace (logout / tenant switch).
    pub fn destroy(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.fetch_status.send_replace(Status::Never);
        self.state.send_replace(DataStatus::never(None));
        debug!("tenant store destroyed");
    }
}
