//! Wiring & DI. Entry point: bootstrap adapters, build the stores, run UI.
//! No business logic here; workspace flows live in AppContext.

use dotenv::dotenv;
use event_board::adapters::http::{
    ApiClient, HttpCategoryApi, HttpEventApi, HttpParticipantApi, HttpTenantApi,
};
use event_board::adapters::memory::{
    InMemoryCategoryApi, InMemoryEventApi, InMemoryParticipantApi, InMemoryTenantApi,
};
use event_board::adapters::persistence::WorkspaceJson;
use event_board::adapters::ui::tui::TuiInputPort;
use event_board::ports::{InputPort, TokenSource, WorkspaceStoragePort};
use event_board::shared::config::{AppConfig, Backend};
use event_board::usecases::{AppContext, Backends, RemovePolicy, TokenStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    event_board::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });

    let data_path = PathBuf::from(cfg.data_dir_or_default());
    tokio::fs::create_dir_all(&data_path)
        .await
        .map_err(|e| anyhow::anyhow!("create data dir: {}", e))?;
    info!(path = %data_path.display(), "data directory");

    let storage = WorkspaceJson::new(data_path.join("workspaces.json"));
    storage.load().await.map_err(|e| anyhow::anyhow!("{}", e))?;
    let workspaces: Arc<dyn WorkspaceStoragePort> = Arc::new(storage);

    // --- Token store first: HTTP adapters read the credential from it at call time ---
    let tokens = Arc::new(TokenStore::new());
    let backends = match cfg.backend_or_default() {
        Backend::Http => {
            let url = cfg.base_api_url_or_default();
            info!(url = %url, timeout = ?cfg.request_timeout(), "using HTTP backend");
            let source: Arc<dyn TokenSource> = Arc::clone(&tokens) as Arc<dyn TokenSource>;
            let client = ApiClient::new(url, cfg.request_timeout(), source)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            Backends {
                tenants: Arc::new(HttpTenantApi::new(client.clone())),
                categories: Arc::new(HttpCategoryApi::new(client.clone())),
                events: Arc::new(HttpEventApi::new(client.clone())),
                participants: Arc::new(HttpParticipantApi::new(client)),
                workspaces,
            }
        }
        Backend::Memory => {
            warn!("using in-memory backend; nothing is sent to a server or kept after exit");
            Backends {
                tenants: Arc::new(InMemoryTenantApi::new()),
                categories: Arc::new(InMemoryCategoryApi::new("category")),
                events: Arc::new(InMemoryEventApi::new("event")),
                participants: Arc::new(InMemoryParticipantApi::new("participant")),
                workspaces,
            }
        }
    };

    let remove_policy = RemovePolicy::from_prune_flag(cfg.prune_on_failed_remove_or_default());
    let ctx = Arc::new(AppContext::new(tokens, backends, remove_policy));

    // --- Startup workspace: explicit token wins over a saved tag ---
    if let Some(token) = cfg.startup_token() {
        match ctx.open_workspace(token).await {
            Ok(tenant) => info!(tag = %tenant.tag, "startup workspace opened"),
            Err(e) => warn!(error = %e, "could not open startup token"),
        }
    } else if let Some(tag) = cfg.workspace_tag.as_deref() {
        match ctx.restore_workspace(tag).await {
            Ok(tenant) => info!(tag = %tenant.tag, "saved workspace restored"),
            Err(e) => warn!(error = %e, "could not restore saved workspace"),
        }
    }

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(Arc::clone(&ctx)));
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
