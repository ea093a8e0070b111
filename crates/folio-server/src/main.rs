//! Folio server binary.

use std::sync::Arc;

use anyhow::Context;
use folio_cache::{CacheStore, DataFacade};
use folio_server::{AppState, ContentService, LiveSettings, Settings, run_server_with_state};
use folio_store::{HealthMonitor, MemoryStore, RemoteStore, RetryingStore, load_seed, seed_if_empty};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    let addr = settings.socket_addr()?;

    info!("Starting Folio server v{}", env!("CARGO_PKG_VERSION"));

    let prometheus = folio_server::metrics::init_metrics()?;

    // Store en memoria con reintentos y estado de conexion
    let retrying = RetryingStore::new(MemoryStore::new("memory"), settings.retry_policy());
    let connection = retrying.state();
    let store: Arc<dyn RemoteStore> = Arc::new(retrying);

    if let Some(path) = &settings.seed.path {
        let seed = load_seed(path)
            .with_context(|| format!("failed to load seed data from {}", path.display()))?;
        let target = settings.seed_target()?;
        seed_if_empty(store.as_ref(), &target, seed)
            .await
            .context("failed to write seed data")?;
    }

    let monitor = HealthMonitor::new(
        Arc::clone(&store),
        Arc::clone(&connection),
        settings.monitor_config(),
    )
    .start();

    let facade_config = settings.facade_config();
    let cache = CacheStore::with_default_ttl(facade_config.default_ttl);
    let facade = DataFacade::new(store, cache, facade_config);

    let report = facade.preload(&settings.preload_paths()?).await;
    if !report.is_complete() {
        warn!(failed = report.failed.len(), "Starting with a partially warm cache");
    }

    let content = ContentService::new(facade.clone(), settings.admin_policy())
        .with_live_settings(LiveSettings {
            throttle: Some(settings.live_throttle()),
            trailing: settings.subscriptions.trailing,
        });
    if content.policy().is_empty() {
        warn!("No admin emails configured; admin endpoints will reject every caller");
    }

    let state = AppState::new(content, connection).with_keep_alive(settings.keep_alive());

    let served = run_server_with_state(addr, state, prometheus).await;

    monitor.stop();
    facade.shutdown();
    info!("Folio server stopped");

    served.context("server error")
}
