use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use trust_score::admin::{
    ConfigChangeManager, ConfigStore, InMemoryConfigStore, JsonFileConfigStore,
};
use trust_score::config::StorageConfig;
use trust_score::error::AppError;
use trust_score::evaluation::ScoringConfig;
use trust_score::metrics::{CsvMetricsCatalog, InMemoryMetricsProvider, MetricsProvider};
use trust_score::TrustScoreService;

pub(crate) type AppService = TrustScoreService<dyn ConfigStore, dyn MetricsProvider>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// JSON ledger when a path is configured, otherwise process memory.
pub(crate) fn config_store(storage: &StorageConfig) -> Arc<dyn ConfigStore> {
    match &storage.config_ledger {
        Some(path) => {
            info!(path = %path.display(), "persisting scoring config ledger");
            Arc::new(JsonFileConfigStore::new(path))
        }
        None => Arc::new(InMemoryConfigStore::default()),
    }
}

/// CSV catalog when a path is configured, otherwise an empty provider.
pub(crate) fn metrics_provider(storage: &StorageConfig) -> Result<Arc<dyn MetricsProvider>, AppError> {
    match &storage.metrics_catalog {
        Some(path) => {
            let catalog = CsvMetricsCatalog::from_path(path)?;
            info!(path = %path.display(), videos = catalog.len(), "metrics catalog loaded");
            Ok(Arc::new(catalog))
        }
        None => Ok(Arc::new(InMemoryMetricsProvider::default())),
    }
}

pub(crate) fn config_manager(
    storage: &StorageConfig,
) -> Result<Arc<ConfigChangeManager<dyn ConfigStore>>, AppError> {
    let manager = ConfigChangeManager::bootstrap(ScoringConfig::default(), config_store(storage))?;
    Ok(Arc::new(manager))
}

pub(crate) fn build_service(
    storage: &StorageConfig,
    provider: Arc<dyn MetricsProvider>,
) -> Result<Arc<AppService>, AppError> {
    let manager = config_manager(storage)?;
    Ok(Arc::new(TrustScoreService::new(manager, provider)))
}
