use crate::cache::IndexCache;
use crate::index::builder::{build_index, build_index_concurrent};
use crate::index::ZoneIndex;
use crate::io::{zone_directory_exists, ZoneDirectoryFetcher};
use crate::task::Task;
use crate::{AppConfig, AppState};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

fn index_cache(config: &AppConfig) -> Option<IndexCache> {
    config
        .cache_path
        .as_ref()
        .map(|path| IndexCache::new(path, chrono::Duration::seconds(config.cache_max_age_seconds as i64)))
}

fn store_index(config: &AppConfig, index: &ZoneIndex) {
    if let Some(cache) = index_cache(config)
        && let Err(e) = cache.store(index)
    {
        error!("Failed to store index to cache {:?}: {:?}", cache.path(), e);
    }
}

fn warn_missing_directory(config: &AppConfig) {
    let zone_directory = Path::new(&config.zone_directory);

    if !zone_directory_exists(zone_directory) {
        warn!("Zone directory {:?} does not exist. Every zone will be skipped.", zone_directory);
    }
}

/// The index to serve at startup: a fresh cache unless a reload is forced,
/// otherwise a concurrent build from the zone directory.
pub async fn load_initial_index(config: &AppConfig) -> ZoneIndex {
    if !config.force_reload
        && let Some(index) = index_cache(config).and_then(|cache| cache.load_fresh(Utc::now()))
    {
        return index;
    }

    warn_missing_directory(config);

    let fetcher = Arc::new(ZoneDirectoryFetcher::new(&config.zone_directory));
    let index = build_index_concurrent(&config.forward_zones, &config.reverse_zones, fetcher).await;

    store_index(config, &index);

    index
}

/// Rebuilds the index from the zone directory and swaps it into the state.
pub struct RebuildIndexTask {
    app_state: AppState,
}

impl RebuildIndexTask {
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }
}

impl Task for RebuildIndexTask {
    fn name(&self) -> &str {
        "Rebuild Zone Index"
    }

    fn run(&self) -> anyhow::Result<()> {
        let config = &self.app_state.config;

        warn_missing_directory(config);

        let fetcher = ZoneDirectoryFetcher::new(&config.zone_directory);
        let index = build_index(&config.forward_zones, &config.reverse_zones, &fetcher);

        store_index(config, &index);

        info!("Swapping in index built at {}", index.built_at);

        self.app_state.swap_index(Arc::new(index))
    }
}
