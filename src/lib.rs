pub mod cache;
pub mod error;
pub mod index;
pub mod io;
pub mod model;
pub mod parser;
pub mod task;

pub mod formatter;

use crate::index::ZoneIndex;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// The live index. Replaced whole on rebuild, never mutated in place.
    pub index: Arc<RwLock<Arc<ZoneIndex>>>,
    pub report: Arc<RwLock<ReportCache>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState {
            config: Arc::new(config),
            index: Arc::new(RwLock::new(Arc::new(ZoneIndex::new()))),
            report: Arc::new(RwLock::new(ReportCache::default())),
        }
    }

    /// A handle on the current index. The lock is only held for the clone.
    pub fn current_index(&self) -> anyhow::Result<Arc<ZoneIndex>> {
        let index = self.index.read().map_err(|_| anyhow!("Index lock poisoned"))?;

        Ok(Arc::clone(&index))
    }

    pub fn swap_index(&self, index: Arc<ZoneIndex>) -> anyhow::Result<()> {
        let mut current = self.index.write().map_err(|_| anyhow!("Index lock poisoned"))?;

        *current = index;

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new(AppConfig::default())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct AppConfig {
    pub listen_address: String,
    pub problems_endpoint: String,
    pub problems_json_endpoint: String,
    pub dump_endpoint: String,

    pub zone_directory: String,
    pub forward_zones: Vec<String>,
    pub reverse_zones: Vec<String>,

    pub update_interval_seconds: u64,

    pub cache_path: Option<String>,
    pub cache_max_age_seconds: u64,
    pub force_reload: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            listen_address: "0.0.0.0:8080".to_string(),
            problems_endpoint: "/problems.txt".to_string(),
            problems_json_endpoint: "/problems.json".to_string(),
            dump_endpoint: "/dump.txt".to_string(),

            zone_directory: "./zones".to_string(),
            forward_zones: Vec::new(),
            reverse_zones: Vec::new(),

            update_interval_seconds: 300,

            cache_path: Some("./zone-index.json".to_string()),
            cache_max_age_seconds: 300,
            force_reload: false,
        }
    }
}

pub struct ReportCache {
    pub text_content: String,
    pub json_content: String,
    pub last_updated: std::time::SystemTime,
}

impl Default for ReportCache {
    fn default() -> Self {
        ReportCache {
            text_content: String::new(),
            json_content: String::new(),
            last_updated: std::time::SystemTime::now(),
        }
    }
}
