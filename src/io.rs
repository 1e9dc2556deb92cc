use crate::error::FetchError;
use crate::index::builder::RecordFetcher;
use crate::model::record::ZoneRecord;
use crate::parser::zone_file::parse_zone_file;
use crate::task::check::CheckConsistencyTask;
use crate::task::index::RebuildIndexTask;
use crate::task::Task;
use crate::AppState;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{error, info};

/// Reads zones from master files in a directory, one file per zone named
/// `<zone>.zone` or just `<zone>`.
pub struct ZoneDirectoryFetcher {
    directory: PathBuf,
}

impl ZoneDirectoryFetcher {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        ZoneDirectoryFetcher {
            directory: directory.into(),
        }
    }

    fn discover_zone_file(&self, zone: &str) -> Option<PathBuf> {
        let zone = zone.trim().trim_end_matches('.');

        [format!("{}.zone", zone), zone.to_string()]
            .into_iter()
            .map(|file_name| self.directory.join(file_name))
            .find(|path| path.is_file())
    }
}

impl RecordFetcher for ZoneDirectoryFetcher {
    fn fetch_zone(&self, zone: &str) -> Result<Vec<ZoneRecord>, FetchError> {
        let transfer_error = |detail: String| FetchError::Transfer {
            zone: zone.to_string(),
            detail,
        };

        let path = self
            .discover_zone_file(zone)
            .ok_or_else(|| transfer_error(format!("No zone file in {:?}", self.directory)))?;

        let content = fs::read_to_string(&path).map_err(|e| transfer_error(format!("Failed to read {:?}: {}", path, e)))?;

        let records = parse_zone_file(zone, &content)?;

        info!("[{}] Read {} relevant records from {:?}", zone, records.len(), path);

        Ok(records)
    }
}

pub fn zone_directory_exists(directory: &Path) -> bool {
    directory.is_dir()
}

pub async fn background_updater(state: AppState) {
    let update_interval = std::time::Duration::from_secs(state.config.update_interval_seconds.max(1));

    let tasks: Vec<Box<dyn Task>> = vec![
        Box::new(RebuildIndexTask::new(state.clone())),
        Box::new(CheckConsistencyTask::new(state.clone())),
    ];

    // The index is built once at startup, so the first rebuild waits a full interval.
    let start = tokio::time::Instant::now() + update_interval;
    let mut ticks = IntervalStream::new(tokio::time::interval_at(start, update_interval));

    while ticks.next().await.is_some() {
        for task in &tasks {
            info!("Running task: {}", task.name());

            if let Err(e) = task.run() {
                error!("Error running task '{}': {:?}", task.name(), e);
            } else {
                info!("Successfully completed task: {}", task.name());
            }
        }

        info!("Waiting for {:?} before next update.", update_interval);
    }
}
