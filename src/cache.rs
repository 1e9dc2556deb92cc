use crate::index::ZoneIndex;
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A built index persisted as JSON, considered fresh for `max_age` after
/// its build time.
pub struct IndexCache {
    path: PathBuf,
    max_age: Duration,
}

impl IndexCache {
    pub fn new(path: impl Into<PathBuf>, max_age: Duration) -> Self {
        IndexCache {
            path: path.into(),
            max_age,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_fresh(&self, index: &ZoneIndex, now: DateTime<Utc>) -> bool {
        index.age(now) <= self.max_age
    }

    /// Writes through a temporary file so readers never see a partial cache.
    pub fn store(&self, index: &ZoneIndex) -> anyhow::Result<()> {
        let json = serde_json::to_string(index).context("Failed to serialize zone index")?;

        let temp_path = self.path.with_extension("tmp");

        fs::write(&temp_path, json).with_context(|| format!("Failed to write cache file {:?}", temp_path))?;
        fs::rename(&temp_path, &self.path).with_context(|| format!("Failed to move cache file into place at {:?}", self.path))?;

        info!("Stored index built at {} to {:?}", index.built_at, self.path);

        Ok(())
    }

    /// Reads the cached index regardless of age.
    pub fn load(&self) -> anyhow::Result<ZoneIndex> {
        let file = fs::File::open(&self.path).with_context(|| format!("Failed to open cache file {:?}", self.path))?;

        let index = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse cache file {:?}", self.path))?;

        Ok(index)
    }

    /// The cached index if it exists, parses and is not older than `max_age`.
    pub fn load_fresh(&self, now: DateTime<Utc>) -> Option<ZoneIndex> {
        if !self.path.exists() {
            info!("Cache file {:?} does not exist.", self.path);
            return None;
        }

        let index = match self.load() {
            Ok(index) => index,
            Err(e) => {
                warn!("Ignoring unreadable cache: {:?}", e);
                return None;
            }
        };

        if self.is_fresh(&index, now) {
            info!("Using cached index built at {}", index.built_at);
            Some(index)
        } else {
            info!("Cached index built at {} is older than {}s, refreshing.", index.built_at, self.max_age.num_seconds());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("zone-analyzer-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_store_and_load_fresh() {
        let path = temp_cache_path("fresh");
        let cache = IndexCache::new(&path, Duration::minutes(5));

        let mut index = ZoneIndex::new();
        index.a_records.append("host1.example.com", "192.0.2.10");
        index.known_domains.insert("example.com".to_string());

        cache.store(&index).unwrap();

        let loaded = cache.load_fresh(index.built_at + Duration::minutes(1));
        assert_eq!(loaded, Some(index.clone()));

        let stale = cache.load_fresh(index.built_at + Duration::minutes(6));
        assert_eq!(stale, None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_cache() {
        let cache = IndexCache::new(temp_cache_path("missing"), Duration::minutes(5));

        assert_eq!(cache.load_fresh(Utc::now()), None);
        assert!(cache.load().is_err());
    }

    #[test]
    fn test_corrupt_cache_is_ignored() {
        let path = temp_cache_path("corrupt");
        fs::write(&path, "{not json").unwrap();

        let cache = IndexCache::new(&path, Duration::minutes(5));
        assert_eq!(cache.load_fresh(Utc::now()), None);

        fs::remove_file(&path).unwrap();
    }
}
