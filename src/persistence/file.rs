//! JSON file stats store

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{StatsStore, decode_stats};
use crate::error::StoreError;
use crate::stats::LocalStats;

/// Stats saved as pretty JSON at a fixed path
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so a
/// crash mid-write leaves the previous save intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl StatsStore for JsonFileStore {
    fn load(&self) -> LocalStats {
        match fs::read_to_string(&self.path) {
            Ok(json) => decode_stats(&json),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No stats found, starting fresh");
                LocalStats::new()
            }
            Err(e) => {
                log::warn!("Could not read {}: {}", self.path.display(), e);
                LocalStats::new()
            }
        }
    }

    fn save(&mut self, stats: &LocalStats) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string_pretty(stats)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::info!("Stats saved ({} games)", stats.total_games);
        Ok(())
    }
}
