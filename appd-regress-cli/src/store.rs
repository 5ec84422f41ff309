//! File-backed history of build reports.
//!
//! Each evaluated build is stored as `build-{id}.json` holding a
//! [`BuildReport`]. Reads go through a bounded [`ReportCache`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use appd_regress::{BuildReport, Report, ReportCache};

const FILE_PREFIX: &str = "build-";
const FILE_SUFFIX: &str = ".json";

pub struct HistoryStore {
    dir: PathBuf,
    cache: ReportCache,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: ReportCache::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, build_id: u64) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{build_id}{FILE_SUFFIX}"))
    }

    /// Ids of all stored builds in ascending order.
    ///
    /// A missing directory is an empty history.
    pub fn build_ids(&self) -> Result<Vec<u64>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read history directory '{}'", self.dir.display()))?
        {
            let name = entry?.file_name();
            let id = name
                .to_str()
                .and_then(|n| n.strip_prefix(FILE_PREFIX))
                .and_then(|n| n.strip_suffix(FILE_SUFFIX))
                .and_then(|n| n.parse::<u64>().ok());
            if let Some(id) = id {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Loads the report of `build_id`, `None` if it was never stored.
    pub fn load(&self, build_id: u64) -> Result<Option<Arc<Report>>> {
        self.cache.get_or_try_load(build_id, || -> Result<Option<Report>> {
            let path = self.path_for(build_id);
            if !path.exists() {
                return Ok(None);
            }
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            let stored: BuildReport = serde_json::from_str(&content)
                .with_context(|| format!("Corrupt report file '{}'", path.display()))?;
            Ok(Some(stored.report))
        })
    }

    /// All stored builds except `exclude`, in build order.
    pub fn history(&self, exclude: Option<u64>) -> Result<Vec<(u64, Arc<Report>)>> {
        let mut history = Vec::new();
        for id in self.build_ids()? {
            if Some(id) == exclude {
                continue;
            }
            if let Some(report) = self.load(id)? {
                history.push((id, report));
            }
        }
        Ok(history)
    }

    /// Writes a report as pretty JSON, replacing an earlier one for the same build.
    pub fn save(&self, build_id: u64, report: &Report) -> Result<PathBuf> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir).with_context(|| {
                format!("Failed to create history directory '{}'", self.dir.display())
            })?;
        }
        let stored = BuildReport::new(build_id, report.clone());
        let json = serde_json::to_string_pretty(&stored)?;
        let path = self.path_for(build_id);
        std::fs::write(&path, json).with_context(|| format!("Failed to write '{}'", path.display()))?;
        self.cache.invalidate(build_id);
        Ok(path)
    }
}
