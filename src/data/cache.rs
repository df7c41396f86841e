use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::DataError;
use super::loader;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Dataset cache keyed by file identity
// ---------------------------------------------------------------------------

/// Identity of an input file: a changed size or mtime means a new version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileStamp {
    pub fn of(path: &Path) -> Result<Self, DataError> {
        let source_err = |source| DataError::DataSource {
            path: path.to_path_buf(),
            source,
        };
        let meta = std::fs::metadata(path).map_err(source_err)?;
        let canonical = std::fs::canonicalize(path).map_err(source_err)?;
        Ok(FileStamp {
            path: canonical,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Holds the most recently loaded dataset until its file changes or the
/// caller invalidates it.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(FileStamp, Arc<Dataset>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset if `path` still has the same stamp,
    /// otherwise load it again.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>, DataError> {
        let stamp = FileStamp::of(path)?;
        if let Some((cached, dataset)) = &self.entry {
            if *cached == stamp {
                log::debug!("Reusing cached dataset for {}", path.display());
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = Arc::new(loader::load_file(path)?);
        self.entry = Some((stamp, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Forget the cached dataset; the next call reloads from disk.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn stamp(&self) -> Option<&FileStamp> {
        self.entry.as_ref().map(|(stamp, _)| stamp)
    }
}
