//! DiscoveryWriter — atomic regeneration of per-exporter discovery files.
//!
//! The file for exporter `E` is always the full projection of the store's
//! current `(E, zone)` set, serialized as a pretty-printed JSON array of
//! target groups. An empty set writes `[]` rather than deleting the file,
//! so the scraper sees "no targets" instead of a stale list.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use promgrid_core::TargetGroup;
use promgrid_state::TargetStore;

use crate::error::{DiscoveryError, DiscoveryResult};

/// Writes discovery files under a fixed base directory.
#[derive(Debug, Clone)]
pub struct DiscoveryWriter {
    base_dir: PathBuf,
}

impl DiscoveryWriter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Destination path for one exporter's file.
    pub fn file_path(&self, exporter: &str) -> PathBuf {
        self.base_dir.join(format!("{exporter}.json"))
    }

    /// The exporter names the output file, so it must be a single normal
    /// path component.
    pub fn validate_exporter(exporter: &str) -> DiscoveryResult<()> {
        let ok = !exporter.is_empty()
            && exporter != "."
            && exporter != ".."
            && !exporter.contains(['/', '\\']);
        if ok {
            Ok(())
        } else {
            Err(DiscoveryError::InvalidExporter(exporter.to_string()))
        }
    }

    /// Re-derive the `(exporter, zone)` set from the store and atomically
    /// replace the exporter's file with its projection.
    pub fn project(
        &self,
        store: &TargetStore,
        exporter: &str,
        zone: &str,
    ) -> DiscoveryResult<PathBuf> {
        Self::validate_exporter(exporter)?;
        let groups: Vec<TargetGroup> = store
            .find(exporter, zone)?
            .into_iter()
            .map(TargetGroup::from)
            .collect();
        self.write_groups(exporter, &groups)
    }

    /// Serialize groups and replace the destination file.
    ///
    /// Writes into a temporary file in the same directory, forces it to
    /// storage, then renames over the destination, so a reader never
    /// observes a partial file. The temp file cleans itself up on any
    /// failure path.
    fn write_groups(&self, exporter: &str, groups: &[TargetGroup]) -> DiscoveryResult<PathBuf> {
        let path = self.file_path(exporter);
        let json = serde_json::to_vec_pretty(groups)?;

        let io_err = |source| DiscoveryError::Io {
            path: path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.base_dir).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| DiscoveryError::Persist {
            path: path.clone(),
            source: e.error,
        })?;

        debug!(%exporter, groups = groups.len(), path = %path.display(), "discovery file written");
        Ok(path)
    }
}
