//! Resolving every pointer file under a directory.

use crate::error::{BinError, BinResult, ResultExt};
use crate::pointer::is_pointer_path;
use crate::store::ObjectStore;
use crate::sync_engine::{GetOutcome, SyncEngine};
use std::fs::{self, DirEntry};
use std::io;
use std::path::Path;
use tracing::debug;

/// Per-outcome counts for a directory sync.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub up_to_date: usize,
    pub updated: usize,
    pub downloaded: usize,
}

impl BatchSummary {
    /// Number of pointer files resolved.
    pub fn total(&self) -> usize {
        self.up_to_date + self.updated + self.downloaded
    }

    fn record(&mut self, outcome: GetOutcome) {
        match outcome {
            GetOutcome::UpToDate => self.up_to_date += 1,
            GetOutcome::Updated => self.updated += 1,
            GetOutcome::Downloaded => self.downloaded += 1,
        }
    }
}

impl<S: ObjectStore> SyncEngine<S> {
    /// Runs [`SyncEngine::get`] on every `.sha1` file under `root`.
    ///
    /// Pointers in a directory are resolved in file-name order before its
    /// subdirectories are entered, also in name order. Symlinked directories
    /// are not followed. The first failure stops the walk; pointers already
    /// resolved stay resolved.
    pub fn get_dir(&self, root: &Path) -> BinResult<BatchSummary> {
        self.walk(root)
            .with_context(|| format!("get-dir {}", root.display()))
    }

    fn walk(&self, root: &Path) -> BinResult<BatchSummary> {
        let mut summary = BatchSummary::default();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            debug!("scanning {}", dir.display());
            let mut subdirs = Vec::new();

            for entry in sorted_entries(&dir)? {
                let path = entry.path();
                let file_type = entry.file_type().map_err(|source| BinError::Read {
                    path: path.clone(),
                    source,
                })?;

                if file_type.is_dir() {
                    subdirs.push(path);
                } else if is_pointer_path(&path) {
                    summary.record(self.get(&path)?);
                }
            }

            // popped from the back, so reverse to keep name order
            pending.extend(subdirs.into_iter().rev());
        }

        Ok(summary)
    }
}

fn sorted_entries(dir: &Path) -> BinResult<Vec<DirEntry>> {
    let read_err = |source| BinError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(read_err)?
        .collect::<io::Result<Vec<_>>>()
        .map_err(read_err)?;
    entries.sort_by_key(DirEntry::file_name);
    Ok(entries)
}
