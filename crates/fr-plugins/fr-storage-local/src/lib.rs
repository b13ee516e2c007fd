//! # fr-storage-local
//! food-rescue/crates/fr-plugins/fr-storage-local/src/lib.rs
//! Local filesystem implementation of `StateStorage`.
//! The whole store lives in one JSON file, replaced atomically on every save.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fr_core::error::Result;
use fr_core::traits::StateStorage;
use tracing::debug;

pub const DEFAULT_FILE_NAME: &str = "food-rescue-data.json";

pub struct LocalFileStorage {
    /// Directory holding the state file (e.g., "./data"). Created on first save.
    root_path: PathBuf,
    file_name: String,
}

impl LocalFileStorage {
    pub fn new(root: PathBuf, file_name: impl Into<String>) -> Self {
        Self {
            root_path: root,
            file_name: file_name.into(),
        }
    }

    /// Uses [`DEFAULT_FILE_NAME`] inside `root`.
    pub fn in_dir(root: PathBuf) -> Self {
        Self::new(root, DEFAULT_FILE_NAME)
    }

    pub fn path(&self) -> PathBuf {
        self.root_path.join(&self.file_name)
    }

    /// Sibling file the next document is written to before the rename.
    fn staging_path(&self) -> PathBuf {
        self.root_path.join(format!(".{}.tmp", self.file_name))
    }
}

impl StateStorage for LocalFileStorage {
    fn load(&self) -> Result<Option<String>> {
        let path = self.path();
        match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!(path = %path.display(), bytes = contents.len(), "read state file");
                Ok(Some(contents))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes to a staging file, syncs it, then renames it over the state file
    /// so a crash never leaves a truncated document behind.
    fn save(&self, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.root_path)?;

        let staging = self.staging_path();
        write_synced(&staging, contents)?;
        fs::rename(&staging, self.path())?;

        debug!(path = %self.path().display(), bytes = contents.len(), "wrote state file");
        Ok(())
    }
}

fn write_synced(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}
