//! Persistence of the encoded document between sessions.
//!
//! The editor writes its encoding after every committed change and reads it
//! back on start when no URL data is given. Stores hold a single snapshot.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Directory (under the platform data dir) and file name of the default
/// snapshot location.
pub const AUTOSAVE_NAMESPACE: &str = "fumen-editor";
pub const AUTOSAVE_KEY: &str = "autosave";

pub trait SnapshotStore {
    fn load(&self) -> anyhow::Result<Option<String>>;
    fn save(&mut self, data: &str) -> anyhow::Result<()>;
    fn clear(&mut self) -> anyhow::Result<()>;
}

/// In-process store, used by tests and by the CLI when auto-save is off.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    snapshot: Option<String>,
    pub saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(data: impl Into<String>) -> Self {
        Self {
            snapshot: Some(data.into()),
            saves: 0,
        }
    }

    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> anyhow::Result<Option<String>> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, data: &str) -> anyhow::Result<()> {
        self.snapshot = Some(data.to_string());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        self.snapshot = None;
        Ok(())
    }
}

/// Snapshot kept in a single file. Writes go through a sibling temp file and
/// a rename so a crash never leaves a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/fumen-editor/autosave`, when the platform has a data dir.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join(AUTOSAVE_NAMESPACE).join(AUTOSAVE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> anyhow::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => {
                let data = data.trim();
                Ok((!data.is_empty()).then(|| data.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("reading snapshot {}", self.path.display()))
            }
        }
    }

    fn save(&mut self, data: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("removing {}", self.path.display()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested").join(AUTOSAVE_KEY));
        assert_eq!(store.load().unwrap(), None);
        store.save("v115@vhAAgH").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("v115@vhAAgH"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn file_store_reports_unreadable_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read as text.
        let store = FileStore::new(dir.path());
        assert!(store.load().is_err());
    }

    #[test]
    fn memory_store_counts_saves() {
        let mut store = MemoryStore::new();
        store.save("a").unwrap();
        store.save("b").unwrap();
        assert_eq!(store.snapshot(), Some("b"));
        assert_eq!(store.saves, 2);
    }
}
