//! Durable storage for the single save slot.
//!
//! Stores deal in raw bytes; encoding is the codec's job. A session keeps
//! one slot, overwritten at every checkpoint and deleted on restart or once
//! the game is won.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::codec::SaveFormat;
use super::error::{StoreError, StoreResult};

/// Base name of the save file.
pub const SAVE_FILE_STEM: &str = "gamesave";

/// Repository for the save slot.
pub trait SaveStore: Send + Sync {
    /// Overwrite the slot.
    fn save(&self, bytes: &[u8]) -> StoreResult<()>;

    /// Read the slot. `None` when nothing is saved.
    fn load(&self) -> StoreResult<Option<Vec<u8>>>;

    /// Check if the slot holds data.
    fn exists(&self) -> bool;

    /// Empty the slot. Deleting an empty slot is not an error.
    fn delete(&self) -> StoreResult<()>;
}

/// File-backed slot.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write never leaves a torn save behind.
#[derive(Clone, Debug)]
pub struct FileSaveStore {
    path: PathBuf,
}

impl FileSaveStore {
    /// Store `gamesave.<ext>` inside `dir`, creating the directory.
    pub fn new(dir: impl AsRef<Path>, format: SaveFormat) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(format!("{}.{}", SAVE_FILE_STEM, format.extension())),
        })
    }

    /// Store in the platform's per-user data directory.
    pub fn in_default_location(format: SaveFormat) -> StoreResult<Self> {
        let dirs = directories::ProjectDirs::from("", "", "memory-match")
            .ok_or(StoreError::NoDataDirectory)?;
        Self::new(dirs.data_dir(), format)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStore for FileSaveStore {
    fn save(&self, bytes: &[u8]) -> StoreResult<()> {
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Saved game to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        if !self.path.exists() {
            tracing::debug!("No save file at {}", self.path.display());
            return Ok(None);
        }

        let bytes = fs::read(&self.path)?;
        tracing::debug!("Loaded game from {}", self.path.display());
        Ok(Some(bytes))
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn delete(&self) -> StoreResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            tracing::debug!("Deleted save file {}", self.path.display());
        }
        Ok(())
    }
}

/// In-memory slot, for tests and hosts without a filesystem.
#[derive(Debug, Default)]
pub struct MemorySaveStore {
    slot: Mutex<Option<Vec<u8>>>,
}

impl MemorySaveStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `bytes`.
    #[must_use]
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            slot: Mutex::new(Some(bytes)),
        }
    }
}

impl SaveStore for MemorySaveStore {
    fn save(&self, bytes: &[u8]) -> StoreResult<()> {
        let mut slot = self.slot.lock().map_err(|_| StoreError::LockPoisoned)?;
        *slot = Some(bytes.to_vec());
        Ok(())
    }

    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        let slot = self.slot.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(slot.clone())
    }

    fn exists(&self) -> bool {
        self.slot.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    fn delete(&self) -> StoreResult<()> {
        let mut slot = self.slot.lock().map_err(|_| StoreError::LockPoisoned)?;
        *slot = None;
        Ok(())
    }
}

impl<T: SaveStore + ?Sized> SaveStore for Box<T> {
    fn save(&self, bytes: &[u8]) -> StoreResult<()> {
        (**self).save(bytes)
    }

    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        (**self).load()
    }

    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn delete(&self) -> StoreResult<()> {
        (**self).delete()
    }
}
