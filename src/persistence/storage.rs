use super::files::{atomic_write, read_file, state_file};
use anyhow::Result;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Storage backend for the serialized state slot.
///
/// The store writes the complete payload after every mutation and reads it
/// once at startup, so backends only need whole-document load/save.
pub trait StateStorage {
    /// Read the slot. `None` means the slot has never been written.
    fn load(&self) -> Result<Option<String>>;
    /// Replace the slot with a complete payload.
    fn save(&mut self, payload: &str) -> Result<()>;
}

/// File-backed slot with atomic writes (temp file + rename)
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Slot at state.json inside the resolved data directory
    pub fn in_data_dir() -> Result<Self> {
        Ok(Self::new(state_file()?))
    }
}

impl StateStorage for FileStorage {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        read_file(&self.path).map(Some)
    }

    fn save(&mut self, payload: &str) -> Result<()> {
        atomic_write(&self.path, payload)
    }
}

#[derive(Default)]
struct MemoryInner {
    slot: Option<String>,
    save_count: usize,
    fail_saves: bool,
}

/// In-memory slot, shared through cheap clones so a test can hand the store
/// one handle and keep another for inspection
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current slot payload, if any save succeeded
    pub fn payload(&self) -> Option<String> {
        self.inner.borrow().slot.clone()
    }

    /// How many saves have been accepted
    pub fn save_count(&self) -> usize {
        self.inner.borrow().save_count
    }

    /// Make subsequent saves fail, to exercise persistence-failure paths
    pub fn set_fail_saves(&self, fail: bool) {
        self.inner.borrow_mut().fail_saves = fail;
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.inner.borrow().slot.clone())
    }

    fn save(&mut self, payload: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_saves {
            anyhow::bail!("storage medium unavailable");
        }
        inner.slot = Some(payload.to_string());
        inner.save_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(temp_dir.path().join("state.json"));

        assert!(storage.load().unwrap().is_none());

        storage.save("{\"todos\":[]}").unwrap();
        assert_eq!(storage.load().unwrap().unwrap(), "{\"todos\":[]}");

        storage.save("{\"todos\":[1]}").unwrap();
        assert_eq!(storage.load().unwrap().unwrap(), "{\"todos\":[1]}");
    }

    #[test]
    fn test_memory_storage_counts_saves() {
        let storage = MemoryStorage::new();
        let mut handle = storage.clone();

        handle.save("one").unwrap();
        handle.save("two").unwrap();

        assert_eq!(storage.save_count(), 2);
        assert_eq!(storage.payload().unwrap(), "two");
    }

    #[test]
    fn test_memory_storage_failure_keeps_old_payload() {
        let storage = MemoryStorage::new();
        let mut handle = storage.clone();

        handle.save("good").unwrap();
        storage.set_fail_saves(true);
        assert!(handle.save("bad").is_err());

        assert_eq!(storage.payload().unwrap(), "good");
        assert_eq!(storage.save_count(), 1);
    }
}
