//! Remembers the last entered server address across runs.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const ADDRESS_FILE_NAME: &str = "address.json";

pub trait AddressStore {
    fn load(&self) -> anyhow::Result<Option<String>>;
    fn save(&mut self, address: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredAddress {
    address: String,
}

#[derive(Debug, Clone)]
pub struct FileAddressStore {
    path: PathBuf,
}

impl FileAddressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(ADDRESS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AddressStore for FileAddressStore {
    fn load(&self) -> anyhow::Result<Option<String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read '{}'", self.path.display()))
            }
        };
        let stored: StoredAddress = serde_json::from_str(&raw)
            .with_context(|| format!("invalid address file '{}'", self.path.display()))?;
        Ok(Some(stored.address))
    }

    fn save(&mut self, address: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create state directory '{}'", parent.display())
            })?;
        }
        let body = serde_json::to_string(&StoredAddress {
            address: address.to_string(),
        })?;
        fs::write(&self.path, body)
            .with_context(|| format!("failed to write '{}'", self.path.display()))
    }
}

/// Mirrors the address input into a store, one write per tick at most.
pub struct AddressMirror<S: AddressStore> {
    store: S,
    fallback: String,
    pending: Option<String>,
    saved: Option<String>,
}

impl<S: AddressStore> AddressMirror<S> {
    pub fn new(store: S, fallback: impl Into<String>) -> Self {
        Self {
            store,
            fallback: fallback.into(),
            pending: None,
            saved: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stored address, or the fallback when nothing usable was stored.
    pub fn restore(&mut self) -> String {
        match self.store.load() {
            Ok(Some(address)) if !address.trim().is_empty() => {
                self.saved = Some(address.clone());
                address
            }
            Ok(_) => self.fallback.clone(),
            Err(err) => {
                warn!("could not restore remembered address: {err:#}");
                self.fallback.clone()
            }
        }
    }

    pub fn edit(&mut self, address: &str) {
        self.pending = Some(address.to_string());
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Writes the latest edit if it differs from what is stored.
    pub fn flush(&mut self) -> bool {
        let Some(address) = self.pending.take() else {
            return false;
        };
        if self.saved.as_deref() == Some(address.as_str()) {
            return false;
        }
        match self.store.save(&address) {
            Ok(()) => {
                debug!(address = %address, "remembered address");
                self.saved = Some(address);
                true
            }
            Err(err) => {
                warn!("could not remember address: {err:#}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[derive(Clone, Default)]
    struct MemoryStore {
        stored: Rc<RefCell<Option<String>>>,
        writes: Rc<RefCell<usize>>,
    }

    impl AddressStore for MemoryStore {
        fn load(&self) -> anyhow::Result<Option<String>> {
            Ok(self.stored.borrow().clone())
        }

        fn save(&mut self, address: &str) -> anyhow::Result<()> {
            *self.stored.borrow_mut() = Some(address.to_string());
            *self.writes.borrow_mut() += 1;
            Ok(())
        }
    }

    #[test]
    fn restores_fallback_when_nothing_is_stored() {
        let mut mirror = AddressMirror::new(MemoryStore::default(), "wss://echo.websocket.org/");
        assert_eq!(mirror.restore(), "wss://echo.websocket.org/");
    }

    #[test]
    fn coalesces_keystrokes_into_one_write_per_flush() {
        let store = MemoryStore::default();
        let mut mirror = AddressMirror::new(store.clone(), "wss://echo.websocket.org/");

        for partial in ["w", "ws", "ws:", "ws://", "ws://localhost:9"] {
            mirror.edit(partial);
        }
        assert_eq!(*store.writes.borrow(), 0);

        assert!(mirror.flush());
        assert!(!mirror.flush());
        assert_eq!(*store.writes.borrow(), 1);
        assert_eq!(store.stored.borrow().as_deref(), Some("ws://localhost:9"));

        mirror.edit("ws://localhost:9");
        assert!(!mirror.flush());
        assert_eq!(*store.writes.borrow(), 1);
    }

    #[test]
    fn file_store_round_trips_through_a_fresh_mirror() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileAddressStore::in_dir(&dir.path().join("nested"));

        let mut mirror = AddressMirror::new(store.clone(), "wss://fallback/");
        mirror.edit("wss://example.com/feed");
        assert!(mirror.flush());

        let mut reopened = AddressMirror::new(store, "wss://fallback/");
        assert_eq!(reopened.restore(), "wss://example.com/feed");
    }

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileAddressStore::in_dir(dir.path());
        fs::write(store.path(), "not json").expect("write");

        assert!(store.load().is_err());
        let mut mirror = AddressMirror::new(store, "wss://fallback/");
        assert_eq!(mirror.restore(), "wss://fallback/");
    }
}
