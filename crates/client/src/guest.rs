//! Persisted guest-mode flag.
//!
//! The flag lives under a fixed key in a small JSON key/value file, has no
//! expiry and is cleared only by sign-in, sign-out or explicit guest exit.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value};

use crate::error::{ClientError, ClientResult};

/// Storage key of the guest flag.
pub const GUEST_MODE_KEY: &str = "folio.guest_mode";

/// File name of the key/value store inside the state directory.
pub const LOCAL_STORAGE_FILE: &str = "local_storage.json";

/// Where the guest flag is kept.
pub trait GuestFlagStore: Send + Sync {
    fn load(&self) -> ClientResult<bool>;

    fn store(&self, active: bool) -> ClientResult<()>;
}

/// Process-local flag; forgotten on exit.
#[derive(Debug, Default)]
pub struct MemoryGuestFlag(AtomicBool);

impl MemoryGuestFlag {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GuestFlagStore for MemoryGuestFlag {
    fn load(&self) -> ClientResult<bool> {
        Ok(self.0.load(Ordering::SeqCst))
    }

    fn store(&self, active: bool) -> ClientResult<()> {
        self.0.store(active, Ordering::SeqCst);
        Ok(())
    }
}

/// Flag stored in `<state_dir>/local_storage.json`, shared with any other
/// keys already in that file.
#[derive(Debug, Clone)]
pub struct FileGuestFlag {
    path: PathBuf,
}

impl FileGuestFlag {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(LOCAL_STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> ClientResult<Map<String, Value>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(storage_error(&self.path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&raw).map_err(|e| storage_error(&self.path, e))
    }
}

fn storage_error(path: &Path, err: impl std::fmt::Display) -> ClientError {
    ClientError::Storage(format!("{}: {err}", path.display()))
}

impl GuestFlagStore for FileGuestFlag {
    fn load(&self) -> ClientResult<bool> {
        let entries = self.read_entries()?;
        Ok(entries.get(GUEST_MODE_KEY).and_then(Value::as_bool).unwrap_or(false))
    }

    fn store(&self, active: bool) -> ClientResult<()> {
        let mut entries = self.read_entries()?;
        if active {
            entries.insert(GUEST_MODE_KEY.to_string(), Value::Bool(true));
        } else if entries.remove(GUEST_MODE_KEY).is_none() && !self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| storage_error(parent, e))?;
        }
        let body = serde_json::to_string_pretty(&entries).map_err(|e| storage_error(&self.path, e))?;
        std::fs::write(&self.path, body).map_err(|e| storage_error(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), active, "Guest flag stored");
        Ok(())
    }
}
