//! Durable key/value storage for session state
//!
//! The credential store mirrors the signed-in user here so a session survives
//! a process restart. Values are opaque strings; callers own the encoding.

use crate::{CoreError, CoreResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key under which the serialized user record is stored
pub const USER_KEY: &str = "user";

/// Key under which clients may keep the backend cookie header
pub const SESSION_COOKIE_KEY: &str = "session_cookie";

pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> CoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;
    fn remove(&self, key: &str) -> CoreResult<()>;
}

/// Process-local storage, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// One file per key inside a directory
///
/// The directory is created on first write. Keys are restricted to ASCII
/// alphanumerics, `_` and `-` so they always map to a plain file name.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> CoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CoreError::storage_error(format!(
                "invalid storage key: {key:?}"
            )));
        }
        Ok(self.dir.join(key))
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
