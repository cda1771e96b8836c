//! Platform-specific state directory management

use crate::{DaemonError, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Where the CLI keeps the persisted session
#[derive(Debug, Clone)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    /// Platform data directory, e.g. `~/.local/share/starlight` on Linux
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from("com", "Starlight ERP", "starlight")
            .ok_or(DaemonError::PlatformDirsNotFound)?;
        Ok(Self {
            root: project_dirs.data_dir().to_path_buf(),
        })
    }

    /// Use `path` instead of the platform directory
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    /// Resolve from an optional configured override
    pub fn resolve(configured: Option<&PathBuf>) -> Result<Self> {
        match configured {
            Some(path) => Ok(Self::with_override(path)),
            None => Self::new(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Directory holding the persisted user and session cookie
    pub fn session_dir(&self) -> PathBuf {
        let dir = self.root.join("session");
        debug!("Using session directory: {}", dir.display());
        dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_directory() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = StateDir::with_override(temp_dir.path());

        assert_eq!(state_dir.root(), &temp_dir.path().to_path_buf());
        assert_eq!(state_dir.session_dir(), temp_dir.path().join("session"));
    }

    #[test]
    fn test_resolve_prefers_configured_path() {
        let temp_dir = TempDir::new().unwrap();
        let configured = temp_dir.path().to_path_buf();
        let state_dir = StateDir::resolve(Some(&configured)).unwrap();

        assert_eq!(state_dir.root(), &configured);
    }
}
