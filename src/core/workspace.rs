//! Workspace discovery and structure
//!
//! A workspace is a directory containing `.pb/` with the inventory database,
//! the settings file, and the backup directory.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the workspace marker directory
const PB_DIR: &str = ".pb";

/// Database file name within `.pb/`
const DB_FILE: &str = "inventory.db";

/// Settings file name within `.pb/`
const SETTINGS_FILE: &str = "settings.json";

/// Backup directory name within `.pb/`
const BACKUP_DIR: &str = "backups";

/// Represents a partsbench workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .pb/)
    root: PathBuf,
}

impl Workspace {
    /// Find workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(PB_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open the workspace at an explicit root (no upward search)
    pub fn at(root: &Path) -> Result<Self, WorkspaceError> {
        if !root.join(PB_DIR).is_dir() {
            return Err(WorkspaceError::NotFound {
                searched_from: root.to_path_buf(),
            });
        }
        let root = root
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Ok(Self { root })
    }

    /// Create a new workspace structure at the given path
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let pb_dir = root.join(PB_DIR);
        if pb_dir.exists() {
            return Err(WorkspaceError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(pb_dir.join(BACKUP_DIR))
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .pb configuration directory
    pub fn pb_dir(&self) -> PathBuf {
        self.root.join(PB_DIR)
    }

    /// Path to the inventory database
    pub fn db_path(&self) -> PathBuf {
        self.pb_dir().join(DB_FILE)
    }

    /// Path to the settings file
    pub fn settings_path(&self) -> PathBuf {
        self.pb_dir().join(SETTINGS_FILE)
    }

    /// Path to the backup directory
    pub fn backup_dir(&self) -> PathBuf {
        self.pb_dir().join(BACKUP_DIR)
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a partsbench workspace (searched from {searched_from:?}). Run 'pb init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("partsbench workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
