//! Database backup and restore
//!
//! Backups are timestamped copies of the database file in `.pb/backups/`.
//! Retention keeps the 10 most recent copies.

use chrono::Local;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::Workspace;

/// Number of backup files kept by retention
const RETAIN_COUNT: usize = 10;

/// Errors from backup and restore operations
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("no database to back up at {0:?}")]
    NoDatabase(PathBuf),

    #[error("backup file not found: {0:?}")]
    BackupNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Copy the database into the backup directory and prune old copies.
///
/// Returns the path of the new backup file.
pub fn create_backup(workspace: &Workspace) -> Result<PathBuf, BackupError> {
    let db_path = workspace.db_path();
    if !db_path.exists() {
        return Err(BackupError::NoDatabase(db_path));
    }

    let backup_dir = workspace.backup_dir();
    std::fs::create_dir_all(&backup_dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = backup_dir.join(format!("inventory_{}.db", timestamp));
    std::fs::copy(&db_path, &backup_path)?;

    prune_backups(&backup_dir)?;

    Ok(backup_path)
}

/// List backup files, newest first
pub fn list_backups(workspace: &Workspace) -> Result<Vec<PathBuf>, BackupError> {
    let mut backups = collect_backups(&workspace.backup_dir())?;
    backups.reverse();
    Ok(backups)
}

/// Replace the database with a backup copy.
///
/// The current database is copied aside as `inventory.db.pre-restore` first,
/// so a bad restore never destroys state.
pub fn restore_backup(workspace: &Workspace, backup: &Path) -> Result<(), BackupError> {
    if !backup.exists() {
        return Err(BackupError::BackupNotFound(backup.to_path_buf()));
    }

    let db_path = workspace.db_path();
    if db_path.exists() {
        let aside = db_path.with_extension("db.pre-restore");
        std::fs::copy(&db_path, aside)?;
    }
    std::fs::copy(backup, &db_path)?;

    Ok(())
}

/// Collect backup files sorted by name ascending (names embed the timestamp,
/// so name order is chronological order)
fn collect_backups(backup_dir: &Path) -> Result<Vec<PathBuf>, BackupError> {
    if !backup_dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups: Vec<PathBuf> = std::fs::read_dir(backup_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension().map(|e| e == "db").unwrap_or(false)
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("inventory_"))
                    .unwrap_or(false)
        })
        .collect();
    backups.sort();
    Ok(backups)
}

/// Delete all but the most recent RETAIN_COUNT backups
fn prune_backups(backup_dir: &Path) -> Result<(), BackupError> {
    let backups = collect_backups(backup_dir)?;
    if backups.len() > RETAIN_COUNT {
        for old in &backups[..backups.len() - RETAIN_COUNT] {
            std::fs::remove_file(old)?;
        }
    }
    Ok(())
}
