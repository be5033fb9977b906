//! `pb backup` command - Database backup and restore

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{confirm, open_workspace};
use crate::cli::GlobalOpts;
use crate::core::backup::{create_backup, list_backups, restore_backup};

#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Create a backup now
    Now,

    /// List available backups, newest first
    List,

    /// Replace the database with a backup
    Restore(RestoreArgs),
}

#[derive(clap::Args, Debug)]
pub struct RestoreArgs {
    /// Backup file name (as shown by `pb backup list`) or path
    pub backup: PathBuf,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: BackupCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BackupCommands::Now => run_now(global),
        BackupCommands::List => run_list(global),
        BackupCommands::Restore(args) => run_restore(args, global),
    }
}

fn run_now(global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let path = create_backup(&ws).map_err(|e| miette::miette!("{}", e))?;

    if !global.quiet {
        println!(
            "{} Backup written to {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let backups = list_backups(&ws).map_err(|e| miette::miette!("{}", e))?;

    if backups.is_empty() {
        println!("No backups found.");
        return Ok(());
    }
    for path in &backups {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        println!("{}", name);
    }
    Ok(())
}

fn run_restore(args: RestoreArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;

    // A bare file name refers to the workspace backup directory
    let backup = if args.backup.is_absolute() || args.backup.exists() {
        args.backup.clone()
    } else {
        ws.backup_dir().join(&args.backup)
    };

    if !confirm(
        &format!(
            "Replace the database with {}?",
            backup.file_name().and_then(|n| n.to_str()).unwrap_or("backup")
        ),
        args.yes,
    )? {
        println!("Aborted.");
        return Ok(());
    }

    restore_backup(&ws, &backup).map_err(|e| miette::miette!("{}", e))?;

    if !global.quiet {
        println!(
            "{} Restored database from {}",
            style("✓").green(),
            style(backup.display()).cyan()
        );
        println!(
            "   The previous database was kept as {}",
            style("inventory.db.pre-restore").dim()
        );
    }
    Ok(())
}
