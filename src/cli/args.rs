//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    alerts::AlertsArgs,
    backup::BackupCommands,
    bom::BomCommands,
    cmp::CmpCommands,
    completions::CompletionsArgs,
    init::InitArgs,
    prices::PricesCommands,
    proj::ProjCommands,
    report::ReportCommands,
    status::StatusArgs,
    sup::SupCommands,
};

#[derive(Parser)]
#[command(name = "pb")]
#[command(author, version, about = "Parts Bench - electronics inventory and BOM management")]
#[command(
    long_about = "A command-line workbench for electronics engineers: track components, \
                  stock, lifecycle status, and supplier pricing, and roll per-project \
                  BOMs up into cost reports."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Workspace root (default: auto-detect by finding .pb/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new partsbench workspace
    Init(InitArgs),

    /// Component inventory management
    #[command(subcommand)]
    Cmp(CmpCommands),

    /// Supplier management
    #[command(subcommand)]
    Sup(SupCommands),

    /// Project management
    #[command(subcommand)]
    Proj(ProjCommands),

    /// Per-project BOM management
    #[command(subcommand)]
    Bom(BomCommands),

    /// Price checks and price history
    #[command(subcommand)]
    Prices(PricesCommands),

    /// Show low-stock, lifecycle, and price-increase alerts
    Alerts(AlertsArgs),

    /// Show workspace status dashboard
    Status(StatusArgs),

    /// Generate reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Database backup and restore
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}
