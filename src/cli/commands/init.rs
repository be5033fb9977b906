//! `pb init` command - Initialize a new workspace

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::workspace::{Workspace, WorkspaceError};
use crate::core::Settings;
use crate::store::Store;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
    }

    let workspace = match Workspace::init(&path) {
        Ok(ws) => ws,
        Err(WorkspaceError::AlreadyExists(root)) => {
            println!(
                "{} partsbench workspace already exists at {}",
                style("!").yellow(),
                style(root.display()).cyan()
            );
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    // Create the database and the default settings file up front so the
    // workspace is immediately usable
    Store::open(&workspace.db_path()).map_err(|e| miette::miette!("{}", e))?;
    Settings::default().save(&workspace).into_diagnostic()?;

    println!(
        "{} Initialized partsbench workspace at {}",
        style("✓").green(),
        style(workspace.root().display()).cyan()
    );
    println!();
    println!("Next steps:");
    println!("  {} Add your first component", style("pb cmp add").yellow());
    println!("  {} Create a project", style("pb proj new").yellow());
    println!("  {} Import a BOM from CSV", style("pb bom import").yellow());

    Ok(())
}
