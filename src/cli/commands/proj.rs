//! `pb proj` command - Project management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, open_store};
use crate::cli::GlobalOpts;
use crate::core::Settings;
use crate::store::{Project, Store};

#[derive(Subcommand, Debug)]
pub enum ProjCommands {
    /// Create a project
    New(NewArgs),

    /// List projects
    List,

    /// Remove a project and its BOM
    Rm(RmArgs),

    /// Mark a project as opened (updates the recent list)
    Open(OpenArgs),

    /// Show recently opened projects
    Recent,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project name (unique)
    pub name: String,

    /// Description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Path to design files (schematic/layout)
    #[arg(long, default_value = "")]
    pub design_path: String,

    /// Path to firmware sources
    #[arg(long, default_value = "")]
    pub firmware_path: String,

    /// Git repository URL
    #[arg(long, default_value = "")]
    pub git_repo: String,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Project name
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct OpenArgs {
    /// Project name
    pub name: String,
}

/// Run a project subcommand
pub fn run(cmd: ProjCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjCommands::New(args) => run_new(args, global),
        ProjCommands::List => run_list(global),
        ProjCommands::Rm(args) => run_rm(args, global),
        ProjCommands::Open(args) => run_open(args, global),
        ProjCommands::Recent => run_recent(global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    store
        .projects()
        .create(
            &args.name,
            &args.description,
            &args.design_path,
            &args.firmware_path,
            &args.git_repo,
        )
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity("project_created", &args.name);

    if !global.quiet {
        println!(
            "{} Created project {}",
            style("✓").green(),
            style(&args.name).cyan()
        );
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    let projects = store.projects().list().map_err(|e| miette::miette!("{}", e))?;

    if projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }

    println!(
        "{:<24} {:<36} {:<12} {:<16}",
        style("NAME").bold(),
        style("DESCRIPTION").bold(),
        style("CREATED").bold(),
        style("LAST OPENED").bold()
    );
    println!("{}", "-".repeat(90));
    for p in &projects {
        let opened = p
            .last_opened
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:<36} {:<12} {:<16}",
            crate::cli::helpers::truncate_str(&p.name, 22),
            crate::cli::helpers::truncate_str(&p.description, 34),
            p.created.format("%Y-%m-%d"),
            opened
        );
    }
    println!();
    println!("{} project(s) found.", style(projects.len()).cyan());
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    let project = find_project(&store, &args.name)?;

    if !confirm(
        &format!("Remove project '{}' and its BOM?", args.name),
        args.yes,
    )? {
        println!("Aborted.");
        return Ok(());
    }

    store
        .projects()
        .delete(project.id)
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity("project_deleted", &args.name);

    if !global.quiet {
        println!(
            "{} Removed project {}",
            style("✓").green(),
            style(&args.name).cyan()
        );
    }
    Ok(())
}

fn run_open(args: OpenArgs, global: &GlobalOpts) -> Result<()> {
    let (ws, store) = open_store(global)?;
    let project = find_project(&store, &args.name)?;

    store
        .projects()
        .touch_opened(project.id)
        .map_err(|e| miette::miette!("{}", e))?;

    let mut settings = Settings::load(&ws);
    settings.mark_project_opened(&project.name);
    settings.save(&ws).into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Opened project {}",
            style("✓").green(),
            style(&project.name).cyan()
        );
    }
    Ok(())
}

fn run_recent(global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    let recent = store
        .projects()
        .recent(10)
        .map_err(|e| miette::miette!("{}", e))?;

    if recent.is_empty() {
        println!("No recently opened projects.");
        return Ok(());
    }
    for p in &recent {
        let opened = p
            .last_opened
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{:<24} {}", p.name, style(opened).dim());
    }
    Ok(())
}

pub(super) fn find_project(store: &Store, name: &str) -> Result<Project> {
    store
        .projects()
        .get_by_name(name)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("No project found named '{}'", name))
}
