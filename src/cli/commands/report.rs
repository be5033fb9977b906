//! `pb report` command - Report generation

use chrono::Utc;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::open_store;
use crate::cli::GlobalOpts;
use crate::core::Settings;
use crate::report::{report_file_name, ReportGenerator};

use super::proj::find_project;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Generate an HTML BOM report for a project
    Bom(BomReportArgs),
}

#[derive(clap::Args, Debug)]
pub struct BomReportArgs {
    /// Project name
    pub project: String,

    /// Directory to write the report into (default: current directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Bom(args) => run_bom(args, global),
    }
}

fn run_bom(args: BomReportArgs, global: &GlobalOpts) -> Result<()> {
    let (ws, store) = open_store(global)?;
    let settings = Settings::load(&ws);
    let project = find_project(&store, &args.project)?;

    let lines = store
        .bom()
        .list_lines(project.id)
        .map_err(|e| miette::miette!("{}", e))?;

    let now = Utc::now();
    let generator = ReportGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let html = generator
        .render_bom(&project, &lines, &settings, now)
        .map_err(|e| miette::miette!("{}", e))?;

    let out_dir = args
        .output
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir).into_diagnostic()?;
    let out_path = out_dir.join(report_file_name(&project.name, now));
    std::fs::write(&out_path, html).into_diagnostic()?;
    store.log_activity("report_generated", &project.name);

    if !global.quiet {
        println!(
            "{} Wrote BOM report ({} line(s)) to {}",
            style("✓").green(),
            style(lines.len()).cyan(),
            style(out_path.display()).cyan()
        );
    }
    Ok(())
}
