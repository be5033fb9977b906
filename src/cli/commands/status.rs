//! `pb status` command - Workspace dashboard

use console::style;
use miette::Result;

use crate::cli::helpers::open_store;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {}

pub fn run(_args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let (ws, store) = open_store(global)?;
    let stats = store
        .dashboard()
        .stats()
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} {}",
        style("Workspace:").bold(),
        style(ws.root().display()).cyan()
    );
    println!();
    println!("  {:<18} {}", "Projects", style(stats.projects).cyan());
    println!("  {:<18} {}", "Components", style(stats.components).cyan());

    let low = if stats.low_stock > 0 {
        style(stats.low_stock).red()
    } else {
        style(stats.low_stock).green()
    };
    println!("  {:<18} {}", "Low stock", low);

    let risk = if stats.lifecycle_risk > 0 {
        style(stats.lifecycle_risk).yellow()
    } else {
        style(stats.lifecycle_risk).green()
    };
    println!("  {:<18} {}", "Lifecycle risk", risk);

    let recent = store
        .projects()
        .recent(5)
        .map_err(|e| miette::miette!("{}", e))?;
    if !recent.is_empty() {
        println!();
        println!("{}", style("Recent projects:").bold());
        for p in &recent {
            let opened = p
                .last_opened
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            println!("  {:<24} {}", p.name, style(opened).dim());
        }
    }

    if stats.low_stock > 0 || stats.lifecycle_risk > 0 {
        println!();
        println!("Run {} for details.", style("pb alerts").yellow());
    }
    Ok(())
}
