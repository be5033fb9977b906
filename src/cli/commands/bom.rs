//! `pb bom` command - Per-project BOM management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{confirm, money, open_store, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::Settings;
use crate::store::{BomImportRow, BomLine, Lifecycle};

use super::proj::find_project;

#[derive(Subcommand, Debug)]
pub enum BomCommands {
    /// Import BOM lines from a CSV file
    Import(ImportArgs),

    /// List a project's BOM lines
    List(ListArgs),

    /// Show a project's unit cost and build projections
    Cost(CostArgs),

    /// Mark or clear a line's do-not-populate flag
    Dnp(DnpArgs),

    /// Remove a line from a project's BOM
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Project name
    pub project: String,

    /// CSV file with MPN, Manufacturer, Description, Price, Reference, Qty columns
    pub file: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Project name
    pub project: String,
}

#[derive(clap::Args, Debug)]
pub struct CostArgs {
    /// Project name
    pub project: String,
}

#[derive(clap::Args, Debug)]
pub struct DnpArgs {
    /// Project name
    pub project: String,

    /// Component MPN of the line
    pub mpn: String,

    /// Clear the flag instead of setting it
    #[arg(long)]
    pub clear: bool,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Project name
    pub project: String,

    /// Component MPN of the line
    pub mpn: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a BOM subcommand
pub fn run(cmd: BomCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BomCommands::Import(args) => run_import(args, global),
        BomCommands::List(args) => run_list(args, global),
        BomCommands::Cost(args) => run_cost(args, global),
        BomCommands::Dnp(args) => run_dnp(args, global),
        BomCommands::Rm(args) => run_rm(args, global),
    }
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    let project = find_project(&store, &args.project)?;

    let rows = read_csv_rows(&args.file)?;
    let stats = store
        .bom()
        .import_rows(project.id, &rows)
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity(
        "bom_imported",
        &format!("{}: {} rows", project.name, stats.rows_processed),
    );

    if !global.quiet {
        println!(
            "{} Imported BOM into {}",
            style("✓").green(),
            style(&project.name).cyan()
        );
        println!(
            "   {} row(s) processed, {} line(s) written, {} component(s) created",
            stats.rows_processed, stats.lines_upserted, stats.components_created
        );
        if stats.skipped > 0 {
            println!("   {} row(s) skipped (blank MPN)", style(stats.skipped).yellow());
        }
        if stats.errors > 0 {
            println!("   {} row(s) failed", style(stats.errors).red());
        }
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (ws, store) = open_store(global)?;
    let settings = Settings::load(&ws);
    let project = find_project(&store, &args.project)?;

    let lines = store
        .bom()
        .list_lines(project.id)
        .map_err(|e| miette::miette!("{}", e))?;
    if lines.is_empty() {
        println!("No BOM lines in {}.", project.name);
        return Ok(());
    }

    println!(
        "{:<16} {:<24} {:<24} {:>5} {:>10} {:>10} {:<8}",
        style("REFERENCE").bold(),
        style("MPN").bold(),
        style("DESCRIPTION").bold(),
        style("QTY").bold(),
        style("UNIT").bold(),
        style("EXT").bold(),
        style("STATUS").bold()
    );
    println!("{}", "-".repeat(104));
    for line in &lines {
        print_line(&settings, line);
    }
    println!();
    println!("{} line(s).", style(lines.len()).cyan());
    Ok(())
}

fn print_line(settings: &Settings, line: &BomLine) {
    let mpn = line.mpn.as_deref().unwrap_or("(missing)");
    let mut status = line
        .lifecycle
        .map(|lc| lc.as_str().to_string())
        .unwrap_or_else(|| "-".to_string());
    if line.do_not_populate {
        status.push_str(" DNP");
    }
    let status = match line.lifecycle {
        Some(Lifecycle::Obsolete) => style(status).red(),
        Some(lc) if lc.is_at_risk() => style(status).yellow(),
        _ => style(status).dim(),
    };
    println!(
        "{:<16} {:<24} {:<24} {:>5} {:>10} {:>10} {:<8}",
        truncate_str(&line.reference_designator, 14),
        truncate_str(mpn, 22),
        truncate_str(line.description.as_deref().unwrap_or(""), 22),
        line.quantity,
        money(settings, line.unit_price.unwrap_or(0.0)),
        money(settings, line.extended_price()),
        status
    );
}

fn run_cost(args: CostArgs, global: &GlobalOpts) -> Result<()> {
    let (ws, store) = open_store(global)?;
    let settings = Settings::load(&ws);
    let project = find_project(&store, &args.project)?;

    let unit = store
        .bom()
        .unit_cost(project.id)
        .map_err(|e| miette::miette!("{}", e))?;
    let markup = if settings.default_markup > 0.0 {
        settings.default_markup
    } else {
        1.0
    };
    let unit = unit * markup;

    let mut builder = Builder::default();
    builder.push_record(["Quantity".to_string(), "Cost".to_string()]);
    builder.push_record(["1 unit".to_string(), money(&settings, unit)]);
    builder.push_record(["10 units".to_string(), money(&settings, unit * 10.0)]);
    builder.push_record(["100 units".to_string(), money(&settings, unit * 100.0)]);
    println!("{}", builder.build().with(Style::psql()));
    if markup != 1.0 {
        println!("{}", style(format!("(markup x{} applied)", markup)).dim());
    }
    Ok(())
}

fn run_dnp(args: DnpArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    let project = find_project(&store, &args.project)?;
    let line = find_line(&store, project.id, &args.mpn)?;

    store
        .bom()
        .set_dnp(line.id, !args.clear)
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity(
        "bom_dnp",
        &format!("{}: {} -> {}", project.name, args.mpn, !args.clear),
    );

    if !global.quiet {
        let what = if args.clear { "cleared" } else { "set" };
        println!(
            "{} DNP {} on {} in {}",
            style("✓").green(),
            what,
            style(&args.mpn).cyan(),
            style(&project.name).cyan()
        );
    }
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    let project = find_project(&store, &args.project)?;
    let line = find_line(&store, project.id, &args.mpn)?;

    if !confirm(
        &format!("Remove {} from {}?", args.mpn, project.name),
        args.yes,
    )? {
        println!("Aborted.");
        return Ok(());
    }

    store
        .bom()
        .remove_line(line.id)
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity(
        "bom_line_removed",
        &format!("{}: {}", project.name, args.mpn),
    );

    if !global.quiet {
        println!(
            "{} Removed {} from {}",
            style("✓").green(),
            style(&args.mpn).cyan(),
            style(&project.name).cyan()
        );
    }
    Ok(())
}

fn find_line(store: &crate::store::Store, project_id: i64, mpn: &str) -> Result<BomLine> {
    store
        .bom()
        .find_line(project_id, mpn)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("No BOM line for MPN '{}'", mpn))
}

/// Read BOM rows from a CSV file, matching headers case-insensitively.
///
/// Accepted headers: MPN or "Part Number"; Manufacturer; Description; Price;
/// Reference, References, or Designator; Qty or Quantity. Missing columns
/// default to blank (Qty to 1).
fn read_csv_rows(path: &std::path::Path) -> Result<Vec<BomImportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .into_diagnostic()?;

    let headers = reader.headers().into_diagnostic()?.clone();
    let col = |names: &[&str]| -> Option<usize> {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };

    let mpn_col = col(&["MPN", "Part Number"])
        .ok_or_else(|| miette::miette!("CSV has no MPN or Part Number column"))?;
    let mfr_col = col(&["Manufacturer"]);
    let desc_col = col(&["Description"]);
    let price_col = col(&["Price", "Unit Price"]);
    let ref_col = col(&["Reference", "References", "Designator", "RefDes"]);
    let qty_col = col(&["Qty", "Quantity"]);

    let field = |record: &csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i)).unwrap_or("").to_string()
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.into_diagnostic()?;
        rows.push(BomImportRow {
            mpn: field(&record, Some(mpn_col)),
            manufacturer: field(&record, mfr_col),
            description: field(&record, desc_col),
            price: field(&record, price_col).parse().ok(),
            reference_designator: field(&record, ref_col),
            quantity: field(&record, qty_col).parse().unwrap_or(1),
        });
    }
    Ok(rows)
}
