//! `pb cmp` command - Component inventory management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{confirm, money, open_store, parse_lifecycle, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::Settings;
use crate::store::{Component, ComponentEdits, ComponentFilter, Lifecycle, NewComponent};

#[derive(Subcommand, Debug)]
pub enum CmpCommands {
    /// Add a component to the inventory
    Add(AddArgs),

    /// List components with filtering
    List(ListArgs),

    /// Show a component's details
    Show(ShowArgs),

    /// Edit fields of a component
    Edit(EditArgs),

    /// Remove a component
    Rm(RmArgs),

    /// Export the inventory to CSV
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Manufacturer part number (unique)
    pub mpn: String,

    /// Manufacturer name
    #[arg(long, short = 'm')]
    pub manufacturer: String,

    /// Description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Category (e.g. Resistors, ICs)
    #[arg(long, short = 'c', default_value = "")]
    pub category: String,

    /// Quantity on hand
    #[arg(long, default_value_t = 0)]
    pub stock: i64,

    /// Low-stock threshold (0 disables alerting)
    #[arg(long, default_value_t = 0)]
    pub min_stock: i64,

    /// Unit price
    #[arg(long, default_value_t = 0.0)]
    pub price: f64,

    /// Datasheet URL
    #[arg(long)]
    pub datasheet: Option<String>,

    /// Free-form notes
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Footprint / package
    #[arg(long, default_value = "")]
    pub footprint: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by exact category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Search in MPN, manufacturer, and description
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Show only the count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Manufacturer part number
    pub mpn: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Manufacturer part number
    pub mpn: String,

    #[arg(long, short = 'm')]
    pub manufacturer: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Quantity on hand
    #[arg(long)]
    pub stock: Option<i64>,

    /// Low-stock threshold
    #[arg(long)]
    pub min_stock: Option<i64>,

    /// Unit price (a change is recorded in price history)
    #[arg(long)]
    pub price: Option<f64>,

    /// Lifecycle status: Active, NRND, EOL, or Obsolete
    #[arg(long, value_parser = parse_lifecycle)]
    pub lifecycle: Option<Lifecycle>,

    #[arg(long)]
    pub datasheet: Option<String>,

    /// Remove the stored datasheet URL
    #[arg(long, conflicts_with = "datasheet")]
    pub clear_datasheet: bool,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long)]
    pub footprint: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Manufacturer part number
    pub mpn: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output CSV file
    #[arg(long, short = 'o', default_value = "inventory.csv")]
    pub output: PathBuf,
}

/// Run a component subcommand
pub fn run(cmd: CmpCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CmpCommands::Add(args) => run_add(args, global),
        CmpCommands::List(args) => run_list(args, global),
        CmpCommands::Show(args) => run_show(args, global),
        CmpCommands::Edit(args) => run_edit(args, global),
        CmpCommands::Rm(args) => run_rm(args, global),
        CmpCommands::Export(args) => run_export(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;

    store
        .components()
        .add(&NewComponent {
            mpn: args.mpn.clone(),
            manufacturer: args.manufacturer,
            description: args.description,
            category: args.category,
            stock_qty: args.stock,
            min_stock: args.min_stock,
            unit_price: args.price,
            datasheet_url: args.datasheet,
            notes: args.notes,
            footprint: args.footprint,
        })
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity("component_added", &args.mpn);

    if !global.quiet {
        println!(
            "{} Added component {}",
            style("✓").green(),
            style(&args.mpn).cyan()
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (ws, store) = open_store(global)?;
    let settings = Settings::load(&ws);

    let components = store
        .components()
        .list(&ComponentFilter {
            category: args.category,
            keyword: args.search,
        })
        .map_err(|e| miette::miette!("{}", e))?;

    if args.count {
        println!("{}", components.len());
        return Ok(());
    }
    if components.is_empty() {
        println!("No components found.");
        return Ok(());
    }

    println!(
        "{:<24} {:<16} {:<28} {:>8} {:>10} {:<8}",
        style("MPN").bold(),
        style("MANUFACTURER").bold(),
        style("DESCRIPTION").bold(),
        style("STOCK").bold(),
        style("PRICE").bold(),
        style("STATUS").bold()
    );
    println!("{}", "-".repeat(98));
    for cmp in &components {
        let status = cmp.lifecycle.map(|lc| lc.as_str()).unwrap_or("-");
        let status = match cmp.lifecycle {
            Some(Lifecycle::Obsolete) => style(status).red(),
            Some(lc) if lc.is_at_risk() => style(status).yellow(),
            _ => style(status).dim(),
        };
        let low = cmp.min_stock > 0 && cmp.stock_qty < cmp.min_stock;
        let stock = if low {
            style(cmp.stock_qty.to_string()).red()
        } else {
            style(cmp.stock_qty.to_string()).dim()
        };
        println!(
            "{:<24} {:<16} {:<28} {:>8} {:>10} {:<8}",
            truncate_str(&cmp.mpn, 22),
            truncate_str(&cmp.manufacturer, 14),
            truncate_str(&cmp.description, 26),
            stock,
            money(&settings, cmp.unit_price),
            status
        );
    }
    println!();
    println!("{} component(s) found.", style(components.len()).cyan());
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (ws, store) = open_store(global)?;
    let settings = Settings::load(&ws);
    let cmp = find_component(&store, &args.mpn)?;

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("MPN").bold(), style(&cmp.mpn).cyan());
    println!("{}: {}", style("Manufacturer").bold(), cmp.manufacturer);
    if !cmp.description.is_empty() {
        println!("{}: {}", style("Description").bold(), cmp.description);
    }
    if !cmp.category.is_empty() {
        println!("{}: {}", style("Category").bold(), cmp.category);
    }
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} (threshold {})",
        style("Stock").bold(),
        cmp.stock_qty,
        cmp.min_stock
    );
    println!(
        "{}: {}",
        style("Unit price").bold(),
        money(&settings, cmp.unit_price)
    );
    println!(
        "{}: {}",
        style("Lifecycle").bold(),
        cmp.lifecycle.map(|lc| lc.as_str()).unwrap_or("-")
    );
    if let Some(checked) = cmp.last_checked {
        println!(
            "{}: {}",
            style("Last checked").bold(),
            checked.format("%Y-%m-%d %H:%M")
        );
    }
    if let Some(ref url) = cmp.datasheet_url {
        println!("{}: {}", style("Datasheet").bold(), url);
    }
    if !cmp.footprint.is_empty() {
        println!("{}: {}", style("Footprint").bold(), cmp.footprint);
    }
    if !cmp.notes.is_empty() {
        println!("{}: {}", style("Notes").bold(), cmp.notes);
    }

    let offers = store
        .suppliers()
        .offers_for(cmp.id)
        .map_err(|e| miette::miette!("{}", e))?;
    if !offers.is_empty() {
        println!();
        println!("{} ({}):", style("Supplier offers").bold(), offers.len());
        for offer in &offers {
            let price = offer
                .price
                .map(|p| money(&settings, p))
                .unwrap_or_else(|| "-".to_string());
            let moq = offer.moq.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string());
            let lead = offer
                .lead_time_days
                .map(|d| format!("{}d", d))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  • {} ({}): {} MOQ {} lead {}",
                offer.supplier_name, offer.supplier_mpn, price, moq, lead
            );
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    let cmp = find_component(&store, &args.mpn)?;

    let edits = ComponentEdits {
        manufacturer: args.manufacturer,
        description: args.description,
        category: args.category,
        stock_qty: args.stock,
        min_stock: args.min_stock,
        unit_price: args.price,
        lifecycle: args.lifecycle,
        datasheet_url: args.datasheet,
        clear_datasheet: args.clear_datasheet,
        notes: args.notes,
        footprint: args.footprint,
    };
    if edits.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }

    store
        .components()
        .update(cmp.id, &edits)
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity("component_edited", &args.mpn);

    if !global.quiet {
        println!(
            "{} Updated component {}",
            style("✓").green(),
            style(&args.mpn).cyan()
        );
    }
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    let cmp = find_component(&store, &args.mpn)?;

    if !confirm(&format!("Remove component '{}'?", args.mpn), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    store
        .components()
        .delete(cmp.id)
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity("component_deleted", &args.mpn);

    if !global.quiet {
        println!(
            "{} Removed component {}",
            style("✓").green(),
            style(&args.mpn).cyan()
        );
    }
    Ok(())
}

fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    let components = store
        .components()
        .list(&ComponentFilter::default())
        .map_err(|e| miette::miette!("{}", e))?;

    let mut writer = csv::Writer::from_path(&args.output).into_diagnostic()?;
    writer
        .write_record(["MPN", "Manufacturer", "Description", "Stock", "Price"])
        .into_diagnostic()?;
    for cmp in &components {
        writer
            .write_record([
                cmp.mpn.as_str(),
                cmp.manufacturer.as_str(),
                cmp.description.as_str(),
                &cmp.stock_qty.to_string(),
                &format!("{:.2}", cmp.unit_price),
            ])
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Exported {} component(s) to {}",
            style("✓").green(),
            style(components.len()).cyan(),
            style(args.output.display()).cyan()
        );
    }
    Ok(())
}

/// Resolve an MPN to its component or fail with a readable error
fn find_component(store: &crate::store::Store, mpn: &str) -> Result<Component> {
    store
        .components()
        .get_by_mpn(mpn)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("No component found with MPN '{}'", mpn))
}
