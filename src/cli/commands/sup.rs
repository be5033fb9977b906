//! `pb sup` command - Supplier management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{confirm, money, open_store, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::Settings;
use crate::store::{NewOffer, Store, Supplier};

#[derive(Subcommand, Debug)]
pub enum SupCommands {
    /// Add a supplier
    Add(AddArgs),

    /// List suppliers
    List,

    /// Remove a supplier and its offers
    Rm(RmArgs),

    /// Record a supplier's offer for a component
    Link(LinkArgs),

    /// Show offers for a component, cheapest first
    Offers(OffersArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Supplier name (unique)
    pub name: String,

    /// Website URL
    #[arg(long, short = 'w', default_value = "")]
    pub website: String,

    /// Contact (email or phone)
    #[arg(long, default_value = "")]
    pub contact: String,

    /// Free-form notes
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Supplier name
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Component MPN
    pub mpn: String,

    /// Supplier name
    pub supplier: String,

    /// Supplier's own part number
    #[arg(long, default_value = "")]
    pub supplier_mpn: String,

    /// Offered unit price
    #[arg(long)]
    pub price: Option<f64>,

    /// Minimum order quantity
    #[arg(long)]
    pub moq: Option<i64>,

    /// Lead time in days
    #[arg(long)]
    pub lead_time: Option<i64>,
}

#[derive(clap::Args, Debug)]
pub struct OffersArgs {
    /// Component MPN
    pub mpn: String,
}

/// Run a supplier subcommand
pub fn run(cmd: SupCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SupCommands::Add(args) => run_add(args, global),
        SupCommands::List => run_list(global),
        SupCommands::Rm(args) => run_rm(args, global),
        SupCommands::Link(args) => run_link(args, global),
        SupCommands::Offers(args) => run_offers(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    store
        .suppliers()
        .add(&args.name, &args.website, &args.contact, &args.notes)
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity("supplier_added", &args.name);

    if !global.quiet {
        println!(
            "{} Added supplier {}",
            style("✓").green(),
            style(&args.name).cyan()
        );
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    let suppliers = store.suppliers().list().map_err(|e| miette::miette!("{}", e))?;

    if suppliers.is_empty() {
        println!("No suppliers found.");
        return Ok(());
    }

    println!(
        "{:<24} {:<28} {:<24}",
        style("NAME").bold(),
        style("WEBSITE").bold(),
        style("CONTACT").bold()
    );
    println!("{}", "-".repeat(78));
    for sup in &suppliers {
        println!(
            "{:<24} {:<28} {:<24}",
            truncate_str(&sup.name, 22),
            truncate_str(&sup.website, 26),
            truncate_str(&sup.contact, 22)
        );
    }
    println!();
    println!("{} supplier(s) found.", style(suppliers.len()).cyan());
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;
    let sup = find_supplier(&store, &args.name)?;

    if !confirm(
        &format!("Remove supplier '{}' and its offers?", args.name),
        args.yes,
    )? {
        println!("Aborted.");
        return Ok(());
    }

    store
        .suppliers()
        .delete(sup.id)
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity("supplier_deleted", &args.name);

    if !global.quiet {
        println!(
            "{} Removed supplier {}",
            style("✓").green(),
            style(&args.name).cyan()
        );
    }
    Ok(())
}

fn run_link(args: LinkArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;

    let cmp = store
        .components()
        .get_by_mpn(&args.mpn)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("No component found with MPN '{}'", args.mpn))?;
    let sup = find_supplier(&store, &args.supplier)?;

    store
        .suppliers()
        .link(
            cmp.id,
            sup.id,
            &NewOffer {
                supplier_mpn: args.supplier_mpn,
                price: args.price,
                moq: args.moq,
                lead_time_days: args.lead_time,
            },
        )
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity(
        "supplier_linked",
        &format!("{} -> {}", args.supplier, args.mpn),
    );

    if !global.quiet {
        println!(
            "{} Linked {} to {}",
            style("✓").green(),
            style(&args.supplier).cyan(),
            style(&args.mpn).cyan()
        );
    }
    Ok(())
}

fn run_offers(args: OffersArgs, global: &GlobalOpts) -> Result<()> {
    let (ws, store) = open_store(global)?;
    let settings = Settings::load(&ws);

    let cmp = store
        .components()
        .get_by_mpn(&args.mpn)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("No component found with MPN '{}'", args.mpn))?;

    let offers = store
        .suppliers()
        .offers_for(cmp.id)
        .map_err(|e| miette::miette!("{}", e))?;
    if offers.is_empty() {
        println!("No offers recorded for {}.", args.mpn);
        return Ok(());
    }

    println!(
        "{:<24} {:<20} {:>10} {:>8} {:>8}",
        style("SUPPLIER").bold(),
        style("SUPPLIER MPN").bold(),
        style("PRICE").bold(),
        style("MOQ").bold(),
        style("LEAD").bold()
    );
    println!("{}", "-".repeat(74));
    for offer in &offers {
        println!(
            "{:<24} {:<20} {:>10} {:>8} {:>8}",
            truncate_str(&offer.supplier_name, 22),
            truncate_str(&offer.supplier_mpn, 18),
            offer
                .price
                .map(|p| money(&settings, p))
                .unwrap_or_else(|| "-".to_string()),
            offer.moq.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string()),
            offer
                .lead_time_days
                .map(|d| format!("{}d", d))
                .unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

fn find_supplier(store: &Store, name: &str) -> Result<Supplier> {
    store
        .suppliers()
        .get_by_name(name)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("No supplier found named '{}'", name))
}
