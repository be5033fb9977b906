//! `pb prices` command - Price checks and price history

use chrono::Utc;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{money, open_store};
use crate::cli::GlobalOpts;
use crate::core::Settings;
use crate::pricing::{spawn_batch, BatchItem, PriceSource, SimulatedSource, WorkerEvent, BATCH_LIMIT};
use crate::store::PriceUpdate;

#[derive(Subcommand, Debug)]
pub enum PricesCommands {
    /// Check prices for the stalest components and apply the results
    Update(UpdateArgs),

    /// Show a component's price history
    History(HistoryArgs),
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Maximum components to check in this run
    #[arg(long, short = 'n', default_value_t = BATCH_LIMIT)]
    pub limit: usize,
}

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Component MPN
    pub mpn: String,
}

/// Run a prices subcommand
pub fn run(cmd: PricesCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PricesCommands::Update(args) => run_update(args, global),
        PricesCommands::History(args) => run_history(args, global),
    }
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let (_ws, store) = open_store(global)?;

    let batch: Vec<BatchItem> = store
        .components()
        .stalest_checked(args.limit.min(BATCH_LIMIT))
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .map(|c| BatchItem {
            component_id: c.id,
            mpn: c.mpn,
            manufacturer: c.manufacturer,
        })
        .collect();

    if batch.is_empty() {
        println!("No components to check.");
        return Ok(());
    }

    let source = SimulatedSource;
    let source_name = source.name();
    let rx = spawn_batch(batch, source);

    // Collect quotes off the channel; the store is only written once the
    // whole batch is in, in a single transaction.
    let mut updates: Vec<PriceUpdate> = Vec::new();
    for event in rx {
        match event {
            WorkerEvent::Quoted {
                component_id,
                mpn,
                quote,
            } => {
                if !global.quiet {
                    println!(
                        "  {} {}: {:.2} ({})",
                        style("✓").green(),
                        mpn,
                        quote.price,
                        quote.lifecycle
                    );
                }
                updates.push(PriceUpdate {
                    component_id,
                    price: quote.price,
                    lifecycle: quote.lifecycle,
                    checked_at: Utc::now(),
                });
            }
            WorkerEvent::Failed { mpn, error } => {
                if !global.quiet {
                    println!("  {} {}: {}", style("✗").red(), mpn, error);
                }
            }
            WorkerEvent::Done { succeeded, failed } => {
                if !global.quiet {
                    println!();
                    println!(
                        "{} checked, {} quoted, {} failed",
                        succeeded + failed,
                        succeeded,
                        failed
                    );
                }
            }
        }
    }

    let applied = store
        .components()
        .apply_price_updates(&updates, source_name)
        .map_err(|e| miette::miette!("{}", e))?;
    store.log_activity("prices_updated", &format!("{} component(s)", applied));

    if !global.quiet {
        println!("{} Applied {} price update(s)", style("✓").green(), applied);
    }
    Ok(())
}

fn run_history(args: HistoryArgs, global: &GlobalOpts) -> Result<()> {
    let (ws, store) = open_store(global)?;
    let settings = Settings::load(&ws);

    let cmp = store
        .components()
        .get_by_mpn(&args.mpn)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("No component found with MPN '{}'", args.mpn))?;

    let history = store
        .components()
        .price_history(cmp.id)
        .map_err(|e| miette::miette!("{}", e))?;
    if history.is_empty() {
        println!("No price history for {}.", args.mpn);
        return Ok(());
    }

    println!(
        "{:<20} {:>10} {:<12}",
        style("DATE").bold(),
        style("PRICE").bold(),
        style("SOURCE").bold()
    );
    println!("{}", "-".repeat(44));
    for obs in &history {
        println!(
            "{:<20} {:>10} {:<12}",
            obs.date.format("%Y-%m-%d %H:%M"),
            money(&settings, obs.price),
            obs.source
        );
    }
    Ok(())
}
