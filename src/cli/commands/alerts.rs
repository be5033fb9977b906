//! `pb alerts` command - Low-stock, lifecycle, and price-increase alerts

use console::style;
use miette::Result;

use crate::cli::helpers::{money, open_store};
use crate::cli::GlobalOpts;
use crate::core::Settings;
use crate::store::Lifecycle;

#[derive(clap::Args, Debug)]
pub struct AlertsArgs {}

pub fn run(_args: AlertsArgs, global: &GlobalOpts) -> Result<()> {
    let (ws, store) = open_store(global)?;
    let settings = Settings::load(&ws);
    let dashboard = store.dashboard();

    let mut any = false;

    if settings.warn_low_stock {
        let low = dashboard.low_stock().map_err(|e| miette::miette!("{}", e))?;
        if !low.is_empty() {
            any = true;
            println!("{}", style("Low stock").bold().yellow());
            for alert in &low {
                println!(
                    "  {} has {} in stock (threshold {})",
                    style(&alert.mpn).cyan(),
                    style(alert.stock_qty).red(),
                    alert.min_stock
                );
            }
            println!();
        }
    }

    if settings.warn_obsolete {
        let risk = dashboard
            .lifecycle_risk()
            .map_err(|e| miette::miette!("{}", e))?;
        if !risk.is_empty() {
            any = true;
            println!("{}", style("Lifecycle risk").bold().yellow());
            for alert in &risk {
                let status = match alert.status {
                    Lifecycle::Obsolete => style(alert.status.as_str()).red(),
                    _ => style(alert.status.as_str()).yellow(),
                };
                println!("  {} is {}", style(&alert.mpn).cyan(), status);
            }
            println!();
        }
    }

    let increases = dashboard
        .price_increases()
        .map_err(|e| miette::miette!("{}", e))?;
    if !increases.is_empty() {
        any = true;
        println!("{}", style("Price increases").bold().yellow());
        for alert in &increases {
            println!(
                "  {} rose {} -> {} ({})",
                style(&alert.mpn).cyan(),
                money(&settings, alert.old_price),
                money(&settings, alert.new_price),
                style(format!("+{:.1}%", alert.percent)).red()
            );
        }
        println!();
    }

    if !any {
        println!("{} No alerts.", style("✓").green());
    }
    Ok(())
}
