//! Store row types and query result types

use chrono::{DateTime, Utc};

/// Market-availability stage of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    /// Not Recommended for New Designs
    Nrnd,
    /// End of Life
    Eol,
    Obsolete,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Active => "Active",
            Lifecycle::Nrnd => "NRND",
            Lifecycle::Eol => "EOL",
            Lifecycle::Obsolete => "Obsolete",
        }
    }

    /// NRND, EOL, and Obsolete are escalating availability-risk tiers
    pub fn is_at_risk(&self) -> bool {
        !matches!(self, Lifecycle::Active)
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Lifecycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(Lifecycle::Active),
            "NRND" => Ok(Lifecycle::Nrnd),
            "EOL" => Ok(Lifecycle::Eol),
            "OBSOLETE" => Ok(Lifecycle::Obsolete),
            _ => Err(format!(
                "Invalid lifecycle status: {}. Use Active, NRND, EOL, or Obsolete",
                s
            )),
        }
    }
}

/// A purchasable part
#[derive(Debug, Clone)]
pub struct Component {
    pub id: i64,
    /// Manufacturer part number, unique across the store
    pub mpn: String,
    pub manufacturer: String,
    pub description: String,
    pub category: String,
    pub stock_qty: i64,
    /// Minimum stock threshold; 0 disables low-stock alerting
    pub min_stock: i64,
    pub unit_price: f64,
    pub lifecycle: Option<Lifecycle>,
    pub last_checked: Option<DateTime<Utc>>,
    pub datasheet_url: Option<String>,
    pub notes: String,
    pub footprint: String,
    pub created: DateTime<Utc>,
}

/// An immutable price observation
#[derive(Debug, Clone)]
pub struct PriceObservation {
    pub id: i64,
    pub component_id: i64,
    pub price: f64,
    pub date: DateTime<Utc>,
    /// Label identifying the update mechanism (e.g. "manual", "simulated")
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub website: String,
    pub contact: String,
    pub notes: String,
}

/// A supplier's offer for a component, enriched with the supplier name
#[derive(Debug, Clone)]
pub struct SupplierOffer {
    pub id: i64,
    pub component_id: i64,
    pub supplier_id: i64,
    pub supplier_name: String,
    pub supplier_mpn: String,
    pub price: Option<f64>,
    pub moq: Option<i64>,
    pub lead_time_days: Option<i64>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created: DateTime<Utc>,
    pub design_path: String,
    pub firmware_path: String,
    pub git_repo: String,
    pub last_opened: Option<DateTime<Utc>>,
}

/// A BOM line joined with its component.
///
/// Component fields are optional because a component can be deleted out from
/// under its BOM lines; dangling lines still render.
#[derive(Debug, Clone)]
pub struct BomLine {
    pub id: i64,
    pub project_id: i64,
    pub component_id: i64,
    pub reference_designator: String,
    pub quantity: i64,
    pub do_not_populate: bool,
    pub mpn: Option<String>,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<f64>,
    pub lifecycle: Option<Lifecycle>,
}

impl BomLine {
    /// Extended price for this line (quantity x unit price)
    pub fn extended_price(&self) -> f64 {
        self.quantity as f64 * self.unit_price.unwrap_or(0.0)
    }
}

/// One row to import into a project's BOM
#[derive(Debug, Clone, Default)]
pub struct BomImportRow {
    pub mpn: String,
    pub manufacturer: String,
    pub description: String,
    pub price: Option<f64>,
    pub reference_designator: String,
    pub quantity: i64,
}

/// Outcome of a best-effort BOM import
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportStats {
    pub rows_processed: usize,
    pub components_created: usize,
    pub lines_upserted: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// A component below its stock threshold
#[derive(Debug, Clone)]
pub struct LowStockAlert {
    pub mpn: String,
    pub stock_qty: i64,
    pub min_stock: i64,
}

/// A component in an at-risk lifecycle stage
#[derive(Debug, Clone)]
pub struct LifecycleAlert {
    pub mpn: String,
    pub status: Lifecycle,
}

/// A component whose price rose more than 10% between two observations
#[derive(Debug, Clone)]
pub struct PriceIncreaseAlert {
    pub mpn: String,
    pub old_price: f64,
    pub new_price: f64,
    pub percent: f64,
}

/// Fixed dashboard counters
#[derive(Debug, Default, Clone, Copy)]
pub struct DashboardStats {
    pub projects: usize,
    pub components: usize,
    pub low_stock: usize,
    pub lifecycle_risk: usize,
}
