//! partsbench: an inventory and BOM workbench for hardware engineers
//!
//! Tracks components, stock levels, lifecycle status, supplier pricing,
//! and per-project bills of materials in a single-file SQLite store.

pub mod cli;
pub mod core;
pub mod pricing;
pub mod report;
pub mod store;
