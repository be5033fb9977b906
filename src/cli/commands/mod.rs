//! Command implementations

pub mod alerts;
pub mod backup;
pub mod bom;
pub mod cmp;
pub mod completions;
pub mod init;
pub mod prices;
pub mod proj;
pub mod report;
pub mod status;
pub mod sup;
