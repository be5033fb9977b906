//! Read-only alert and dashboard aggregation
//!
//! No stored state of its own; every view is recomputed from the store on
//! demand.

use rusqlite::params;

use super::types::{
    DashboardStats, LifecycleAlert, Lifecycle, LowStockAlert, PriceIncreaseAlert,
};
use super::{Store, StoreError};

/// Price increases above this percentage are reported
const PRICE_INCREASE_THRESHOLD_PCT: f64 = 10.0;

pub struct Dashboard<'a> {
    store: &'a Store,
}

impl<'a> Dashboard<'a> {
    pub(super) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Components below their stock threshold. A threshold of 0 disables
    /// alerting for that component.
    pub fn low_stock(&self) -> Result<Vec<LowStockAlert>, StoreError> {
        let mut stmt = self.store.conn().prepare(
            "SELECT mpn, stock_qty, min_stock FROM components \
             WHERE stock_qty < min_stock AND min_stock > 0 \
             ORDER BY mpn ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(LowStockAlert {
                mpn: row.get(0)?,
                stock_qty: row.get(1)?,
                min_stock: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Components in an at-risk lifecycle stage (NRND, EOL, Obsolete)
    pub fn lifecycle_risk(&self) -> Result<Vec<LifecycleAlert>, StoreError> {
        let mut stmt = self.store.conn().prepare(
            "SELECT mpn, lifecycle_status FROM components \
             WHERE lifecycle_status IN ('Obsolete', 'EOL', 'NRND') \
             ORDER BY mpn ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(1)?;
            Ok((row.get::<_, String>(0)?, status))
        })?;
        let mut alerts = Vec::new();
        for row in rows {
            let (mpn, status) = row?;
            if let Ok(status) = status.parse::<Lifecycle>() {
                alerts.push(LifecycleAlert { mpn, status });
            }
        }
        Ok(alerts)
    }

    /// Components with a price-history pair where the later observation
    /// exceeds the earlier by more than 10%. One entry per component,
    /// reporting the largest qualifying increase.
    pub fn price_increases(&self) -> Result<Vec<PriceIncreaseAlert>, StoreError> {
        let mut stmt = self.store.conn().prepare(
            "SELECT c.mpn, ph1.price AS old_price, ph2.price AS new_price, \
                    MAX((ph2.price - ph1.price) * 100.0 / ph1.price) AS pct \
             FROM components c \
             JOIN price_history ph1 ON c.id = ph1.component_id \
             JOIN price_history ph2 ON c.id = ph2.component_id \
             WHERE ph2.date > ph1.date \
               AND ph1.price > 0 \
               AND ph2.price > ph1.price * ?1 \
             GROUP BY c.mpn \
             ORDER BY c.mpn ASC",
        )?;
        let factor = 1.0 + PRICE_INCREASE_THRESHOLD_PCT / 100.0;
        let rows = stmt.query_map(params![factor], |row| {
            Ok(PriceIncreaseAlert {
                mpn: row.get(0)?,
                old_price: row.get(1)?,
                new_price: row.get(2)?,
                percent: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Fixed dashboard counters
    pub fn stats(&self) -> Result<DashboardStats, StoreError> {
        let conn = self.store.conn();
        let projects: i64 =
            conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
        let components: i64 =
            conn.query_row("SELECT COUNT(*) FROM components", [], |row| row.get(0))?;
        let low_stock: i64 = conn.query_row(
            "SELECT COUNT(*) FROM components WHERE stock_qty < min_stock AND min_stock > 0",
            [],
            |row| row.get(0),
        )?;
        let lifecycle_risk: i64 = conn.query_row(
            "SELECT COUNT(*) FROM components \
             WHERE lifecycle_status IN ('Obsolete', 'EOL', 'NRND')",
            [],
            |row| row.get(0),
        )?;
        Ok(DashboardStats {
            projects: projects as usize,
            components: components as usize,
            low_stock: low_stock as usize,
            lifecycle_risk: lifecycle_risk as usize,
        })
    }
}
