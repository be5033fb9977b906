//! Inventory repository: CRUD over components and price history

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::types::{Component, Lifecycle, PriceObservation};
use super::{parse_datetime, parse_datetime_opt, Store, StoreError};

/// Column list shared by every component SELECT
const COMPONENT_COLS: &str = "id, mpn, manufacturer, description, category, stock_qty, \
     min_stock, unit_price, lifecycle_status, last_checked, datasheet_url, notes, footprint, created";

/// Fields for a new component; lifecycle defaults to Active on insert
#[derive(Debug, Clone, Default)]
pub struct NewComponent {
    pub mpn: String,
    pub manufacturer: String,
    pub description: String,
    pub category: String,
    pub stock_qty: i64,
    pub min_stock: i64,
    pub unit_price: f64,
    pub datasheet_url: Option<String>,
    pub notes: String,
    pub footprint: String,
}

/// Partial edits for an existing component; None leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct ComponentEdits {
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub stock_qty: Option<i64>,
    pub min_stock: Option<i64>,
    pub unit_price: Option<f64>,
    pub lifecycle: Option<Lifecycle>,
    pub datasheet_url: Option<String>,
    /// Drop the stored datasheet URL; `datasheet_url: None` alone leaves it
    pub clear_datasheet: bool,
    pub notes: Option<String>,
    pub footprint: Option<String>,
}

impl ComponentEdits {
    pub fn is_empty(&self) -> bool {
        self.manufacturer.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.stock_qty.is_none()
            && self.min_stock.is_none()
            && self.unit_price.is_none()
            && self.lifecycle.is_none()
            && self.datasheet_url.is_none()
            && !self.clear_datasheet
            && self.notes.is_none()
            && self.footprint.is_none()
    }
}

/// Filter predicates for component listing
#[derive(Debug, Clone, Default)]
pub struct ComponentFilter {
    /// Exact category match; None means all categories
    pub category: Option<String>,
    /// Case-insensitive substring match on MPN, manufacturer, or description
    pub keyword: Option<String>,
}

/// One price/lifecycle write from a price-update batch
#[derive(Debug, Clone)]
pub struct PriceUpdate {
    pub component_id: i64,
    pub price: f64,
    pub lifecycle: Lifecycle,
    pub checked_at: DateTime<Utc>,
}

/// Inventory repository; borrows the store for the duration of one operation
pub struct ComponentRepo<'a> {
    store: &'a Store,
}

impl<'a> ComponentRepo<'a> {
    pub(super) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a new component.
    ///
    /// Fails with `Validation` if MPN or manufacturer is empty or the MPN is
    /// already taken. Lifecycle defaults to Active, last-checked to now.
    pub fn add(&self, new: &NewComponent) -> Result<i64, StoreError> {
        if new.mpn.trim().is_empty() {
            return Err(StoreError::Validation("MPN is required".to_string()));
        }
        if new.manufacturer.trim().is_empty() {
            return Err(StoreError::Validation(
                "manufacturer is required".to_string(),
            ));
        }
        if self.get_by_mpn(&new.mpn)?.is_some() {
            return Err(StoreError::Validation(format!(
                "a component with MPN '{}' already exists",
                new.mpn
            )));
        }

        let now = Utc::now().to_rfc3339();
        self.store.conn().execute(
            "INSERT INTO components \
                 (mpn, manufacturer, description, category, stock_qty, min_stock, unit_price, \
                  lifecycle_status, last_checked, datasheet_url, notes, footprint, created) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                new.mpn.trim(),
                new.manufacturer.trim(),
                new.description,
                new.category,
                new.stock_qty,
                new.min_stock,
                new.unit_price,
                Lifecycle::Active.as_str(),
                now,
                new.datasheet_url,
                new.notes,
                new.footprint,
                now,
            ],
        )?;
        Ok(self.store.conn().last_insert_rowid())
    }

    /// Fetch a component by id
    pub fn get(&self, id: i64) -> Result<Component, StoreError> {
        let sql = format!("SELECT {} FROM components WHERE id = ?1", COMPONENT_COLS);
        self.store
            .conn()
            .query_row(&sql, params![id], component_from_row)
            .optional()?
            .ok_or(StoreError::NotFound {
                kind: "component",
                key: id.to_string(),
            })
    }

    /// Fetch a component by manufacturer part number
    pub fn get_by_mpn(&self, mpn: &str) -> Result<Option<Component>, StoreError> {
        let sql = format!("SELECT {} FROM components WHERE mpn = ?1", COMPONENT_COLS);
        Ok(self
            .store
            .conn()
            .query_row(&sql, params![mpn], component_from_row)
            .optional()?)
    }

    /// List components ordered by MPN ascending, applying the filter
    pub fn list(&self, filter: &ComponentFilter) -> Result<Vec<Component>, StoreError> {
        let mut sql = format!("SELECT {} FROM components", COMPONENT_COLS);
        let mut clauses: Vec<&str> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(ref category) = filter.category {
            clauses.push("category = ?");
            binds.push(category.clone());
        }
        if let Some(ref keyword) = filter.keyword {
            clauses.push("(mpn LIKE ? OR manufacturer LIKE ? OR description LIKE ?)");
            let pattern = format!("%{}%", keyword);
            binds.push(pattern.clone());
            binds.push(pattern.clone());
            binds.push(pattern);
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY mpn ASC");

        let mut stmt = self.store.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(binds.iter()), component_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Distinct category labels in use (for filter UIs)
    pub fn categories(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.store.conn().prepare(
            "SELECT DISTINCT category FROM components WHERE category != '' ORDER BY category",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Apply partial edits. A manual price change appends a price-history
    /// observation with source "manual".
    pub fn update(&self, id: i64, edits: &ComponentEdits) -> Result<(), StoreError> {
        let current = self.get(id)?;

        let price_changed = edits
            .unit_price
            .map(|p| p != current.unit_price)
            .unwrap_or(false);

        let datasheet = if edits.clear_datasheet {
            None
        } else {
            edits.datasheet_url.as_ref().or(current.datasheet_url.as_ref())
        };

        let tx = self.store.conn().unchecked_transaction()?;
        tx.execute(
            "UPDATE components SET manufacturer = ?1, description = ?2, category = ?3, \
                 stock_qty = ?4, min_stock = ?5, unit_price = ?6, lifecycle_status = ?7, \
                 datasheet_url = ?8, notes = ?9, footprint = ?10 \
             WHERE id = ?11",
            params![
                edits.manufacturer.as_ref().unwrap_or(&current.manufacturer),
                edits.description.as_ref().unwrap_or(&current.description),
                edits.category.as_ref().unwrap_or(&current.category),
                edits.stock_qty.unwrap_or(current.stock_qty),
                edits.min_stock.unwrap_or(current.min_stock),
                edits.unit_price.unwrap_or(current.unit_price),
                edits
                    .lifecycle
                    .or(current.lifecycle)
                    .map(|lc| lc.as_str().to_string()),
                datasheet,
                edits.notes.as_ref().unwrap_or(&current.notes),
                edits.footprint.as_ref().unwrap_or(&current.footprint),
                id,
            ],
        )?;
        if price_changed {
            record_price(&tx, id, edits.unit_price.unwrap_or(0.0), "manual")?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Overwrite price, lifecycle, and last-checked, appending exactly one
    /// immutable price observation labelled with the update mechanism.
    pub fn update_price_and_lifecycle(
        &self,
        id: i64,
        price: f64,
        lifecycle: Lifecycle,
        checked_at: DateTime<Utc>,
        source: &str,
    ) -> Result<(), StoreError> {
        let tx = self.store.conn().unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE components SET unit_price = ?1, lifecycle_status = ?2, last_checked = ?3 \
             WHERE id = ?4",
            params![price, lifecycle.as_str(), checked_at.to_rfc3339(), id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "component",
                key: id.to_string(),
            });
        }
        record_price(&tx, id, price, source)?;
        tx.commit()?;
        Ok(())
    }

    /// Apply a batch of price updates in a single transaction so a concurrent
    /// reader never sees a half-written batch. Returns the applied count;
    /// updates against vanished components are skipped, not fatal.
    pub fn apply_price_updates(
        &self,
        updates: &[PriceUpdate],
        source: &str,
    ) -> Result<usize, StoreError> {
        let tx = self.store.conn().unchecked_transaction()?;
        let mut applied = 0;
        for update in updates {
            let changed = tx.execute(
                "UPDATE components SET unit_price = ?1, lifecycle_status = ?2, last_checked = ?3 \
                 WHERE id = ?4",
                params![
                    update.price,
                    update.lifecycle.as_str(),
                    update.checked_at.to_rfc3339(),
                    update.component_id,
                ],
            )?;
            if changed == 0 {
                continue;
            }
            record_price(&tx, update.component_id, update.price, source)?;
            applied += 1;
        }
        tx.commit()?;
        Ok(applied)
    }

    /// Price observations for a component, oldest first
    pub fn price_history(&self, component_id: i64) -> Result<Vec<PriceObservation>, StoreError> {
        let mut stmt = self.store.conn().prepare(
            "SELECT id, component_id, price, date, source FROM price_history \
             WHERE component_id = ?1 ORDER BY date ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![component_id], |row| {
            let date: String = row.get(3)?;
            Ok(PriceObservation {
                id: row.get(0)?,
                component_id: row.get(1)?,
                price: row.get(2)?,
                date: parse_datetime(&date),
                source: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Components ordered by staleness of their last price check, for
    /// picking the next price-update batch
    pub fn stalest_checked(&self, limit: usize) -> Result<Vec<Component>, StoreError> {
        let sql = format!(
            "SELECT {} FROM components \
             ORDER BY last_checked IS NOT NULL, last_checked ASC LIMIT ?1",
            COMPONENT_COLS
        );
        let mut stmt = self.store.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], component_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Remove a component row. Does NOT cascade to BOM lines: lines that
    /// referenced it become dangling and render as missing. That mirrors the
    /// long-standing behavior BOM history depends on.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let changed = self
            .store
            .conn()
            .execute("DELETE FROM components WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "component",
                key: id.to_string(),
            });
        }
        Ok(())
    }
}

/// Append one immutable price observation
fn record_price(
    conn: &rusqlite::Connection,
    component_id: i64,
    price: f64,
    source: &str,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO price_history (component_id, price, date, source) VALUES (?1, ?2, ?3, ?4)",
        params![component_id, price, Utc::now().to_rfc3339(), source],
    )?;
    Ok(())
}

fn component_from_row(row: &Row<'_>) -> rusqlite::Result<Component> {
    let lifecycle: Option<String> = row.get(8)?;
    let last_checked: Option<String> = row.get(9)?;
    let created: String = row.get(13)?;
    Ok(Component {
        id: row.get(0)?,
        mpn: row.get(1)?,
        manufacturer: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        stock_qty: row.get(5)?,
        min_stock: row.get(6)?,
        unit_price: row.get(7)?,
        lifecycle: lifecycle.and_then(|s| s.parse().ok()),
        last_checked: parse_datetime_opt(last_checked),
        datasheet_url: row.get(10)?,
        notes: row.get(11)?,
        footprint: row.get(12)?,
        created: parse_datetime(&created),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_component(mpn: &str) -> NewComponent {
        NewComponent {
            mpn: mpn.to_string(),
            manufacturer: "Yageo".to_string(),
            description: "1k resistor 0402".to_string(),
            category: "Resistors".to_string(),
            stock_qty: 100,
            min_stock: 10,
            unit_price: 0.01,
            ..Default::default()
        }
    }

    #[test]
    fn test_add_then_list_returns_inserted_values() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        let id = repo.add(&new_component("RC0402FR-071KL")).unwrap();

        let listed = repo.list(&ComponentFilter::default()).unwrap();
        assert_eq!(listed.len(), 1);
        let cmp = &listed[0];
        assert_eq!(cmp.id, id);
        assert_eq!(cmp.mpn, "RC0402FR-071KL");
        assert_eq!(cmp.manufacturer, "Yageo");
        assert_eq!(cmp.stock_qty, 100);
        assert_eq!(cmp.lifecycle, Some(Lifecycle::Active));
        assert!(cmp.last_checked.is_some());
    }

    #[test]
    fn test_add_duplicate_mpn_fails_validation() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        repo.add(&new_component("R1K")).unwrap();

        let err = repo.add(&new_component("R1K")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_add_empty_fields_fail_validation() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();

        let mut missing_mpn = new_component("");
        missing_mpn.mpn = "  ".to_string();
        assert!(matches!(
            repo.add(&missing_mpn).unwrap_err(),
            StoreError::Validation(_)
        ));

        let mut missing_mfr = new_component("R1K");
        missing_mfr.manufacturer = String::new();
        assert!(matches!(
            repo.add(&missing_mfr).unwrap_err(),
            StoreError::Validation(_)
        ));
    }

    #[test]
    fn test_list_orders_by_mpn() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        repo.add(&new_component("ZZZ-1")).unwrap();
        repo.add(&new_component("AAA-1")).unwrap();
        repo.add(&new_component("MMM-1")).unwrap();

        let mpns: Vec<String> = repo
            .list(&ComponentFilter::default())
            .unwrap()
            .into_iter()
            .map(|c| c.mpn)
            .collect();
        assert_eq!(mpns, vec!["AAA-1", "MMM-1", "ZZZ-1"]);
    }

    #[test]
    fn test_keyword_filter_is_case_insensitive_substring() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        repo.add(&new_component("STM32F103C8T6")).unwrap();
        let mut cap = new_component("GRM155R71C104KA88D");
        cap.manufacturer = "Murata".to_string();
        cap.description = "100nF capacitor".to_string();
        repo.add(&cap).unwrap();

        let hits = repo
            .list(&ComponentFilter {
                keyword: Some("stm32".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].mpn, "STM32F103C8T6");

        // Keyword also matches manufacturer and description
        let by_mfr = repo
            .list(&ComponentFilter {
                keyword: Some("murata".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_mfr.len(), 1);

        let by_desc = repo
            .list(&ComponentFilter {
                keyword: Some("capacitor".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_desc.len(), 1);
    }

    #[test]
    fn test_category_filter_is_exact() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        repo.add(&new_component("R1")).unwrap();
        let mut ic = new_component("U1");
        ic.category = "ICs".to_string();
        repo.add(&ic).unwrap();

        let hits = repo
            .list(&ComponentFilter {
                category: Some("ICs".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].mpn, "U1");
    }

    #[test]
    fn test_update_price_and_lifecycle_appends_history() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        let id = repo.add(&new_component("R1K")).unwrap();

        repo.update_price_and_lifecycle(id, 0.02, Lifecycle::Nrnd, Utc::now(), "simulated")
            .unwrap();

        let cmp = repo.get(id).unwrap();
        assert_eq!(cmp.unit_price, 0.02);
        assert_eq!(cmp.lifecycle, Some(Lifecycle::Nrnd));

        let history = repo.price_history(id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].price, 0.02);
        assert_eq!(history[0].source, "simulated");
    }

    #[test]
    fn test_update_price_on_missing_component_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .components()
            .update_price_and_lifecycle(999, 1.0, Lifecycle::Active, Utc::now(), "simulated")
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_manual_price_edit_appends_history() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        let id = repo.add(&new_component("R1K")).unwrap();

        repo.update(
            id,
            &ComponentEdits {
                unit_price: Some(0.05),
                stock_qty: Some(42),
                ..Default::default()
            },
        )
        .unwrap();

        let cmp = repo.get(id).unwrap();
        assert_eq!(cmp.unit_price, 0.05);
        assert_eq!(cmp.stock_qty, 42);
        // Untouched fields survive
        assert_eq!(cmp.manufacturer, "Yageo");

        let history = repo.price_history(id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].source, "manual");
    }

    #[test]
    fn test_same_price_edit_does_not_append_history() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        let id = repo.add(&new_component("R1K")).unwrap();

        repo.update(
            id,
            &ComponentEdits {
                unit_price: Some(0.01),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(repo.price_history(id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_row() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        let id = repo.add(&new_component("R1K")).unwrap();

        repo.delete(id).unwrap();
        assert!(matches!(
            repo.get(id).unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert!(matches!(
            repo.delete(id).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn test_delete_with_history_and_offers_succeeds() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        let id = repo.add(&new_component("R1K")).unwrap();
        repo.update_price_and_lifecycle(id, 0.02, Lifecycle::Active, Utc::now(), "simulated")
            .unwrap();
        let sup_id = store.suppliers().add("Mouser", "", "", "").unwrap();
        store
            .suppliers()
            .link(id, sup_id, &crate::store::NewOffer::default())
            .unwrap();

        repo.delete(id).unwrap();
        assert!(matches!(
            repo.get(id).unwrap_err(),
            StoreError::NotFound { .. }
        ));
        // History outlives the component
        assert_eq!(repo.price_history(id).unwrap().len(), 1);
    }

    #[test]
    fn test_clear_datasheet() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        let mut new = new_component("R1K");
        new.datasheet_url = Some("https://example.com/r1k.pdf".to_string());
        let id = repo.add(&new).unwrap();

        // An unrelated edit leaves the URL alone
        repo.update(
            id,
            &ComponentEdits {
                stock_qty: Some(5),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(repo.get(id).unwrap().datasheet_url.is_some());

        repo.update(
            id,
            &ComponentEdits {
                clear_datasheet: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(repo.get(id).unwrap().datasheet_url, None);
    }

    #[test]
    fn test_apply_price_updates_commits_batch_and_skips_vanished() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        let a = repo.add(&new_component("AAA")).unwrap();
        let b = repo.add(&new_component("BBB")).unwrap();

        let updates = vec![
            PriceUpdate {
                component_id: a,
                price: 1.25,
                lifecycle: Lifecycle::Active,
                checked_at: Utc::now(),
            },
            PriceUpdate {
                component_id: 999, // vanished mid-batch
                price: 9.99,
                lifecycle: Lifecycle::Active,
                checked_at: Utc::now(),
            },
            PriceUpdate {
                component_id: b,
                price: 2.50,
                lifecycle: Lifecycle::Eol,
                checked_at: Utc::now(),
            },
        ];
        let applied = repo.apply_price_updates(&updates, "simulated").unwrap();
        assert_eq!(applied, 2);
        assert_eq!(repo.get(a).unwrap().unit_price, 1.25);
        assert_eq!(repo.get(b).unwrap().lifecycle, Some(Lifecycle::Eol));
    }

    #[test]
    fn test_stalest_checked_prefers_never_checked() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.components();
        let a = repo.add(&new_component("AAA")).unwrap();
        let b = repo.add(&new_component("BBB")).unwrap();

        // Clear one last_checked to simulate a never-checked part
        store
            .conn()
            .execute(
                "UPDATE components SET last_checked = NULL WHERE id = ?1",
                params![b],
            )
            .unwrap();

        let batch = repo.stalest_checked(2).unwrap();
        assert_eq!(batch[0].id, b);
        assert_eq!(batch[1].id, a);
    }
}
