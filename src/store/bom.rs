//! BOM repository: per-project line items and cost rollups

use rusqlite::{params, Row};

use super::types::{BomImportRow, BomLine, ImportStats, Lifecycle};
use super::{NewComponent, Store, StoreError};

pub struct BomRepo<'a> {
    store: &'a Store,
}

impl<'a> BomRepo<'a> {
    pub(super) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Import rows into a project's BOM, best-effort.
    ///
    /// Unseen MPNs auto-create a component (lifecycle Active, price from the
    /// row or 0). Each (project, component) pair gets at most one line:
    /// re-importing replaces the designator and quantity. A failing row is
    /// counted and skipped; prior rows are never rolled back.
    pub fn import_rows(
        &self,
        project_id: i64,
        rows: &[BomImportRow],
    ) -> Result<ImportStats, StoreError> {
        // The project must exist; everything after that is per-row.
        self.store.projects().get(project_id)?;

        let mut stats = ImportStats::default();
        let components = self.store.components();

        for row in rows {
            stats.rows_processed += 1;

            if row.mpn.trim().is_empty() {
                stats.skipped += 1;
                continue;
            }

            let result = (|| -> Result<(), StoreError> {
                let component_id = match components.get_by_mpn(row.mpn.trim())? {
                    Some(existing) => existing.id,
                    None => {
                        let id = components.add(&NewComponent {
                            mpn: row.mpn.trim().to_string(),
                            manufacturer: if row.manufacturer.trim().is_empty() {
                                "Unknown".to_string()
                            } else {
                                row.manufacturer.trim().to_string()
                            },
                            description: row.description.clone(),
                            unit_price: row.price.unwrap_or(0.0),
                            ..Default::default()
                        })?;
                        stats.components_created += 1;
                        id
                    }
                };

                self.upsert_line(
                    project_id,
                    component_id,
                    &row.reference_designator,
                    row.quantity.max(1),
                )?;
                stats.lines_upserted += 1;
                Ok(())
            })();

            if result.is_err() {
                stats.errors += 1;
            }
        }

        Ok(stats)
    }

    /// Insert or replace the line for (project, component)
    pub fn upsert_line(
        &self,
        project_id: i64,
        component_id: i64,
        reference_designator: &str,
        quantity: i64,
    ) -> Result<(), StoreError> {
        self.store.conn().execute(
            "INSERT INTO bom (project_id, component_id, reference_designator, quantity) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(project_id, component_id) DO UPDATE SET \
                 reference_designator = excluded.reference_designator, \
                 quantity = excluded.quantity",
            params![project_id, component_id, reference_designator, quantity],
        )?;
        Ok(())
    }

    /// Lines for a project ordered by reference designator, enriched with
    /// component fields. Lines whose component was deleted still appear with
    /// the component fields absent.
    pub fn list_lines(&self, project_id: i64) -> Result<Vec<BomLine>, StoreError> {
        let mut stmt = self.store.conn().prepare(
            "SELECT b.id, b.project_id, b.component_id, b.reference_designator, b.quantity, \
                    b.do_not_populate, c.mpn, c.manufacturer, c.description, c.unit_price, \
                    c.lifecycle_status \
             FROM bom b \
             LEFT JOIN components c ON c.id = b.component_id \
             WHERE b.project_id = ?1 \
             ORDER BY b.reference_designator ASC",
        )?;
        let rows = stmt.query_map(params![project_id], bom_line_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Cost of one assembled unit: sum of quantity x unit price over all
    /// lines. 0 for an empty BOM; zero-priced and dangling components
    /// contribute 0 rather than failing.
    pub fn unit_cost(&self, project_id: i64) -> Result<f64, StoreError> {
        let cost: f64 = self.store.conn().query_row(
            "SELECT COALESCE(SUM(b.quantity * COALESCE(c.unit_price, 0)), 0) \
             FROM bom b \
             LEFT JOIN components c ON c.id = b.component_id \
             WHERE b.project_id = ?1",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(cost)
    }

    /// Set or clear the do-not-populate flag on a line
    pub fn set_dnp(&self, line_id: i64, dnp: bool) -> Result<(), StoreError> {
        let changed = self.store.conn().execute(
            "UPDATE bom SET do_not_populate = ?1 WHERE id = ?2",
            params![dnp as i64, line_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "BOM line",
                key: line_id.to_string(),
            });
        }
        Ok(())
    }

    /// Find a project's line by component MPN (for CLI line addressing)
    pub fn find_line(&self, project_id: i64, mpn: &str) -> Result<Option<BomLine>, StoreError> {
        let mut lines = self.list_lines(project_id)?;
        lines.retain(|l| l.mpn.as_deref() == Some(mpn));
        Ok(lines.pop())
    }

    /// Remove one line
    pub fn remove_line(&self, line_id: i64) -> Result<(), StoreError> {
        let changed = self
            .store
            .conn()
            .execute("DELETE FROM bom WHERE id = ?1", params![line_id])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "BOM line",
                key: line_id.to_string(),
            });
        }
        Ok(())
    }
}

fn bom_line_from_row(row: &Row<'_>) -> rusqlite::Result<BomLine> {
    let dnp: i64 = row.get(5)?;
    let lifecycle: Option<String> = row.get(10)?;
    Ok(BomLine {
        id: row.get(0)?,
        project_id: row.get(1)?,
        component_id: row.get(2)?,
        reference_designator: row.get(3)?,
        quantity: row.get(4)?,
        do_not_populate: dnp != 0,
        mpn: row.get(6)?,
        manufacturer: row.get(7)?,
        description: row.get(8)?,
        unit_price: row.get(9)?,
        lifecycle: lifecycle.and_then(|s| s.parse::<Lifecycle>().ok()),
    })
}
