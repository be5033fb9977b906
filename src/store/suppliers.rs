//! Supplier repository: suppliers and their per-component offers

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::types::{Supplier, SupplierOffer};
use super::{parse_datetime, Store, StoreError};

/// Supplier-specific terms for one component
#[derive(Debug, Clone, Default)]
pub struct NewOffer {
    pub supplier_mpn: String,
    pub price: Option<f64>,
    pub moq: Option<i64>,
    pub lead_time_days: Option<i64>,
}

pub struct SupplierRepo<'a> {
    store: &'a Store,
}

impl<'a> SupplierRepo<'a> {
    pub(super) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a supplier; name must be non-empty and unique
    pub fn add(
        &self,
        name: &str,
        website: &str,
        contact: &str,
        notes: &str,
    ) -> Result<i64, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::Validation(
                "supplier name is required".to_string(),
            ));
        }
        if self.get_by_name(name)?.is_some() {
            return Err(StoreError::Validation(format!(
                "a supplier named '{}' already exists",
                name
            )));
        }
        self.store.conn().execute(
            "INSERT INTO suppliers (name, website, contact, notes) VALUES (?1, ?2, ?3, ?4)",
            params![name.trim(), website, contact, notes],
        )?;
        Ok(self.store.conn().last_insert_rowid())
    }

    pub fn get(&self, id: i64) -> Result<Supplier, StoreError> {
        self.store
            .conn()
            .query_row(
                "SELECT id, name, website, contact, notes FROM suppliers WHERE id = ?1",
                params![id],
                supplier_from_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound {
                kind: "supplier",
                key: id.to_string(),
            })
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<Supplier>, StoreError> {
        Ok(self
            .store
            .conn()
            .query_row(
                "SELECT id, name, website, contact, notes FROM suppliers WHERE name = ?1",
                params![name],
                supplier_from_row,
            )
            .optional()?)
    }

    /// All suppliers ordered by name
    pub fn list(&self) -> Result<Vec<Supplier>, StoreError> {
        let mut stmt = self
            .store
            .conn()
            .prepare("SELECT id, name, website, contact, notes FROM suppliers ORDER BY name ASC")?;
        let rows = stmt.query_map([], supplier_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Remove a supplier and its offers
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.store.conn().execute(
            "DELETE FROM component_suppliers WHERE supplier_id = ?1",
            params![id],
        )?;
        let changed = self
            .store
            .conn()
            .execute("DELETE FROM suppliers WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "supplier",
                key: id.to_string(),
            });
        }
        Ok(())
    }

    /// Upsert a supplier's offer for a component; one offer per
    /// (component, supplier) pair, last_updated refreshed on every write
    pub fn link(
        &self,
        component_id: i64,
        supplier_id: i64,
        offer: &NewOffer,
    ) -> Result<(), StoreError> {
        // Validate both ends so the join table cannot accumulate orphans
        let component_exists: bool = self.store.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM components WHERE id = ?1)",
            params![component_id],
            |row| row.get(0),
        )?;
        if !component_exists {
            return Err(StoreError::NotFound {
                kind: "component",
                key: component_id.to_string(),
            });
        }
        self.get(supplier_id)?;

        self.store.conn().execute(
            "INSERT INTO component_suppliers \
                 (component_id, supplier_id, supplier_mpn, price, moq, lead_time_days, last_updated) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(component_id, supplier_id) DO UPDATE SET \
                 supplier_mpn = excluded.supplier_mpn, \
                 price = excluded.price, \
                 moq = excluded.moq, \
                 lead_time_days = excluded.lead_time_days, \
                 last_updated = excluded.last_updated",
            params![
                component_id,
                supplier_id,
                offer.supplier_mpn,
                offer.price,
                offer.moq,
                offer.lead_time_days,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Offers for a component, enriched with supplier names, best price first
    pub fn offers_for(&self, component_id: i64) -> Result<Vec<SupplierOffer>, StoreError> {
        let mut stmt = self.store.conn().prepare(
            "SELECT cs.id, cs.component_id, cs.supplier_id, s.name, cs.supplier_mpn, \
                    cs.price, cs.moq, cs.lead_time_days, cs.last_updated \
             FROM component_suppliers cs \
             JOIN suppliers s ON s.id = cs.supplier_id \
             WHERE cs.component_id = ?1 \
             ORDER BY cs.price IS NULL, cs.price ASC",
        )?;
        let rows = stmt.query_map(params![component_id], |row| {
            let last_updated: String = row.get(8)?;
            Ok(SupplierOffer {
                id: row.get(0)?,
                component_id: row.get(1)?,
                supplier_id: row.get(2)?,
                supplier_name: row.get(3)?,
                supplier_mpn: row.get(4)?,
                price: row.get(5)?,
                moq: row.get(6)?,
                lead_time_days: row.get(7)?,
                last_updated: parse_datetime(&last_updated),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn supplier_from_row(row: &Row<'_>) -> rusqlite::Result<Supplier> {
    Ok(Supplier {
        id: row.get(0)?,
        name: row.get(1)?,
        website: row.get(2)?,
        contact: row.get(3)?,
        notes: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewComponent;

    fn store_with_component() -> (Store, i64) {
        let store = Store::open_in_memory().unwrap();
        let id = store
            .components()
            .add(&NewComponent {
                mpn: "R1K".to_string(),
                manufacturer: "Yageo".to_string(),
                ..Default::default()
            })
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_add_and_list() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.suppliers();
        repo.add("Mouser", "https://mouser.com", "", "").unwrap();
        repo.add("Digi-Key", "https://digikey.com", "", "").unwrap();

        let names: Vec<String> = repo.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Digi-Key", "Mouser"]);
    }

    #[test]
    fn test_duplicate_name_fails() {
        let store = Store::open_in_memory().unwrap();
        let repo = store.suppliers();
        repo.add("Mouser", "", "", "").unwrap();
        assert!(matches!(
            repo.add("Mouser", "", "", "").unwrap_err(),
            StoreError::Validation(_)
        ));
    }

    #[test]
    fn test_link_upserts_offer() {
        let (store, cmp_id) = store_with_component();
        let repo = store.suppliers();
        let sup_id = repo.add("Mouser", "", "", "").unwrap();

        repo.link(
            cmp_id,
            sup_id,
            &NewOffer {
                supplier_mpn: "603-RC0402-1K".to_string(),
                price: Some(0.012),
                moq: Some(100),
                lead_time_days: Some(5),
            },
        )
        .unwrap();

        // Second link for the same pair replaces, not duplicates
        repo.link(
            cmp_id,
            sup_id,
            &NewOffer {
                supplier_mpn: "603-RC0402-1K".to_string(),
                price: Some(0.010),
                moq: Some(100),
                lead_time_days: Some(7),
            },
        )
        .unwrap();

        let offers = repo.offers_for(cmp_id).unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].price, Some(0.010));
        assert_eq!(offers[0].lead_time_days, Some(7));
        assert_eq!(offers[0].supplier_name, "Mouser");
    }

    #[test]
    fn test_link_to_missing_component_fails() {
        let store = Store::open_in_memory().unwrap();
        let sup_id = store.suppliers().add("Mouser", "", "", "").unwrap();
        let err = store
            .suppliers()
            .link(999, sup_id, &NewOffer::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_delete_removes_supplier_and_offers() {
        let (store, cmp_id) = store_with_component();
        let repo = store.suppliers();
        let sup_id = repo.add("Mouser", "", "", "").unwrap();
        repo.link(cmp_id, sup_id, &NewOffer::default()).unwrap();

        repo.delete(sup_id).unwrap();
        assert!(repo.offers_for(cmp_id).unwrap().is_empty());
        assert!(matches!(
            repo.get(sup_id).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }
}
