//! Project repository

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::types::Project;
use super::{parse_datetime, parse_datetime_opt, Store, StoreError};

const PROJECT_COLS: &str =
    "id, name, description, created, design_path, firmware_path, git_repo, last_opened";

pub struct ProjectRepo<'a> {
    store: &'a Store,
}

impl<'a> ProjectRepo<'a> {
    pub(super) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Create a project; name must be non-empty and unique
    pub fn create(
        &self,
        name: &str,
        description: &str,
        design_path: &str,
        firmware_path: &str,
        git_repo: &str,
    ) -> Result<i64, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::Validation(
                "project name is required".to_string(),
            ));
        }
        if self.get_by_name(name)?.is_some() {
            return Err(StoreError::Validation(format!(
                "a project named '{}' already exists",
                name
            )));
        }
        self.store.conn().execute(
            "INSERT INTO projects (name, description, created, design_path, firmware_path, git_repo) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                name.trim(),
                description,
                Utc::now().to_rfc3339(),
                design_path,
                firmware_path,
                git_repo,
            ],
        )?;
        Ok(self.store.conn().last_insert_rowid())
    }

    pub fn get(&self, id: i64) -> Result<Project, StoreError> {
        let sql = format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLS);
        self.store
            .conn()
            .query_row(&sql, params![id], project_from_row)
            .optional()?
            .ok_or(StoreError::NotFound {
                kind: "project",
                key: id.to_string(),
            })
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<Project>, StoreError> {
        let sql = format!("SELECT {} FROM projects WHERE name = ?1", PROJECT_COLS);
        Ok(self
            .store
            .conn()
            .query_row(&sql, params![name], project_from_row)
            .optional()?)
    }

    /// All projects ordered by name
    pub fn list(&self) -> Result<Vec<Project>, StoreError> {
        let sql = format!("SELECT {} FROM projects ORDER BY name ASC", PROJECT_COLS);
        let mut stmt = self.store.conn().prepare(&sql)?;
        let rows = stmt.query_map([], project_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Most recently opened projects, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<Project>, StoreError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE last_opened IS NOT NULL \
             ORDER BY last_opened DESC LIMIT ?1",
            PROJECT_COLS
        );
        let mut stmt = self.store.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], project_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Record that a project was opened now
    pub fn touch_opened(&self, id: i64) -> Result<(), StoreError> {
        let changed = self.store.conn().execute(
            "UPDATE projects SET last_opened = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "project",
                key: id.to_string(),
            });
        }
        Ok(())
    }

    /// Delete a project, cascading to its BOM lines
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let tx = self.store.conn().unchecked_transaction()?;
        tx.execute("DELETE FROM bom WHERE project_id = ?1", params![id])?;
        let changed = tx.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "project",
                key: id.to_string(),
            });
        }
        tx.commit()?;
        Ok(())
    }
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    let created: String = row.get(3)?;
    let last_opened: Option<String> = row.get(7)?;
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created: parse_datetime(&created),
        design_path: row.get(4)?,
        firmware_path: row.get(5)?,
        git_repo: row.get(6)?,
        last_opened: parse_datetime_opt(last_opened),
    })
}
