//! Database schema
//!
//! Created idempotently on every open. The UNIQUE pair on bom backs the
//! replace-on-import semantics; the UNIQUE pair on component_suppliers backs
//! offer upserts.
//!
//! component_id columns carry no FOREIGN KEY clause: the bundled SQLite
//! enforces declared keys, and deleting a component must leave its price
//! history, offers, and BOM lines dangling rather than fail. Deletes that do
//! clean up children (projects, suppliers) do it in application code.

pub(super) const SCHEMA_SQL: &str = r#"
    -- Purchasable parts, identified by manufacturer part number
    CREATE TABLE IF NOT EXISTS components (
        id INTEGER PRIMARY KEY,
        mpn TEXT UNIQUE NOT NULL,
        manufacturer TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        category TEXT NOT NULL DEFAULT '',
        stock_qty INTEGER NOT NULL DEFAULT 0,
        min_stock INTEGER NOT NULL DEFAULT 0,
        unit_price REAL NOT NULL DEFAULT 0,
        lifecycle_status TEXT,
        last_checked TEXT,
        datasheet_url TEXT,
        notes TEXT NOT NULL DEFAULT '',
        footprint TEXT NOT NULL DEFAULT '',
        created TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_components_category ON components(category);
    CREATE INDEX IF NOT EXISTS idx_components_lifecycle ON components(lifecycle_status);

    -- Immutable price observations, append-only
    CREATE TABLE IF NOT EXISTS price_history (
        id INTEGER PRIMARY KEY,
        component_id INTEGER NOT NULL,
        price REAL NOT NULL,
        date TEXT NOT NULL,
        source TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_price_history_component ON price_history(component_id);

    CREATE TABLE IF NOT EXISTS suppliers (
        id INTEGER PRIMARY KEY,
        name TEXT UNIQUE NOT NULL,
        website TEXT NOT NULL DEFAULT '',
        contact TEXT NOT NULL DEFAULT '',
        notes TEXT NOT NULL DEFAULT ''
    );

    -- Supplier-specific offer for a component
    CREATE TABLE IF NOT EXISTS component_suppliers (
        id INTEGER PRIMARY KEY,
        component_id INTEGER NOT NULL,
        supplier_id INTEGER NOT NULL,
        supplier_mpn TEXT NOT NULL DEFAULT '',
        price REAL,
        moq INTEGER,
        lead_time_days INTEGER,
        last_updated TEXT NOT NULL,
        UNIQUE(component_id, supplier_id),
        FOREIGN KEY (supplier_id) REFERENCES suppliers(id)
    );

    CREATE TABLE IF NOT EXISTS projects (
        id INTEGER PRIMARY KEY,
        name TEXT UNIQUE NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        created TEXT NOT NULL,
        design_path TEXT NOT NULL DEFAULT '',
        firmware_path TEXT NOT NULL DEFAULT '',
        git_repo TEXT NOT NULL DEFAULT '',
        last_opened TEXT
    );

    -- BOM line items; one row per (project, component)
    CREATE TABLE IF NOT EXISTS bom (
        id INTEGER PRIMARY KEY,
        project_id INTEGER NOT NULL,
        component_id INTEGER NOT NULL,
        reference_designator TEXT NOT NULL DEFAULT '',
        quantity INTEGER NOT NULL DEFAULT 1,
        do_not_populate INTEGER NOT NULL DEFAULT 0,
        UNIQUE(project_id, component_id),
        FOREIGN KEY (project_id) REFERENCES projects(id)
    );
    CREATE INDEX IF NOT EXISTS idx_bom_project ON bom(project_id);

    -- Append-only audit trail; write-only from the application
    CREATE TABLE IF NOT EXISTS activity_log (
        id INTEGER PRIMARY KEY,
        timestamp TEXT NOT NULL,
        action TEXT NOT NULL,
        details TEXT NOT NULL DEFAULT ''
    );
"#;
