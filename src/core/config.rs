//! Settings management with layered hierarchy
//!
//! Settings live in `.pb/settings.json`. A missing file yields defaults; a
//! malformed file is skipped. Layering is per key: built-in defaults, then
//! the global file in the user config directory, then the workspace file,
//! each overriding only the keys it actually sets.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::Workspace;

/// Maximum number of entries kept in the recent-projects list
const RECENT_PROJECTS_CAP: usize = 10;

/// Workbench settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// UI theme hint: "dark" or "light"
    pub theme: String,

    /// Whether timed backups are enabled
    pub auto_backup: bool,

    /// Backup interval in minutes
    pub backup_interval: u32,

    /// API key for Octopart price lookups
    pub octopart_api_key: String,

    /// API key for JLCPCB price lookups
    pub jlcpcb_api_key: String,

    /// ISO currency code used in reports
    pub currency: String,

    /// Markup factor applied to report cost projections
    pub default_markup: f64,

    /// Show lifecycle alerts in the alerts view
    pub warn_obsolete: bool,

    /// Show low-stock alerts in the alerts view
    pub warn_low_stock: bool,

    /// Recently opened project names, most recent first
    pub recent_projects: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            auto_backup: true,
            backup_interval: 30,
            octopart_api_key: String::new(),
            jlcpcb_api_key: String::new(),
            currency: "USD".to_string(),
            default_markup: 1.0,
            warn_obsolete: true,
            warn_low_stock: true,
            recent_projects: Vec::new(),
        }
    }
}

/// Settings as they appear on disk: every key optional, so a file that sets
/// only `currency` overrides only `currency`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    theme: Option<String>,
    auto_backup: Option<bool>,
    backup_interval: Option<u32>,
    octopart_api_key: Option<String>,
    jlcpcb_api_key: Option<String>,
    currency: Option<String>,
    default_markup: Option<f64>,
    warn_obsolete: Option<bool>,
    warn_low_stock: Option<bool>,
    recent_projects: Option<Vec<String>>,
}

impl SettingsFile {
    /// Overlay the keys this file sets onto `settings`
    fn apply(self, settings: &mut Settings) {
        if let Some(v) = self.theme {
            settings.theme = v;
        }
        if let Some(v) = self.auto_backup {
            settings.auto_backup = v;
        }
        if let Some(v) = self.backup_interval {
            settings.backup_interval = v;
        }
        if let Some(v) = self.octopart_api_key {
            settings.octopart_api_key = v;
        }
        if let Some(v) = self.jlcpcb_api_key {
            settings.jlcpcb_api_key = v;
        }
        if let Some(v) = self.currency {
            settings.currency = v;
        }
        if let Some(v) = self.default_markup {
            settings.default_markup = v;
        }
        if let Some(v) = self.warn_obsolete {
            settings.warn_obsolete = v;
        }
        if let Some(v) = self.warn_low_stock {
            settings.warn_low_stock = v;
        }
        if let Some(v) = self.recent_projects {
            settings.recent_projects = v;
        }
    }
}

impl Settings {
    /// Load settings for a workspace, merging layers key by key:
    /// defaults, then the global user file, then the workspace file
    pub fn load(workspace: &Workspace) -> Self {
        let mut settings = Settings::default();

        // Global user settings (~/.config/pb/settings.json)
        if let Some(global_path) = Self::global_settings_path() {
            if let Some(layer) = Self::read_file(&global_path) {
                layer.apply(&mut settings);
            }
        }

        // Workspace settings (.pb/settings.json)
        if let Some(layer) = Self::read_file(&workspace.settings_path()) {
            layer.apply(&mut settings);
        }

        settings
    }

    /// Read and parse a settings file; any failure yields None
    fn read_file(path: &Path) -> Option<SettingsFile> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Save settings to the workspace settings file
    pub fn save(&self, workspace: &Workspace) -> std::io::Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(workspace.settings_path(), contents)
    }

    /// Get the path to the global settings file
    fn global_settings_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pb")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Record a project as most recently opened
    pub fn mark_project_opened(&mut self, name: &str) {
        self.recent_projects.retain(|p| p != name);
        self.recent_projects.insert(0, name.to_string());
        self.recent_projects.truncate(RECENT_PROJECTS_CAP);
    }

    /// Currency symbol for display; falls back to the ISO code
    pub fn currency_symbol(&self) -> String {
        match self.currency.as_str() {
            "USD" => "$".to_string(),
            "EUR" => "€".to_string(),
            "GBP" => "£".to_string(),
            "JPY" => "¥".to_string(),
            other => format!("{} ", other),
        }
    }
}
