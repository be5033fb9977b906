//! Shared helper functions for CLI commands

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::{Settings, Workspace};
use crate::store::{Lifecycle, Store};

/// Open the workspace: explicit `--workspace` root if given, otherwise walk
/// up from the current directory looking for `.pb/`
pub fn open_workspace(global: &GlobalOpts) -> Result<Workspace> {
    let ws = match &global.workspace {
        Some(root) => Workspace::at(root),
        None => Workspace::discover(),
    };
    ws.map_err(|e| miette::miette!("{}", e))
}

/// Open the workspace and its store in one step
pub fn open_store(global: &GlobalOpts) -> Result<(Workspace, Store)> {
    let ws = open_workspace(global)?;
    let store = Store::open(&ws.db_path()).map_err(|e| miette::miette!("{}", e))?;
    Ok((ws, store))
}

/// Format a price with the configured currency symbol
pub fn money(settings: &Settings, value: f64) -> String {
    format!("{}{:.2}", settings.currency_symbol(), value)
}

/// Truncate a string to max_len characters, adding "..." if truncated.
/// Counts chars, not bytes, so multibyte text never splits mid-character.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// clap value parser for lifecycle arguments
pub fn parse_lifecycle(s: &str) -> Result<Lifecycle, String> {
    s.parse()
}

/// Ask for confirmation unless `--yes` was passed
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| miette::miette!("{}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        // The cut falls inside 'µ' when slicing bytes; chars must not panic
        let desc = format!("{}µF electrolytic capacitor", "a".repeat(22));
        assert_eq!(truncate_str(&desc, 26), format!("{}µ...", "a".repeat(22)));
        assert_eq!(truncate_str("100µF", 10), "100µF");
    }

    #[test]
    fn test_money_uses_currency_symbol() {
        let mut settings = Settings::default();
        assert_eq!(money(&settings, 1.5), "$1.50");
        settings.currency = "EUR".to_string();
        assert_eq!(money(&settings, 0.0), "€0.00");
    }

    #[test]
    fn test_parse_lifecycle() {
        assert_eq!(parse_lifecycle("eol").unwrap(), Lifecycle::Eol);
        assert!(parse_lifecycle("retired").is_err());
    }
}
