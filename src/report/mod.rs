//! HTML BOM report generation
//!
//! Renders a project's BOM, per-line extended prices, and unit/10x/100x cost
//! projections into a static HTML document via an embedded tera template.

use chrono::{DateTime, Utc};
use rust_embed::RustEmbed;
use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::core::Settings;
use crate::store::{BomLine, Lifecycle, Project};

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Templates;

/// Errors from report rendering
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("missing embedded template: {0}")]
    MissingTemplate(String),

    #[error("template rendering failed: {0}")]
    Render(#[from] tera::Error),
}

/// Renders BOM reports from embedded templates
pub struct ReportGenerator {
    tera: Tera,
}

/// One rendered BOM line, pre-formatted for the template
#[derive(Serialize)]
struct ReportRow {
    reference: String,
    mpn: String,
    manufacturer: String,
    description: String,
    quantity: i64,
    unit_price: String,
    extended: String,
    lifecycle: String,
    row_class: &'static str,
    dnp: bool,
}

const BOM_TEMPLATE: &str = "bom_report.html.tera";

impl ReportGenerator {
    pub fn new() -> Result<Self, ReportError> {
        let mut tera = Tera::default();
        let raw = Templates::get(BOM_TEMPLATE)
            .ok_or_else(|| ReportError::MissingTemplate(BOM_TEMPLATE.to_string()))?;
        let contents = String::from_utf8_lossy(raw.data.as_ref()).to_string();
        tera.add_raw_template(BOM_TEMPLATE, &contents)?;
        Ok(Self { tera })
    }

    /// Render the BOM report for a project.
    ///
    /// An empty BOM is a valid zero-cost report, not an error. Obsolete rows
    /// and EOL/NRND rows get distinct visual flagging.
    pub fn render_bom(
        &self,
        project: &Project,
        lines: &[BomLine],
        settings: &Settings,
        generated: DateTime<Utc>,
    ) -> Result<String, ReportError> {
        let mut rows = Vec::with_capacity(lines.len());
        let mut unit_cost = 0.0;

        for line in lines {
            let extended = line.extended_price();
            unit_cost += extended;

            rows.push(ReportRow {
                reference: line.reference_designator.clone(),
                mpn: line
                    .mpn
                    .clone()
                    .unwrap_or_else(|| "(missing)".to_string()),
                manufacturer: line.manufacturer.clone().unwrap_or_default(),
                description: line.description.clone().unwrap_or_default(),
                quantity: line.quantity,
                unit_price: money(line.unit_price.unwrap_or(0.0)),
                extended: money(extended),
                lifecycle: lifecycle_label(line.lifecycle),
                row_class: lifecycle_row_class(line.lifecycle),
                dnp: line.do_not_populate,
            });
        }

        let markup = if settings.default_markup > 0.0 {
            settings.default_markup
        } else {
            1.0
        };

        let mut context = tera::Context::new();
        context.insert("project_name", &project.name);
        context.insert("project_description", &project.description);
        context.insert("generated", &generated.format("%Y-%m-%d %H:%M UTC").to_string());
        context.insert("currency", &settings.currency);
        context.insert("symbol", &settings.currency_symbol());
        context.insert("rows", &rows);
        context.insert("line_count", &lines.len());
        context.insert("unit_cost", &money(unit_cost * markup));
        context.insert("cost_10x", &money(unit_cost * markup * 10.0));
        context.insert("cost_100x", &money(unit_cost * markup * 100.0));
        context.insert("markup", &markup);
        context.insert("markup_applied", &(markup != 1.0));

        Ok(self.tera.render(BOM_TEMPLATE, &context)?)
    }
}

/// Report file name for a project: sanitized name plus date
pub fn report_file_name(project_name: &str, date: DateTime<Utc>) -> String {
    let safe: String = project_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}_{}.html", safe, date.format("%Y-%m-%d"))
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn lifecycle_label(lifecycle: Option<Lifecycle>) -> String {
    lifecycle.map(|lc| lc.as_str().to_string()).unwrap_or_default()
}

/// CSS class per row: obsolete parts get the strongest treatment, EOL/NRND a
/// softer warning, active/unset rows none
fn lifecycle_row_class(lifecycle: Option<Lifecycle>) -> &'static str {
    match lifecycle {
        Some(Lifecycle::Obsolete) => "obsolete",
        Some(Lifecycle::Eol) | Some(Lifecycle::Nrnd) => "at-risk",
        _ => "",
    }
}
