//! CLI presentation: text and json formatters for run summaries and datasets.

use crate::error::MrdError;
use crate::orchestrator::RunSummary;
use crate::store::DatasetRecord;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use ndarray::{Array3, Axis};
use owo_colors::OwoColorize;
use serde_json::json;

fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_run_summary(summary: &RunSummary, store_path: &str) -> String {
    let (l1, _, n) = summary.shape;
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Shape".to_string(), format!("({}, {}, {})", l1, l1, n)]);
    table.add_row(vec!["Groups".to_string(), summary.num_groups.to_string()]);
    table.add_row(vec!["Contexts".to_string(), summary.num_contexts.to_string()]);
    table.add_row(vec!["Work units".to_string(), summary.num_units.to_string()]);
    table.add_row(vec!["Total rate".to_string(), format!("{:.6e}", summary.total_rate)]);
    table.add_row(vec!["Elapsed".to_string(), format!("{} ms", summary.elapsed_ms)]);
    table.add_row(vec!["Store".to_string(), store_path.to_string()]);
    format!("{}\n\n{}", format_section_heading("Mean rate distribution"), table)
}

/// Sum over both intensity axes, one value per site.
fn site_totals(array: &Array3<f64>) -> Vec<f64> {
    array
        .axis_iter(Axis(2))
        .map(|site| site.sum())
        .collect()
}

pub fn format_dataset_text(record: &DatasetRecord) -> Result<String, MrdError> {
    let array = record.to_array()?;
    let [a, b, c] = record.shape;

    let mut out = format!("{}\n\n", format_section_heading(&format!("Dataset {}", record.name)));
    out.push_str(&format!("Shape:   ({}, {}, {})\n", a, b, c));
    out.push_str(&format!("Created: {}\n\n", record.created_at.to_rfc3339()));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Site", "Total rate", "Max cell"]);
    for (sid, (total, site)) in site_totals(&array)
        .into_iter()
        .zip(array.axis_iter(Axis(2)))
        .enumerate()
    {
        let max_cell = site.iter().copied().fold(0.0_f64, f64::max);
        table.add_row(vec![
            sid.to_string(),
            format!("{:.6e}", total),
            format!("{:.6e}", max_cell),
        ]);
    }
    out.push_str(&format!("{}", table));
    Ok(out)
}

pub fn format_dataset_json(record: &DatasetRecord) -> Result<String, MrdError> {
    let array = record.to_array()?;
    let out = json!({
        "name": record.name,
        "shape": record.shape,
        "created_at": record.created_at.to_rfc3339(),
        "site_totals": site_totals(&array),
        "values": record.values,
    });
    serde_json::to_string_pretty(&out)
        .map_err(|e| MrdError::config(format!("Failed to render dataset: {}", e)))
}
