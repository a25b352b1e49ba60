//! Output rendering for CLI commands
//!
//! Table output mirrors the printer columns of the source CRDs; yaml and
//! json print the objects themselves.

use crate::config::OutputFormat;
use crate::manifest::{self, SourceManifest};
use crate::watcher::SourceInfo;
use anyhow::{Context, Result};

const HEADERS: [&str; 5] = ["NAME", "KIND", "READY", "STATUS", "URL"];

/// Render source rows as an aligned table
pub fn render_table(rows: &[SourceInfo], no_headers: bool) -> String {
    let cells: Vec<[String; 5]> = rows.iter().map(row_cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    if !no_headers {
        push_line(&mut out, &HEADERS.map(str::to_string), &widths);
    }
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn row_cells(info: &SourceInfo) -> [String; 5] {
    [
        info.name.clone(),
        info.kind.to_string(),
        info.ready
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string()),
        info.message.clone(),
        info.url.clone(),
    ]
}

fn push_line(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let last = cells.len() - 1;
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
        if i == last {
            line.push_str(cell);
        } else {
            line.push_str(&format!("{:<width$}   ", cell, width = width));
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Render manifests in the requested format
pub fn render_manifests(
    manifests: &[SourceManifest],
    format: OutputFormat,
    no_headers: bool,
) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<SourceInfo> = manifests.iter().map(SourceInfo::from_manifest).collect();
            Ok(render_table(&rows, no_headers))
        }
        OutputFormat::Yaml => {
            manifest::to_yaml_stream(manifests).context("Failed to serialize sources to YAML")
        }
        OutputFormat::Json => {
            let values = manifests
                .iter()
                .map(SourceManifest::to_json)
                .collect::<serde_json::Result<Vec<_>>>()
                .context("Failed to serialize sources to JSON")?;
            let doc = match values.as_slice() {
                [single] => single.clone(),
                _ => serde_json::Value::Array(values),
            };
            let mut json =
                serde_json::to_string_pretty(&doc).context("Failed to serialize sources to JSON")?;
            json.push('\n');
            Ok(json)
        }
    }
}
