// THEORY:
// The report is the machine-readable twin of the mosaic: one entry per cell, in
// the same row-major order, pairing the 1-based cell number with its dominant
// color as `#rrggbb`. It is built once from the extracted colors and never
// mutated afterwards.
//
// Serialized form is a pretty-printed JSON array (two-space indent, trailing
// newline) of `{"color": "#rrggbb", "subimage": n}` objects.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::utils::staging;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// One cell's line in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorReportEntry {
    pub color: String,
    /// 1-based cell number in row-major order.
    pub subimage: usize,
}

/// Ordered per-cell colors for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorReport {
    entries: Vec<ColorReportEntry>,
}

impl ColorReport {
    /// Pairs `colors[i - 1]` with cell number `i`.
    pub fn build(colors: &[Pixel]) -> Self {
        let entries = colors
            .iter()
            .enumerate()
            .map(|(i, color)| ColorReportEntry {
                color: color.to_hex(),
                subimage: i + 1,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ColorReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Serializes into a staged temporary file beside `path` without touching `path`.
    pub fn stage_json(&self, path: &Path) -> Result<NamedTempFile> {
        let json = self.to_json_pretty()?;
        let mut staged = staging::stage(path)?;
        staged.write_all(json.as_bytes())?;
        staged.flush()?;
        Ok(staged)
    }

    /// Stages the JSON and renames it into place.
    pub fn write_json_atomic(&self, path: &Path) -> Result<()> {
        staging::commit(self.stage_json(path)?, path)?;
        log::info!("wrote color report with {} entries to {}", self.len(), path.display());
        Ok(())
    }
}
