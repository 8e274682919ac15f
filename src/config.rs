use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Optional override file looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Fixed parameters of the dashboard. Every field has a default, so a
/// config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset loaded at startup.
    pub data_path: PathBuf,
    /// Establishment year of the outlet analysed on its own.
    pub focus_year: i64,
    /// Categories shown in ranked charts.
    pub chart_top_n: usize,
    /// Categories listed in the focus-year table.
    pub table_top_n: usize,
    /// Rows shown by the data preview.
    pub preview_rows: usize,
    /// Category written into empty `OutletSize` cells.
    pub outlet_size_fill: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("Products.csv"),
            focus_year: 1985,
            chart_top_n: 12,
            table_top_n: 16,
            preview_rows: 15,
            outlet_size_fill: "Средний".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Read `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            log::info!("Using config from {}", path.display());
            Self::from_file(path)
        } else {
            log::debug!("No {} found, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
