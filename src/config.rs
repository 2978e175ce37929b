use std::path::PathBuf;
use std::time::Duration;

use crate::reactive::bridge::DEFAULT_DEBOUNCE;

/// Preferred initial cell type when present in the data directory.
pub const DEFAULT_DATASET: &str = "γδTCells";

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// One table per cell type, used by the scatter pair.
    pub single_level_dir: PathBuf,
    /// Heatmap tables keyed by the same names.
    pub heatmap_dir: PathBuf,
    /// Gene columns plus `condition` and `time`, used by the brush views.
    pub global_table: PathBuf,
    pub cache: bool,
    pub debounce: Duration,
    pub initial: InitialWidgets,
}

impl DashboardConfig {
    pub fn new(
        single_level_dir: impl Into<PathBuf>,
        heatmap_dir: impl Into<PathBuf>,
        global_table: impl Into<PathBuf>,
    ) -> Self {
        Self {
            single_level_dir: single_level_dir.into(),
            heatmap_dir: heatmap_dir.into(),
            global_table: global_table.into(),
            cache: true,
            debounce: DEFAULT_DEBOUNCE,
            initial: InitialWidgets::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitialWidgets {
    pub dataset: Option<String>,
    pub circle_size: f64,
    pub opacity: f64,
    pub gene_count: i64,
    pub gene: Option<String>,
}

impl Default for InitialWidgets {
    fn default() -> Self {
        Self {
            dataset: None,
            circle_size: 20.0,
            opacity: 0.8,
            gene_count: 20,
            gene: None,
        }
    }
}
