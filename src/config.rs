use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::colormap::Colormap;

/// A named band of initial defector ratios drawn on one subplot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioGroup {
    pub name: String,
    pub ratios: Vec<f64>,
}

impl RatioGroup {
    fn new(name: &str, ratios: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            ratios: ratios.to_vec(),
        }
    }
}

/// Runtime configuration shared by every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Default input for the CSV-driven reports
    pub csv_input: PathBuf,
    /// Default input for the JSON-driven reports
    pub json_input: PathBuf,
    /// Root under which each report creates its own directory
    pub output_root: PathBuf,
    /// Raster resolution; figure sizes are given in inches
    pub dpi: u32,
    /// Level a smoothed probability must reach to count as percolating
    pub threshold: f64,
    /// Gaussian smoothing width, in samples
    pub sigma: f64,
    /// Minimum prominence of a |d metric / d density| peak
    pub min_prominence: f64,
    /// Tolerance when selecting densities by value
    pub density_tolerance: f64,
    /// Write the value into every heatmap cell
    pub annotate_heatmaps: bool,
    /// Scale for the defector ratio x density heatmaps
    pub heatmap_cmap: Colormap,
    /// Scale for the temptation x density phase-space maps
    pub phase_space_cmap: Colormap,
    /// Scale for the 3D surfaces
    pub surface_cmap: Colormap,
    /// Temptation values for the density phase diagrams
    pub density_diagram_temptations: Vec<f64>,
    /// Agent counts for the temptation phase diagrams
    pub temptation_diagram_agent_counts: Vec<f64>,
    /// Temptation at which threshold and transition slices are taken
    pub focus_temptation: f64,
    /// Defector ratio at which density curves and phase space are taken
    pub focus_defector_ratio: f64,
    /// Densities traced against defector ratio
    pub selected_densities: Vec<f64>,
    /// Temptation values for the combined heatmap/line views
    pub combined_temptations: Vec<f64>,
    /// Defector-ratio bands for the grouped subplots
    pub ratio_groups: Vec<RatioGroup>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            csv_input: PathBuf::from("phase_diagram_results.csv"),
            json_input: PathBuf::from("phase_diagram_results.json"),
            output_root: PathBuf::from("."),
            dpi: 300,
            threshold: 0.5,
            sigma: 1.0,
            min_prominence: 0.1,
            density_tolerance: 0.01,
            annotate_heatmaps: true,
            heatmap_cmap: Colormap::RdYlBuR,
            phase_space_cmap: Colormap::RdYlBu,
            surface_cmap: Colormap::Viridis,
            density_diagram_temptations: vec![1.1, 1.3, 1.5],
            temptation_diagram_agent_counts: vec![40.0, 60.0, 80.0],
            focus_temptation: 1.7,
            focus_defector_ratio: 0.5,
            selected_densities: vec![0.2, 0.5, 0.8],
            combined_temptations: vec![1.1, 1.7, 2.0],
            ratio_groups: vec![
                RatioGroup::new("Low", &[0.1, 0.2, 0.3]),
                RatioGroup::new("Medium", &[0.4, 0.5, 0.6]),
                RatioGroup::new("High", &[0.7, 0.8, 0.9]),
            ],
        }
    }
}

impl PlotConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let cfg: PlotConfig = toml::from_str(&raw)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.dpi >= 10, "dpi must be at least 10");
        anyhow::ensure!(self.dpi <= 1200, "dpi must be at most 1200");
        anyhow::ensure!(self.threshold.is_finite(), "threshold must be finite");
        anyhow::ensure!(
            self.sigma.is_finite() && self.sigma >= 0.0,
            "sigma must be >= 0"
        );
        anyhow::ensure!(
            self.min_prominence.is_finite() && self.min_prominence >= 0.0,
            "min_prominence must be >= 0"
        );
        anyhow::ensure!(
            self.density_tolerance > 0.0,
            "density_tolerance must be > 0"
        );
        anyhow::ensure!(
            !self.ratio_groups.is_empty(),
            "at least one ratio group is required"
        );
        for group in &self.ratio_groups {
            anyhow::ensure!(
                !group.ratios.is_empty(),
                "ratio group '{}' has no ratios",
                group.name
            );
        }
        let value_lists = [
            ("density_diagram_temptations", &self.density_diagram_temptations),
            (
                "temptation_diagram_agent_counts",
                &self.temptation_diagram_agent_counts,
            ),
            ("selected_densities", &self.selected_densities),
            ("combined_temptations", &self.combined_temptations),
        ];
        for (name, values) in value_lists {
            anyhow::ensure!(
                values.iter().all(|v| v.is_finite()),
                "{name} must contain only finite values"
            );
        }
        Ok(())
    }
}
