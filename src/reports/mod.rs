//! The five report families. Each one filters the loaded table at fixed
//! parameter values, renders a set of PNGs into its own directory and
//! records what it wrote in a `manifest.json`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::PlotConfig;
use crate::dataset::Dataset;
use crate::metric::Metric;
use crate::output::{ensure_outdir, write_manifest_json, ReportOutput};
use crate::render::{finish, open_png, Area, Figure};
use crate::smoothing::gaussian_filter1d;
use crate::table::{Param, Series, View};

pub mod combined;
pub mod improved;
pub mod phase_diagrams;
pub mod thresholds;
pub mod transitions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    PhaseDiagrams,
    Thresholds,
    Improved,
    Transitions,
    Combined,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::PhaseDiagrams,
        ReportKind::Thresholds,
        ReportKind::Improved,
        ReportKind::Transitions,
        ReportKind::Combined,
    ];

    /// Output subdirectory under the run root.
    pub fn dir_name(self) -> &'static str {
        match self {
            ReportKind::PhaseDiagrams => "phase_diagrams",
            ReportKind::Thresholds => "threshold_analysis",
            ReportKind::Improved => "improved_visualizations",
            ReportKind::Transitions => "phase_transition_plots",
            ReportKind::Combined => "combined_phase_plots",
        }
    }

    /// The CSV export feeds the first three reports, the JSON export the rest.
    pub fn default_input(self, config: &PlotConfig) -> &Path {
        match self {
            ReportKind::PhaseDiagrams | ReportKind::Thresholds | ReportKind::Improved => {
                &config.csv_input
            }
            ReportKind::Transitions | ReportKind::Combined => &config.json_input,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReportKind::PhaseDiagrams => "phase-diagrams",
            ReportKind::Thresholds => "thresholds",
            ReportKind::Improved => "improved",
            ReportKind::Transitions => "transitions",
            ReportKind::Combined => "combined",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s || kind.dir_name() == s)
            .ok_or_else(|| format!("unknown report '{s}'"))
    }
}

/// Everything a report needs: the table, the settings and where to write.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub dataset: &'a Dataset,
    pub config: &'a PlotConfig,
    pub input: &'a Path,
    pub output_root: &'a Path,
}

impl<'a> ReportContext<'a> {
    /// Metric name as spelled by the input's columns.
    pub fn column(&self, metric: Metric) -> &'static str {
        metric.column(self.dataset.format())
    }

    fn begin(&self, kind: ReportKind) -> anyhow::Result<ReportOutput> {
        let dir = self.output_root.join(kind.dir_name());
        ensure_outdir(&dir)?;
        Ok(ReportOutput::new(kind.dir_name(), dir))
    }

    fn complete(&self, output: ReportOutput) -> anyhow::Result<ReportOutput> {
        write_manifest_json(&output, self.input)?;
        log::info!(
            "{}: {} figures, {} skipped",
            output.report,
            output.figures.len(),
            output.skipped.len()
        );
        Ok(output)
    }

    /// Renders one PNG of `width_in x height_in` inches and records it.
    fn render<F>(
        &self,
        output: &mut ReportOutput,
        file_name: &str,
        (width_in, height_in): (f64, f64),
        draw: F,
    ) -> anyhow::Result<()>
    where
        F: FnOnce(&Area<'_>, &Figure) -> anyhow::Result<()>,
    {
        let fig = Figure::new(width_in, height_in, self.config.dpi);
        let path: PathBuf = output.output_dir.join(file_name);
        let root = open_png(&path, &fig)?;
        draw(&root, &fig)?;
        finish(root, &path)?;
        output.figures.push(path);
        Ok(())
    }
}

pub fn run(kind: ReportKind, ctx: &ReportContext<'_>) -> anyhow::Result<ReportOutput> {
    match kind {
        ReportKind::PhaseDiagrams => phase_diagrams::run(ctx),
        ReportKind::Thresholds => thresholds::run(ctx),
        ReportKind::Improved => improved::run(ctx),
        ReportKind::Transitions => transitions::run(ctx),
        ReportKind::Combined => combined::run(ctx),
    }
}

/// A slice of the table along `x`, with its Gaussian-smoothed values.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedSeries {
    /// Value of the grouping parameter this slice was taken at
    pub key: f64,
    pub raw: Series,
    pub smooth: Vec<f64>,
}

impl SmoothedSeries {
    pub fn new(key: f64, raw: Series, sigma: f64) -> Self {
        let smooth = gaussian_filter1d(&raw.y, sigma);
        Self { key, raw, smooth }
    }

    pub fn smooth_points(&self) -> Vec<(f64, f64)> {
        self.raw
            .x
            .iter()
            .copied()
            .zip(self.smooth.iter().copied())
            .collect()
    }
}

/// One smoothed `x`-series per key; keys with no rows are left out.
pub fn smoothed_slices(
    view: &View<'_>,
    group: Param,
    keys: &[f64],
    x: Param,
    metric: Metric,
    sigma: f64,
) -> Vec<SmoothedSeries> {
    keys.iter()
        .filter_map(|&key| {
            let raw = view.clone().eq(group, key).series(x, metric);
            (!raw.is_empty()).then(|| SmoothedSeries::new(key, raw, sigma))
        })
        .collect()
}
