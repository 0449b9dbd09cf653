use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdRow {
    pub metric: String,
    pub temptation: f64,
    pub defector_ratio: f64,
    pub density_threshold: f64,
}

/// What one report wrote and found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportOutput {
    pub report: String,
    pub output_dir: PathBuf,
    pub figures: Vec<PathBuf>,
    pub skipped: Vec<String>,
    pub thresholds: Vec<ThresholdRow>,
}

impl ReportOutput {
    pub fn new(report: &str, output_dir: PathBuf) -> Self {
        Self {
            report: report.to_string(),
            output_dir,
            ..Self::default()
        }
    }

    pub fn skip(&mut self, what: String) {
        log::warn!("{}: skipped {what}", self.report);
        self.skipped.push(what);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Manifest<'a> {
    pub report: &'a str,
    pub input: &'a Path,
    pub generated_at: String,
    pub figures: Vec<String>,
    pub skipped: &'a [String],
}

pub fn ensure_outdir(outdir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(outdir)
        .with_context(|| format!("failed to create output directory: {}", outdir.display()))
}

/// `<root>/<UTC timestamp>`, suffixed `-NN` if a run already claimed it.
pub fn create_timestamped_output_dir(root: &Path) -> anyhow::Result<PathBuf> {
    ensure_outdir(root)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = root.join(&timestamp);
    let mut counter = 1_u32;

    while output_dir.exists() {
        output_dir = root.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    ensure_outdir(&output_dir)?;
    Ok(output_dir)
}

pub fn write_manifest_json(output: &ReportOutput, input: &Path) -> anyhow::Result<PathBuf> {
    let path = output.output_dir.join("manifest.json");
    let manifest = Manifest {
        report: &output.report,
        input,
        generated_at: Utc::now().to_rfc3339(),
        figures: output
            .figures
            .iter()
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect(),
        skipped: &output.skipped,
    };
    let payload = serde_json::to_string_pretty(&manifest).context("failed to serialize manifest")?;
    fs::write(&path, payload)
        .with_context(|| format!("failed to write manifest: {}", path.display()))?;
    Ok(path)
}

pub fn write_thresholds_csv(path: &Path, rows: &[ThresholdRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open CSV path {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Float as it appears in file names and titles: `1.1`, `1.7`, `2.0`.
pub fn fmt_param(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Counts print without a decimal point: `40`, not `40.0`.
pub fn fmt_count(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
