use std::fs;
use std::path::Path;

use phase_plots::reports::{self, ReportContext, ReportKind};
use phase_plots::{Dataset, PhaseRecord, PlotConfig, SourceFormat};
use tempfile::tempdir;

fn record(temptation: f64, agent_count: f64, density: f64, ratio: f64) -> PhaseRecord {
    let p = if density >= 0.5 { 1.0 } else { 0.0 };
    PhaseRecord {
        temptation,
        agent_count: Some(agent_count),
        density,
        defector_ratio: ratio,
        avg_compliance: 1.0 - 0.5 * p,
        defector_percolation_prob: p,
        avg_largest_cluster_frac: 0.3 * p + 0.1 * ratio,
        geometric_percolation_prob: p,
    }
}

/// A sweep at parameter values none of the reports look at.
fn off_grid() -> Dataset {
    let records = [0.2, 0.4, 0.6]
        .into_iter()
        .map(|density| record(1.25, 50.0, density, 0.35))
        .collect();
    Dataset::from_records(records, SourceFormat::Csv).expect("dataset")
}

/// Agent count follows density, as on the real lattice, so every
/// (parameter, parameter) slice has at most one row per cell.
fn sweep(format: SourceFormat) -> Dataset {
    let mut records = Vec::new();
    for temptation in [1.1, 1.7, 2.0] {
        for ratio in [0.1, 0.2, 0.5, 0.8] {
            for density in [0.2, 0.4, 0.5, 0.6, 0.8] {
                let agents = (density * 100.0_f64).round();
                records.push(record(temptation, agents, density, ratio));
            }
        }
    }
    Dataset::from_records(records, format).expect("dataset")
}

fn manifest(dir: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(dir.join("manifest.json")).expect("manifest");
    serde_json::from_str(&raw).expect("manifest json")
}

#[test]
fn phase_diagrams_skip_every_missing_slice() {
    let data = off_grid();
    let cfg = PlotConfig::default();
    let root = tempdir().expect("tempdir");
    let ctx = ReportContext {
        dataset: &data,
        config: &cfg,
        input: Path::new("phase_diagram_results.csv"),
        output_root: root.path(),
    };

    let output = reports::run(ReportKind::PhaseDiagrams, &ctx).expect("report");
    assert!(output.figures.is_empty());
    // 3 temptations + 3 agent counts, four metrics each.
    assert_eq!(output.skipped.len(), 24);
    assert_eq!(output.output_dir, root.path().join("phase_diagrams"));

    let written = manifest(&output.output_dir);
    assert_eq!(written["report"], "phase_diagrams");
    assert_eq!(written["skipped"].as_array().map(Vec::len), Some(24));
}

#[test]
fn threshold_report_without_focus_rows_writes_empty_findings() {
    let data = off_grid();
    let cfg = PlotConfig::default();
    let root = tempdir().expect("tempdir");
    let ctx = ReportContext {
        dataset: &data,
        config: &cfg,
        input: Path::new("phase_diagram_results.csv"),
        output_root: root.path(),
    };

    let output = reports::run(ReportKind::Thresholds, &ctx).expect("report");
    assert!(output.figures.is_empty());
    assert!(output.thresholds.is_empty());
    // threshold curves for the two probabilities, density curves and phase
    // space for all four metrics.
    assert_eq!(output.skipped.len(), 10);
    assert!(output.output_dir.join("thresholds.csv").is_file());
    assert!(output.output_dir.join("manifest.json").is_file());
}

#[test]
fn combined_and_transition_reports_skip_absent_temptations() {
    let data = off_grid();
    let cfg = PlotConfig::default();
    let root = tempdir().expect("tempdir");
    let ctx = ReportContext {
        dataset: &data,
        config: &cfg,
        input: Path::new("phase_diagram_results.json"),
        output_root: root.path(),
    };

    let combined = reports::run(ReportKind::Combined, &ctx).expect("combined");
    assert!(combined.figures.is_empty());
    assert_eq!(combined.skipped.len(), 12);

    let improved = reports::run(ReportKind::Improved, &ctx).expect("improved");
    assert!(improved.figures.is_empty());
    assert_eq!(improved.skipped.len(), 12);
}

#[test]
fn every_report_renders_its_figures() {
    let cfg = PlotConfig {
        dpi: 30,
        ..PlotConfig::default()
    };
    let root = tempdir().expect("tempdir");

    let csv = sweep(SourceFormat::Csv);
    let json = sweep(SourceFormat::Json);
    for kind in ReportKind::ALL {
        let data = match kind.default_input(&cfg).extension().and_then(|e| e.to_str()) {
            Some("json") => &json,
            _ => &csv,
        };
        let ctx = ReportContext {
            dataset: data,
            config: &cfg,
            input: kind.default_input(&cfg),
            output_root: root.path(),
        };
        let output = reports::run(kind, &ctx).expect("report");
        assert!(!output.figures.is_empty(), "{kind} wrote nothing");
        for figure in &output.figures {
            assert!(figure.is_file(), "missing {}", figure.display());
        }
    }

    let diagrams = root.path().join("phase_diagrams");
    for n in ["40", "60", "80"] {
        assert!(diagrams.join(format!("phase_temptation_avgCompliance_N{n}.png")).is_file());
    }

    let thresholds = root.path().join("threshold_analysis");
    assert!(thresholds.join("threshold_defectorPercolationProb_T1.7.png").is_file());
    assert!(thresholds.join("phase_space_avgCompliance_DR0.5.png").is_file());
    let transitions = root.path().join("phase_transition_plots");
    assert!(transitions.join("phase_diagram_avg_compliance.png").is_file());
    assert!(transitions.join("avg_compliance_vs_defector_ratio.png").is_file());
    let combined = root.path().join("combined_phase_plots");
    assert!(combined.join("combined_geometric_percolation_prob_T2.0.png").is_file());
}
