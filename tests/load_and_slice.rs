use std::fs;

use approx::assert_relative_eq;
use phase_plots::reports::thresholds::{crossings, steepest_points};
use phase_plots::reports::smoothed_slices;
use phase_plots::{DataError, Dataset, Metric, Param, SourceFormat};
use tempfile::tempdir;

const CSV: &str = "\
temptation,agentCount,density,defectorRatio,avgCompliance,defectorPercolationProb,avgLargestClusterFrac,geometricPercolationProb,runs
1.7,40,0.1,0.5,0.95,0.0,0.05,0.0,20
1.7,40,0.2,0.5,0.90,0.0,0.08,0.05,20
1.7,40,0.3,0.5,0.70,0.2,0.20,0.30,20
1.7,40,0.4,0.5,0.40,0.8,0.55,0.85,20
1.7,40,0.5,0.5,0.20,1.0,0.80,1.0,20
1.7,40,0.6,0.5,0.10,1.0,0.90,1.0,20
1.1,40,0.1,0.5,0.99,0.0,0.01,0.0,20
";

#[test]
fn csv_with_extra_columns_loads() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("phase_diagram_results.csv");
    fs::write(&path, CSV).expect("write csv");

    let data = Dataset::load(&path).expect("load");
    assert_eq!(data.len(), 7);
    assert_eq!(data.format(), SourceFormat::Csv);
    assert_eq!(data.records()[0].agent_count, Some(40.0));
    assert_eq!(data.unique(Param::Temptation), vec![1.1, 1.7]);
    assert_eq!(Metric::DefectorPercolation.column(data.format()), "defectorPercolationProb");
}

#[test]
fn json_wrapped_and_bare_arrays_load() {
    let dir = tempdir().expect("tempdir");
    let row = r#"{"temptation": 1.7, "density": 0.2, "defector_ratio": 0.5,
        "avg_compliance": 0.9, "defector_percolation_prob": 0.1,
        "avg_largest_cluster_frac": 0.2, "geometric_percolation_prob": 0.3}"#;

    let wrapped = dir.path().join("wrapped.json");
    fs::write(&wrapped, format!(r#"{{"results": [{row}], "meta": {{}}}}"#)).expect("write");
    let bare = dir.path().join("bare.json");
    fs::write(&bare, format!("[{row}, {row}]")).expect("write");

    let a = Dataset::load(&wrapped).expect("wrapped");
    let b = Dataset::load(&bare).expect("bare");
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 2);
    assert_eq!(a.format(), SourceFormat::Json);
    assert_eq!(a.records()[0].agent_count, None);
    assert_eq!(Metric::Compliance.column(a.format()), "avg_compliance");
}

#[test]
fn bad_inputs_surface_typed_errors() {
    let dir = tempdir().expect("tempdir");

    let txt = dir.path().join("results.txt");
    fs::write(&txt, CSV).expect("write");
    assert!(matches!(Dataset::load(&txt), Err(DataError::UnsupportedFormat(_))));

    let empty = dir.path().join("empty.json");
    fs::write(&empty, r#"{"results": []}"#).expect("write");
    assert!(matches!(Dataset::load(&empty), Err(DataError::Empty(_))));

    let broken = dir.path().join("broken.csv");
    fs::write(&broken, "temptation,density\n1.7,abc\n").expect("write");
    assert!(matches!(Dataset::load(&broken), Err(DataError::Csv(_))));

    let absent = dir.path().join("absent.csv");
    match Dataset::load(&absent) {
        Err(DataError::Io { path, .. }) => assert_eq!(path, absent),
        other => panic!("expected an io error, got {other:?}"),
    }
    let err = Dataset::load(&absent).unwrap_err().to_string();
    assert!(err.contains("absent.csv"), "{err}");

    let unwrapped = dir.path().join("unwrapped.json");
    fs::write(&unwrapped, r#"{"rows": []}"#).expect("write");
    assert!(matches!(Dataset::load(&unwrapped), Err(DataError::MissingResults(_))));
}

#[test]
fn percolation_threshold_found_on_the_rising_front() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("phase_diagram_results.csv");
    fs::write(&path, CSV).expect("write csv");
    let data = Dataset::load(&path).expect("load");

    let view = data.filter(Param::Temptation, 1.7);
    let ratios = data.unique(Param::DefectorRatio);
    let slices = smoothed_slices(
        &view,
        Param::DefectorRatio,
        &ratios,
        Param::Density,
        Metric::DefectorPercolation,
        1.0,
    );
    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].raw.x, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);

    let found = crossings(&slices, 0.5, 1.0);
    assert_eq!(found.len(), 1);
    assert_relative_eq!(found[0].0, 0.5);
    assert!(found[0].1 >= 0.3 && found[0].1 <= 0.5, "crossing at {}", found[0].1);

    let peaks = steepest_points(&slices[0], 0.1);
    assert_eq!(peaks.len(), 1);
    assert!((2..=3).contains(&peaks[0]));
}

#[test]
fn pivot_at_fixed_temptation_is_dense() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("phase_diagram_results.csv");
    fs::write(&path, CSV).expect("write csv");
    let data = Dataset::load(&path).expect("load");

    let grid = data
        .filter(Param::Temptation, 1.7)
        .pivot(Param::DefectorRatio, Param::Density, Metric::Compliance)
        .expect("pivot");
    assert_eq!(grid.rows(), 1);
    assert_eq!(grid.cols(), 6);
    assert_eq!(grid.at(0.5, 0.4), Some(0.40));
    let (lo, hi) = grid.value_range().expect("range");
    assert_relative_eq!(lo, 0.10);
    assert_relative_eq!(hi, 0.95);
}
