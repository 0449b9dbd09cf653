//! Loading the phase-diagram results table.
//!
//! The sweep writes the same table in two shapes: a CSV with camelCase
//! headers and a JSON document `{"results": [...]}` with snake_case keys.
//! Both land in [`PhaseRecord`]; the detected [`SourceFormat`] is kept so
//! output names can follow the column naming of the input.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(SourceFormat::Csv),
            Some("json") => Ok(SourceFormat::Json),
            _ => Err(DataError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// One cell of the parameter sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub temptation: f64,
    /// Absent from some exports; kept as a float so `80` and `80.0` both match.
    #[serde(default, alias = "agentCount")]
    pub agent_count: Option<f64>,
    pub density: f64,
    #[serde(alias = "defectorRatio")]
    pub defector_ratio: f64,
    #[serde(alias = "avgCompliance")]
    pub avg_compliance: f64,
    #[serde(alias = "defectorPercolationProb")]
    pub defector_percolation_prob: f64,
    #[serde(alias = "avgLargestClusterFrac")]
    pub avg_largest_cluster_frac: f64,
    #[serde(alias = "geometricPercolationProb")]
    pub geometric_percolation_prob: f64,
}

impl PhaseRecord {
    fn check_finite(&self, row: usize) -> Result<(), DataError> {
        let params = [
            ("temptation", Some(self.temptation)),
            ("agentCount", self.agent_count),
            ("density", Some(self.density)),
            ("defectorRatio", Some(self.defector_ratio)),
        ];
        for (column, value) in params {
            if matches!(value, Some(v) if !v.is_finite()) {
                return Err(DataError::NonFinite { row, column });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<PhaseRecord>,
    format: SourceFormat,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let format = SourceFormat::from_path(path)?;
        let records = match format {
            SourceFormat::Csv => read_csv(path)?,
            SourceFormat::Json => read_json(path)?,
        };
        log::info!(
            "loaded {} records from {}",
            records.len(),
            path.display()
        );
        Self::from_records(records, format).map_err(|err| match err {
            DataError::Empty(_) => DataError::Empty(path.display().to_string()),
            other => other,
        })
    }

    pub fn from_records(records: Vec<PhaseRecord>, format: SourceFormat) -> Result<Self, DataError> {
        if records.is_empty() {
            return Err(DataError::Empty("in-memory table".to_string()));
        }
        for (idx, record) in records.iter().enumerate() {
            record.check_finite(idx)?;
        }
        Ok(Self { records, format })
    }

    pub fn records(&self) -> &[PhaseRecord] {
        &self.records
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn read_csv(path: &Path) -> Result<Vec<PhaseRecord>, DataError> {
    let file = fs::File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

fn read_json(path: &Path) -> Result<Vec<PhaseRecord>, DataError> {
    let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&raw, path)
}

/// Rows are decoded one at a time so a bad row is reported by index.
fn parse_json(raw: &str, path: &Path) -> Result<Vec<PhaseRecord>, DataError> {
    let doc: Value = serde_json::from_str(raw).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = match doc {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(rows)) => rows,
            _ => return Err(DataError::MissingResults(path.to_path_buf())),
        },
        _ => return Err(DataError::MissingResults(path.to_path_buf())),
    };
    rows.into_iter()
        .enumerate()
        .map(|(row, value)| {
            serde_json::from_value(value).map_err(|source| DataError::BadRow {
                path: path.to_path_buf(),
                row,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("a/phase_diagram_results.CSV")).ok(),
            Some(SourceFormat::Csv)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("results.json")).ok(),
            Some(SourceFormat::Json)
        );
        assert!(matches!(
            SourceFormat::from_path(Path::new("results.parquet")),
            Err(DataError::UnsupportedFormat(_))
        ));
    }

    const ROW: &str = r#"{"temptation":1.7,"density":0.2,"defector_ratio":0.5,
        "avg_compliance":0.4,"defector_percolation_prob":0.1,
        "avg_largest_cluster_frac":0.3,"geometric_percolation_prob":0.9}"#;

    #[test]
    fn json_accepts_wrapped_and_bare_arrays() {
        let path = Path::new("results.json");
        let wrapped = parse_json(&format!(r#"{{"results":[{ROW}]}}"#), path).unwrap();
        let bare = parse_json(&format!("[{ROW}]"), path).unwrap();
        for records in [wrapped, bare] {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].agent_count, None);
            assert_eq!(records[0].defector_ratio, 0.5);
        }
    }

    #[test]
    fn json_errors_name_the_missing_key_and_the_bad_row() {
        let path = Path::new("results.json");
        for doc in [r#"{"rows": []}"#, r#"{"results": {}}"#, "42"] {
            assert!(matches!(
                parse_json(doc, path),
                Err(DataError::MissingResults(p)) if p == path
            ));
        }

        let missing_ratio = r#"{"temptation":1.7,"density":0.2,"avg_compliance":0.4,
            "defector_percolation_prob":0.1,"avg_largest_cluster_frac":0.3,
            "geometric_percolation_prob":0.9}"#;
        let err = parse_json(&format!(r#"{{"results":[{ROW},{missing_ratio}]}}"#), path)
            .unwrap_err();
        assert!(matches!(err, DataError::BadRow { row: 1, .. }));
        let message = err.to_string();
        assert!(message.contains("row 1"), "{message}");
        assert!(message.contains("defector_ratio"), "{message}");

        assert!(matches!(
            parse_json("{not json", path),
            Err(DataError::Json { .. })
        ));
    }

    #[test]
    fn rejects_empty_and_non_finite_tables() {
        assert!(matches!(
            Dataset::from_records(Vec::new(), SourceFormat::Csv),
            Err(DataError::Empty(_))
        ));

        let bad = PhaseRecord {
            temptation: f64::NAN,
            agent_count: Some(40.0),
            density: 0.1,
            defector_ratio: 0.1,
            avg_compliance: 0.0,
            defector_percolation_prob: 0.0,
            avg_largest_cluster_frac: 0.0,
            geometric_percolation_prob: 0.0,
        };
        assert!(matches!(
            Dataset::from_records(vec![bad], SourceFormat::Csv),
            Err(DataError::NonFinite {
                row: 0,
                column: "temptation"
            })
        ));
    }
}
