//! Row selection and pivoting over the loaded table.

use std::fmt;

use crate::dataset::{Dataset, PhaseRecord, SourceFormat};
use crate::error::DataError;
use crate::metric::Metric;

/// Sweep parameters a report can filter on or lay out along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Temptation,
    AgentCount,
    Density,
    DefectorRatio,
}

impl Param {
    pub fn value(self, record: &PhaseRecord) -> Option<f64> {
        match self {
            Param::Temptation => Some(record.temptation),
            Param::AgentCount => record.agent_count,
            Param::Density => Some(record.density),
            Param::DefectorRatio => Some(record.defector_ratio),
        }
    }

    pub fn column(self, format: SourceFormat) -> &'static str {
        match (self, format) {
            (Param::Temptation, _) => "temptation",
            (Param::Density, _) => "density",
            (Param::AgentCount, SourceFormat::Csv) => "agentCount",
            (Param::AgentCount, SourceFormat::Json) => "agent_count",
            (Param::DefectorRatio, SourceFormat::Csv) => "defectorRatio",
            (Param::DefectorRatio, SourceFormat::Json) => "defector_ratio",
        }
    }

    pub fn axis_label(self) -> &'static str {
        match self {
            Param::Temptation => "Temptation (T)",
            Param::AgentCount => "Agent Count (N)",
            Param::Density => "Density (N/area)",
            Param::DefectorRatio => "Defector Ratio",
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column(SourceFormat::Json))
    }
}

/// A borrowed subset of the table, narrowed by chained filters.
#[derive(Debug, Clone)]
pub struct View<'a> {
    records: Vec<&'a PhaseRecord>,
    format: SourceFormat,
}

impl Dataset {
    pub fn view(&self) -> View<'_> {
        View {
            records: self.records().iter().collect(),
            format: self.format(),
        }
    }

    /// Rows where `param == value` exactly.
    pub fn filter(&self, param: Param, value: f64) -> View<'_> {
        self.view().eq(param, value)
    }

    /// Rows where `|param - value| < tol`.
    pub fn filter_near(&self, param: Param, value: f64, tol: f64) -> View<'_> {
        self.view().near(param, value, tol)
    }

    pub fn unique(&self, param: Param) -> Vec<f64> {
        self.view().unique(param)
    }

    pub fn series(&self, x: Param, metric: Metric) -> Series {
        self.view().series(x, metric)
    }
}

impl<'a> View<'a> {
    pub fn eq(self, param: Param, value: f64) -> Self {
        self.retain(param, |v| v == value)
    }

    pub fn near(self, param: Param, value: f64, tol: f64) -> Self {
        self.retain(param, |v| (v - value).abs() < tol)
    }

    fn retain(self, param: Param, keep: impl Fn(f64) -> bool) -> Self {
        let records = self
            .records
            .into_iter()
            .filter(|r| param.value(r).is_some_and(&keep))
            .collect();
        View {
            records,
            format: self.format,
        }
    }

    pub fn records(&self) -> &[&'a PhaseRecord] {
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

    /// Sorted distinct values of `param` over the view.
    pub fn unique(&self, param: Param) -> Vec<f64> {
        let mut values: Vec<f64> = self
            .records
            .iter()
            .filter_map(|r| param.value(r))
            .collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        values
    }

    /// `(x, metric)` pairs ordered by `x`, in the order the sweep wrote ties.
    pub fn series(&self, x: Param, metric: Metric) -> Series {
        let mut points: Vec<(f64, f64)> = self
            .records
            .iter()
            .filter_map(|r| x.value(r).map(|xv| (xv, metric.value(r))))
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (x, y) = points.into_iter().unzip();
        Series { x, y }
    }

    pub fn pivot(&self, index: Param, columns: Param, metric: Metric) -> Result<Grid, DataError> {
        let row_keys = self.unique(index);
        let col_keys = self.unique(columns);
        let mut cells = vec![None; row_keys.len() * col_keys.len()];
        let mut seen = vec![false; cells.len()];

        for record in &self.records {
            let (Some(rv), Some(cv)) = (index.value(record), columns.value(record)) else {
                continue;
            };
            let r = position(&row_keys, rv);
            let c = position(&col_keys, cv);
            let slot = r * col_keys.len() + c;
            if seen[slot] {
                return Err(DataError::DuplicatePivotEntry {
                    index: index.column(self.format),
                    columns: columns.column(self.format),
                    row_key: rv,
                    col_key: cv,
                });
            }
            seen[slot] = true;
            let value = metric.value(record);
            cells[slot] = value.is_finite().then_some(value);
        }

        Ok(Grid {
            index,
            columns,
            row_keys,
            col_keys,
            cells,
        })
    }
}

fn position(keys: &[f64], value: f64) -> usize {
    // Keys come from `unique` over the same records, so the value is present.
    keys.binary_search_by(|k| k.total_cmp(&value))
        .unwrap_or_else(|insert_at| insert_at.min(keys.len().saturating_sub(1)))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Pivot table: `index` values down the rows, `columns` values across.
/// Missing combinations are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub index: Param,
    pub columns: Param,
    pub row_keys: Vec<f64>,
    pub col_keys: Vec<f64>,
    cells: Vec<Option<f64>>,
}

impl Grid {
    pub fn rows(&self) -> usize {
        self.row_keys.len()
    }

    pub fn cols(&self) -> usize {
        self.col_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        self.cells[row * self.cols() + col]
    }

    /// Lookup by key values rather than positions.
    pub fn at(&self, row_key: f64, col_key: f64) -> Option<f64> {
        let r = self.row_keys.iter().position(|k| *k == row_key)?;
        let c = self.col_keys.iter().position(|k| *k == col_key)?;
        self.get(r, c)
    }

    /// `(row, col, value)` for every filled cell.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let cols = self.cols();
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, v)| v.map(|v| (i / cols, i % cols, v)))
    }

    /// Min and max over filled cells; `None` for an all-hole grid.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells().fold(None, |acc, (_, _, v)| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
