//! The four per-cell observables reported by the phase-diagram sweep.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::colormap::Colormap;
use crate::dataset::{PhaseRecord, SourceFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Compliance,
    DefectorPercolation,
    LargestCluster,
    GeometricPercolation,
}

impl Metric {
    /// Iteration order used by every report.
    pub const ALL: [Metric; 4] = [
        Metric::Compliance,
        Metric::DefectorPercolation,
        Metric::LargestCluster,
        Metric::GeometricPercolation,
    ];

    pub fn csv_column(self) -> &'static str {
        match self {
            Metric::Compliance => "avgCompliance",
            Metric::DefectorPercolation => "defectorPercolationProb",
            Metric::LargestCluster => "avgLargestClusterFrac",
            Metric::GeometricPercolation => "geometricPercolationProb",
        }
    }

    pub fn json_key(self) -> &'static str {
        match self {
            Metric::Compliance => "avg_compliance",
            Metric::DefectorPercolation => "defector_percolation_prob",
            Metric::LargestCluster => "avg_largest_cluster_frac",
            Metric::GeometricPercolation => "geometric_percolation_prob",
        }
    }

    /// Column name as it appears in the given input format; also used for
    /// output file names and axis labels.
    pub fn column(self, format: SourceFormat) -> &'static str {
        match format {
            SourceFormat::Csv => self.csv_column(),
            SourceFormat::Json => self.json_key(),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::Compliance => "Final Compliance Rate",
            Metric::DefectorPercolation => "Defector Percolation Probability",
            Metric::LargestCluster => "Largest Defector Cluster Fraction",
            Metric::GeometricPercolation => "Geometric Percolation Probability",
        }
    }

    /// Percolation probabilities get the 0.5 crossing analysis.
    pub fn is_probability(self) -> bool {
        matches!(
            self,
            Metric::DefectorPercolation | Metric::GeometricPercolation
        )
    }

    pub fn heatmap_colormap(self) -> Colormap {
        match self {
            Metric::Compliance => Colormap::RdYlBu,
            _ => Colormap::RdYlBuR,
        }
    }

    pub fn value(self, record: &PhaseRecord) -> f64 {
        match self {
            Metric::Compliance => record.avg_compliance,
            Metric::DefectorPercolation => record.defector_percolation_prob,
            Metric::LargestCluster => record.avg_largest_cluster_frac,
            Metric::GeometricPercolation => record.geometric_percolation_prob,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_key())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.csv_column() == s || m.json_key() == s)
            .ok_or_else(|| format!("unknown metric '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_naming_styles() {
        assert_eq!(
            "avgLargestClusterFrac".parse::<Metric>(),
            Ok(Metric::LargestCluster)
        );
        assert_eq!(
            "geometric_percolation_prob".parse::<Metric>(),
            Ok(Metric::GeometricPercolation)
        );
        assert!("compliance".parse::<Metric>().is_err());
    }

    #[test]
    fn only_percolation_metrics_are_probabilities() {
        let probs: Vec<_> = Metric::ALL.into_iter().filter(|m| m.is_probability()).collect();
        assert_eq!(
            probs,
            vec![Metric::DefectorPercolation, Metric::GeometricPercolation]
        );
    }

    #[test]
    fn compliance_uses_unreversed_map() {
        assert_eq!(Metric::Compliance.heatmap_colormap(), Colormap::RdYlBu);
        assert_eq!(Metric::LargestCluster.heatmap_colormap(), Colormap::RdYlBuR);
    }
}
