//! Sequential and diverging color scales for heatmaps, surfaces and line
//! families.

use std::fmt;

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (72, 40, 120),
    (59, 82, 139),
    (44, 114, 142),
    (33, 145, 140),
    (39, 173, 129),
    (94, 201, 98),
    (170, 220, 50),
    (253, 231, 37),
];

// ColorBrewer RdYlBu, red (low) to blue (high).
const RD_YL_BU: [(u8, u8, u8); 11] = [
    (165, 0, 38),
    (215, 48, 39),
    (244, 109, 67),
    (253, 174, 97),
    (254, 224, 144),
    (255, 255, 191),
    (224, 243, 248),
    (171, 217, 233),
    (116, 173, 209),
    (69, 117, 180),
    (49, 54, 149),
];

/// Qualitative cycle for unrelated line families (tab10).
pub const CATEGORY10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub fn cycle_color(i: usize) -> RGBColor {
    CATEGORY10[i % CATEGORY10.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Colormap {
    #[serde(rename = "viridis")]
    Viridis,
    #[serde(rename = "RdYlBu")]
    RdYlBu,
    #[serde(rename = "RdYlBu_r")]
    RdYlBuR,
}

impl Colormap {
    /// Color at `t` in [0, 1]; out-of-range values clamp, NaN maps to the low end.
    pub fn at(self, t: f64) -> RGBColor {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Colormap::Viridis => interpolate(&VIRIDIS, t),
            Colormap::RdYlBu => interpolate(&RD_YL_BU, t),
            Colormap::RdYlBuR => interpolate(&RD_YL_BU, 1.0 - t),
        }
    }

    /// `n` colors evenly spaced over the full scale.
    pub fn sample(self, n: usize) -> Vec<RGBColor> {
        match n {
            0 => Vec::new(),
            1 => vec![self.at(0.0)],
            _ => (0..n)
                .map(|i| self.at(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Colormap::Viridis => "viridis",
            Colormap::RdYlBu => "RdYlBu",
            Colormap::RdYlBuR => "RdYlBu_r",
        }
    }
}

fn interpolate(anchors: &[(u8, u8, u8)], t: f64) -> RGBColor {
    let scaled = t * (anchors.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(anchors.len() - 2);
    let frac = scaled - lo as f64;
    let (a, b) = (anchors[lo], anchors[lo + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Perceived brightness in [0, 1], used to pick annotation text color.
pub fn luminance(color: RGBColor) -> f64 {
    (0.299 * color.0 as f64 + 0.587 * color.1 as f64 + 0.114 * color.2 as f64) / 255.0
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Linear value-to-unit mapping for a data range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub min: f64,
    pub max: f64,
}

impl Normalize {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hit_anchor_colors() {
        assert_eq!(Colormap::Viridis.at(0.0), RGBColor(68, 1, 84));
        assert_eq!(Colormap::Viridis.at(1.0), RGBColor(253, 231, 37));
        assert_eq!(Colormap::RdYlBu.at(0.0), RGBColor(165, 0, 38));
        assert_eq!(Colormap::RdYlBuR.at(0.0), RGBColor(49, 54, 149));
        assert_eq!(Colormap::RdYlBu.at(0.5), RGBColor(255, 255, 191));
    }

    #[test]
    fn out_of_range_and_nan_clamp() {
        assert_eq!(Colormap::Viridis.at(-3.0), Colormap::Viridis.at(0.0));
        assert_eq!(Colormap::Viridis.at(7.0), Colormap::Viridis.at(1.0));
        assert_eq!(Colormap::Viridis.at(f64::NAN), Colormap::Viridis.at(0.0));
    }

    #[test]
    fn sample_spans_the_scale() {
        let colors = Colormap::Viridis.sample(3);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], Colormap::Viridis.at(0.0));
        assert_eq!(colors[1], RGBColor(33, 145, 140));
        assert_eq!(colors[2], Colormap::Viridis.at(1.0));
        assert!(Colormap::RdYlBu.sample(0).is_empty());
    }

    #[test]
    fn normalize_handles_flat_ranges() {
        let n = Normalize::new(0.2, 0.6);
        assert!((n.apply(0.4) - 0.5).abs() < 1e-12);
        assert_eq!(n.apply(1.0), 1.0);
        assert_eq!(Normalize::new(0.3, 0.3).apply(0.3), 0.5);
    }

    #[test]
    fn line_cycle_wraps() {
        assert_eq!(cycle_color(0), RGBColor(31, 119, 180));
        assert_eq!(cycle_color(11), cycle_color(1));
    }
}
