use std::fs;
use std::path::Path;

use anyhow::Context;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::colormap::{Colormap, Normalize};

pub type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub const FONT: &str = "sans-serif";

/// Physical figure size; pixel dimensions and font sizes follow the dpi.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Figure {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl Figure {
    pub fn new(width_in: f64, height_in: f64, dpi: u32) -> Self {
        Self {
            width_in,
            height_in,
            dpi,
        }
    }

    pub fn pixels(&self) -> (u32, u32) {
        let scale = self.dpi as f64;
        (
            (self.width_in * scale).round().max(1.0) as u32,
            (self.height_in * scale).round().max(1.0) as u32,
        )
    }

    /// Typographic points to pixels.
    pub fn pt(&self, points: f64) -> u32 {
        (points * self.dpi as f64 / 72.0).round().max(1.0) as u32
    }

    /// Sizes authored for a 100 dpi canvas, rescaled to this figure.
    pub fn px(&self, at_100_dpi: u32) -> u32 {
        (at_100_dpi as f64 * self.dpi as f64 / 100.0).round().max(1.0) as u32
    }

    pub fn font(&self, points: f64) -> TextStyle<'static> {
        TextStyle::from((FONT, self.pt(points) as f64).into_font()).color(&BLACK)
    }
}

/// White canvas backed by a PNG at `path`; parent directories are created.
pub fn open_png<'a>(path: &'a Path, fig: &Figure) -> anyhow::Result<Area<'a>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let root = BitMapBackend::new(path, fig.pixels()).into_drawing_area();
    root.fill(&WHITE)?;
    Ok(root)
}

pub fn finish(root: Area<'_>, path: &Path) -> anyhow::Result<()> {
    root.present()
        .with_context(|| format!("failed to write figure {}", path.display()))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

/// Plot panel on the left, colorbar strip on the right.
pub fn split_for_colorbar<'a>(area: &Area<'a>) -> (Area<'a>, Area<'a>) {
    let (w, _) = area.dim_in_pixel();
    area.split_horizontally((w as f64 * 0.87).round() as u32)
}

/// Vertical color scale for `norm`'s range, optionally labelled.
pub fn draw_colorbar(
    area: &Area<'_>,
    cmap: Colormap,
    norm: Normalize,
    label: Option<&str>,
    fig: &Figure,
) -> anyhow::Result<()> {
    let (lo, hi) = if (norm.max - norm.min).abs() < f64::EPSILON {
        (norm.min - 0.5, norm.max + 0.5)
    } else {
        (norm.min, norm.max)
    };

    let mut builder = ChartBuilder::on(area);
    builder
        .margin_top(fig.px(40))
        .margin_bottom(fig.px(60))
        .margin_right(fig.px(10))
        .set_label_area_size(LabelAreaPosition::Left, 0)
        .set_label_area_size(LabelAreaPosition::Right, fig.px(60));
    let mut bar = builder.build_cartesian_2d(0.0..1.0, lo..hi)?;

    let steps = 128;
    let step = (hi - lo) / steps as f64;
    bar.draw_series((0..steps).map(|i| {
        let y0 = lo + step * i as f64;
        let color = cmap.at(norm.apply(y0 + step / 2.0));
        Rectangle::new([(0.0, y0), (1.0, y0 + step)], color.filled())
    }))?;

    let fmt = |v: &f64| format!("{v:.2}");
    let mut mesh = bar.configure_mesh();
    mesh.disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_labels(6)
        .y_label_style(fig.font(10.0))
        .y_label_formatter(&fmt);
    if let Some(label) = label {
        mesh.y_desc(label).axis_desc_style(fig.font(11.0));
    }
    mesh.draw()?;

    Ok(())
}

/// Padded `[min, max]` over the values; a flat or empty set gets a unit window.
pub fn padded_range(values: impl IntoIterator<Item = f64>, pad_frac: f64) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        return (lo - 0.5, hi + 0.5);
    }
    (lo - span * pad_frac, hi + span * pad_frac)
}

/// Short tick text: `0.1`, `1.7`, `2.0`, `40`.
pub fn tick_label(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    crate::output::fmt_param(rounded)
}
