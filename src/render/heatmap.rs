//! Cell heatmaps over a pivoted [`Grid`].

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::colormap::{luminance, Colormap, Normalize};
use crate::render::figure::{
    draw_colorbar, padded_range, split_for_colorbar, tick_label, Area, Figure,
};
use crate::table::Grid;

#[derive(Debug, Clone)]
pub struct HeatmapSpec {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub cmap: Colormap,
    pub annotate: bool,
    pub colorbar_label: Option<String>,
}

pub(crate) fn grid_norm(grid: &Grid) -> Normalize {
    let (lo, hi) = grid.value_range().unwrap_or((0.0, 1.0));
    Normalize::new(lo, hi)
}

/// Categorical heatmap: one cell per (row key, column key), first row on top.
pub fn draw_heatmap(
    area: &Area<'_>,
    grid: &Grid,
    spec: &HeatmapSpec,
    fig: &Figure,
) -> anyhow::Result<()> {
    let (plot_area, bar_area) = split_for_colorbar(area);
    let rows = grid.rows();
    let cols = grid.cols();
    let norm = grid_norm(grid);

    // Cell centres sit on integer coordinates so the mesh ticks land mid-cell.
    let mut chart = ChartBuilder::on(&plot_area)
        .caption(&spec.title, fig.font(14.0))
        .margin(fig.px(10))
        .x_label_area_size(fig.px(60))
        .y_label_area_size(fig.px(70))
        .build_cartesian_2d(
            -0.5..cols.max(1) as f64 - 0.5,
            -0.5..rows.max(1) as f64 - 0.5,
        )?;

    let x_fmt = |v: &f64| {
        cell_index(*v, cols)
            .map(|c| tick_label(grid.col_keys[c]))
            .unwrap_or_default()
    };
    let y_fmt = |v: &f64| {
        cell_index(*v, rows)
            .map(|slot| tick_label(grid.row_keys[row_slot(rows, slot)]))
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(spec.x_desc.as_str())
        .y_desc(spec.y_desc.as_str())
        .axis_desc_style(fig.font(12.0))
        .label_style(fig.font(9.0))
        .x_labels(cols.max(1))
        .y_labels(rows.max(1))
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .draw()?;

    chart.draw_series(grid.cells().map(|(r, c, v)| {
        let (x, y) = (c as f64, row_slot(rows, r) as f64);
        let color = spec.cmap.at(norm.apply(v));
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
    }))?;

    if spec.annotate {
        let centered = Pos::new(HPos::Center, VPos::Center);
        chart.draw_series(grid.cells().map(|(r, c, v)| {
            let ink = annotation_color(spec.cmap.at(norm.apply(v)));
            Text::new(
                format!("{v:.2}"),
                (c as f64, row_slot(rows, r) as f64),
                TextStyle {
                    color: ink.to_backend_color(),
                    ..fig.font(8.0).pos(centered)
                },
            )
        }))?;
    }

    draw_colorbar(
        &bar_area,
        spec.cmap,
        norm,
        spec.colorbar_label.as_deref(),
        fig,
    )
}

/// Image-style map over continuous axes spanning the key extent, with the
/// first row at the bottom.
pub fn draw_phase_space(
    area: &Area<'_>,
    grid: &Grid,
    spec: &HeatmapSpec,
    fig: &Figure,
) -> anyhow::Result<()> {
    let (plot_area, bar_area) = split_for_colorbar(area);
    let norm = grid_norm(grid);

    let (x0, x1) = extent(&grid.col_keys);
    let (y0, y1) = extent(&grid.row_keys);
    let dx = (x1 - x0) / grid.cols().max(1) as f64;
    let dy = (y1 - y0) / grid.rows().max(1) as f64;

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(&spec.title, fig.font(14.0))
        .margin(fig.px(10))
        .x_label_area_size(fig.px(60))
        .y_label_area_size(fig.px(70))
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(spec.x_desc.as_str())
        .y_desc(spec.y_desc.as_str())
        .axis_desc_style(fig.font(12.0))
        .label_style(fig.font(9.0))
        .draw()?;

    chart.draw_series(grid.cells().map(|(r, c, v)| {
        let left = x0 + dx * c as f64;
        let bottom = y0 + dy * r as f64;
        Rectangle::new(
            [(left, bottom), (left + dx, bottom + dy)],
            spec.cmap.at(norm.apply(v)).filled(),
        )
    }))?;

    draw_colorbar(
        &bar_area,
        spec.cmap,
        norm,
        spec.colorbar_label.as_deref(),
        fig,
    )
}

/// Vertical slot of grid row `r`: row 0 goes to the top slot. The mapping is
/// its own inverse, so it also turns a slot back into a row.
fn row_slot(rows: usize, r: usize) -> usize {
    rows - 1 - r
}

/// Cell index of a mesh coordinate, if it sits on a cell centre.
fn cell_index(v: f64, n: usize) -> Option<usize> {
    let idx = v.round();
    if (v - idx).abs() > 1e-6 || idx < 0.0 || idx >= n as f64 {
        return None;
    }
    Some(idx as usize)
}

/// Text color readable on `fill`.
fn annotation_color(fill: RGBColor) -> RGBColor {
    if luminance(fill) > 0.5 {
        BLACK
    } else {
        WHITE
    }
}

/// `[min, max]` of sorted keys; a single key gets a unit-wide window.
fn extent(keys: &[f64]) -> (f64, f64) {
    match (keys.first(), keys.last()) {
        (Some(lo), Some(hi)) if hi > lo => (*lo, *hi),
        _ => padded_range(keys.iter().copied(), 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_spans_first_to_last_key() {
        assert_eq!(extent(&[0.1, 0.5, 0.9]), (0.1, 0.9));
        let (lo, hi) = extent(&[1.7]);
        assert!((lo - 1.2).abs() < 1e-12 && (hi - 2.2).abs() < 1e-12);
        assert_eq!(extent(&[]), (0.0, 1.0));
    }

    use crate::dataset::{Dataset, PhaseRecord, SourceFormat};
    use crate::metric::Metric;
    use crate::table::Param;

    /// Pivot of (defector ratio, density, compliance) triples.
    fn grid(cells: &[(f64, f64, f64)]) -> Grid {
        let records = cells
            .iter()
            .map(|&(ratio, density, value)| PhaseRecord {
                temptation: 1.7,
                agent_count: None,
                density,
                defector_ratio: ratio,
                avg_compliance: value,
                defector_percolation_prob: 0.0,
                avg_largest_cluster_frac: 0.0,
                geometric_percolation_prob: 0.0,
            })
            .collect();
        let data = Dataset::from_records(records, SourceFormat::Csv).unwrap();
        data.filter(Param::Temptation, 1.7)
            .pivot(Param::DefectorRatio, Param::Density, Metric::Compliance)
            .unwrap()
    }

    #[test]
    fn first_row_is_drawn_on_top() {
        let g = grid(&[(0.1, 0.2, 1.0), (0.5, 0.2, 2.0), (0.5, 0.4, 3.0), (0.9, 0.4, 4.0)]);
        assert_eq!((g.rows(), g.cols()), (3, 2));
        let rows = g.rows();
        assert_eq!(row_slot(rows, 0), 2);
        assert_eq!(row_slot(rows, 2), 0);
        // The top tick reads the first row key, the bottom tick the last.
        assert_eq!(g.row_keys[row_slot(rows, 2)], 0.1);
        assert_eq!(g.row_keys[row_slot(rows, 0)], 0.9);

        // Holes are not drawn, so only the filled cells get slots.
        let slots: Vec<(usize, usize)> = g.cells().map(|(r, c, _)| (row_slot(rows, r), c)).collect();
        assert_eq!(slots, vec![(2, 0), (1, 0), (1, 1), (0, 1)]);
    }

    #[test]
    fn single_row_grid_sits_in_the_only_slot() {
        let g = grid(&[(0.5, 0.1, 0.2), (0.5, 0.3, 0.4), (0.5, 0.5, 0.6)]);
        assert_eq!((g.rows(), g.cols()), (1, 3));
        assert_eq!(row_slot(g.rows(), 0), 0);
        assert_eq!(cell_index(0.0, g.rows()), Some(0));
        assert_eq!(cell_index(1.0, g.rows()), None);
    }

    #[test]
    fn ticks_label_cell_centres_only() {
        assert_eq!(cell_index(2.0, 3), Some(2));
        assert_eq!(cell_index(1.5, 3), None);
        assert_eq!(cell_index(-0.5, 3), None);
        assert_eq!(cell_index(3.0, 3), None);
    }

    #[test]
    fn annotations_contrast_with_the_cell() {
        assert_eq!(annotation_color(RGBColor(253, 231, 37)), BLACK);
        assert_eq!(annotation_color(RGBColor(68, 1, 84)), WHITE);
        assert_eq!(annotation_color(Colormap::RdYlBu.at(0.5)), BLACK);
        assert_eq!(annotation_color(Colormap::RdYlBu.at(1.0)), WHITE);
    }
}
