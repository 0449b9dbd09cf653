//! 3D surface over a pivoted [`Grid`], with a flat color projection on the
//! floor plane.

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::colormap::{Colormap, Normalize};
use crate::render::figure::{draw_colorbar, padded_range, split_for_colorbar, Area, Figure};
use crate::render::heatmap::grid_norm;
use crate::table::Grid;

#[derive(Debug, Clone)]
pub struct SurfaceSpec {
    pub title: String,
    /// Label for the grid columns (drawn along x)
    pub x_desc: String,
    /// Label for the grid rows (drawn along z, into the page)
    pub z_desc: String,
    /// Label for the value axis (drawn vertically)
    pub value_desc: String,
    pub cmap: Colormap,
}

/// Viewing angles in radians, plus the zoom applied after projection.
const YAW: f64 = 0.6;
const PITCH: f64 = 0.35;
const SCALE: f64 = 0.85;

pub fn draw_surface(
    area: &Area<'_>,
    grid: &Grid,
    spec: &SurfaceSpec,
    fig: &Figure,
) -> anyhow::Result<()> {
    let (plot_area, bar_area) = split_for_colorbar(area);
    let (_, h) = plot_area.dim_in_pixel();
    let (plot_area, legend_area) = plot_area.split_vertically(h.saturating_sub(fig.px(30)));

    let norm = grid_norm(grid);
    let floor = norm.min;
    let (x0, x1) = padded_range(grid.col_keys.iter().copied(), 0.0);
    let (z0, z1) = padded_range(grid.row_keys.iter().copied(), 0.0);
    let (y0, y1) = padded_range([norm.min, norm.max], 0.05);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(&spec.title, fig.font(14.0))
        .margin(fig.px(20))
        .build_cartesian_3d(x0..x1, y0..y1, z0..z1)?;

    chart.with_projection(|mut pb| {
        pb.yaw = YAW;
        pb.pitch = PITCH;
        pb.scale = SCALE;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.15))
        .max_light_lines(3)
        .label_style(fig.font(8.0))
        .draw()?;

    // Holes sit on the floor so the mesh stays closed.
    let height = |x: f64, z: f64| grid.at(z, x).unwrap_or(floor);

    chart.draw_series(floor_cells(grid, norm, spec.cmap, floor, y0))?;

    let face = |v: &f64| spec.cmap.at(norm.apply(*v)).filled();
    chart.draw_series(
        SurfaceSeries::xoz(
            grid.col_keys.iter().copied(),
            grid.row_keys.iter().copied(),
            height,
        )
        .style_func(&face),
    )?;

    let legend = format!(
        "x: {}    z: {}    vertical: {}",
        spec.x_desc, spec.z_desc, spec.value_desc
    );
    let (lw, lh) = legend_area.dim_in_pixel();
    legend_area.draw(&Text::new(
        legend,
        ((lw / 2) as i32, (lh / 2) as i32),
        fig.font(10.0).pos(Pos::new(HPos::Center, VPos::Center)),
    ))?;

    draw_colorbar(&bar_area, spec.cmap, norm, None, fig)
}

/// Flat quads on the floor plane, one per grid cell between adjacent keys,
/// colored by the mean of the cell's corners.
fn floor_cells(
    grid: &Grid,
    norm: Normalize,
    cmap: Colormap,
    fill: f64,
    y: f64,
) -> Vec<Polygon<(f64, f64, f64)>> {
    let value = |r: usize, c: usize| grid.get(r, c).unwrap_or(fill);
    let mut quads = Vec::new();
    for r in 1..grid.rows() {
        for c in 1..grid.cols() {
            let mean = (value(r - 1, c - 1) + value(r - 1, c) + value(r, c - 1) + value(r, c)) / 4.0;
            let (xa, xb) = (grid.col_keys[c - 1], grid.col_keys[c]);
            let (za, zb) = (grid.row_keys[r - 1], grid.row_keys[r]);
            quads.push(Polygon::new(
                vec![(xa, y, za), (xb, y, za), (xb, y, zb), (xa, y, zb)],
                cmap.at(norm.apply(mean)).mix(0.6).filled(),
            ));
        }
    }
    quads
}
