//! Plotting primitives on the plotters bitmap backend.
//!
//! Every primitive draws into a caller-supplied [`Area`], so a report can
//! place several charts on one canvas.

pub mod figure;
pub mod heatmap;
pub mod lines;
pub mod surface;

pub use figure::{finish, open_png, Area, Figure};
pub use heatmap::{draw_heatmap, draw_phase_space, HeatmapSpec};
pub use lines::{draw_line_chart, CrossMark, Curve, CurveKind, LineChartSpec, VLine};
pub use surface::{draw_surface, SurfaceSpec};

/// Splits `root` into a `rows x cols` grid of panels in row-major order,
/// under an optional figure title.
pub fn panels<'a>(
    root: &Area<'a>,
    title: Option<&str>,
    rows: usize,
    cols: usize,
    fig: &Figure,
) -> anyhow::Result<Vec<Area<'a>>> {
    let body = match title {
        Some(title) => root.titled(title, fig.font(16.0))?,
        None => root.clone(),
    };
    Ok(body.split_evenly((rows, cols)))
}
