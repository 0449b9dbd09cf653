//! Phase diagrams for every temptation on one sheet, and metric traces
//! against defector ratio at a few fixed densities.

use anyhow::Context;

use crate::colormap::cycle_color;
use crate::metric::Metric;
use crate::output::{fmt_param, ReportOutput};
use crate::render::{
    draw_heatmap, draw_line_chart, panels, Curve, CurveKind, HeatmapSpec, LineChartSpec,
};
use crate::reports::{ReportContext, ReportKind};
use crate::table::{Grid, Param, View};

const PANEL_ROWS: usize = 2;
const PANEL_COLS: usize = 3;
pub const MAX_PANELS: usize = PANEL_ROWS * PANEL_COLS;

const SHEET_FIGSIZE: (f64, f64) = (20.0, 12.0);
const TRACE_FIGSIZE: (f64, f64) = (12.0, 8.0);

pub fn run(ctx: &ReportContext<'_>) -> anyhow::Result<ReportOutput> {
    let mut output = ctx.begin(ReportKind::Transitions)?;

    for metric in Metric::ALL {
        diagram_sheet(ctx, &mut output, metric)?;
        ratio_traces(ctx, &mut output, metric)?;
    }

    ctx.complete(output)
}

/// Traces of `metric` over defector ratio, one per density in `densities`
/// matched within `tol`. Densities with no rows are left out.
pub fn density_traces(
    view: &View<'_>,
    metric: Metric,
    densities: &[f64],
    tol: f64,
) -> Vec<Curve> {
    densities
        .iter()
        .enumerate()
        .filter_map(|(i, &density)| {
            let series = view
                .clone()
                .near(Param::Density, density, tol)
                .series(Param::DefectorRatio, metric);
            (!series.is_empty()).then(|| {
                Curve::new(CurveKind::LineMarkers, cycle_color(i), series.points().collect())
                    .label(format!("Density = {}", fmt_param(density)))
            })
        })
        .collect()
}

fn diagram_sheet(
    ctx: &ReportContext<'_>,
    output: &mut ReportOutput,
    metric: Metric,
) -> anyhow::Result<()> {
    let column = ctx.column(metric);
    let file = format!("phase_diagram_{column}.png");

    let temptations = ctx.dataset.unique(Param::Temptation);
    if temptations.len() > MAX_PANELS {
        for &t in &temptations[MAX_PANELS..] {
            output.skip(format!("{file}: panel for T = {} (sheet holds {MAX_PANELS})", fmt_param(t)));
        }
    }

    let mut sheet: Vec<(f64, Grid)> = Vec::new();
    for &t in temptations.iter().take(MAX_PANELS) {
        let grid = ctx
            .dataset
            .filter(Param::Temptation, t)
            .pivot(Param::DefectorRatio, Param::Density, metric)
            .with_context(|| format!("failed to pivot data for {file} at T = {t}"))?;
        if !grid.is_empty() {
            sheet.push((t, grid));
        }
    }
    if sheet.is_empty() {
        output.skip(format!("{file}: no data"));
        return Ok(());
    }

    let title = format!("{} Phase Diagram", metric.title());
    ctx.render(output, &file, SHEET_FIGSIZE, |area, fig| {
        let cells = panels(area, Some(title.as_str()), PANEL_ROWS, PANEL_COLS, fig)?;
        // Unused cells stay blank.
        for ((t, grid), cell) in sheet.iter().zip(&cells) {
            let spec = HeatmapSpec {
                title: format!("T = {}", fmt_param(*t)),
                x_desc: Param::Density.axis_label().to_string(),
                y_desc: Param::DefectorRatio.axis_label().to_string(),
                cmap: ctx.config.heatmap_cmap,
                annotate: false,
                colorbar_label: None,
            };
            draw_heatmap(cell, grid, &spec, fig)?;
        }
        Ok(())
    })
}

fn ratio_traces(
    ctx: &ReportContext<'_>,
    output: &mut ReportOutput,
    metric: Metric,
) -> anyhow::Result<()> {
    let cfg = ctx.config;
    let t = cfg.focus_temptation;
    let column = ctx.column(metric);
    let file = format!("{column}_vs_defector_ratio.png");

    let view = ctx.dataset.filter(Param::Temptation, t);
    let curves = density_traces(&view, metric, &cfg.selected_densities, cfg.density_tolerance);
    if curves.is_empty() {
        output.skip(format!("{file}: no rows at temptation {}", fmt_param(t)));
        return Ok(());
    }

    let mut spec = LineChartSpec::new(
        format!("{} vs Defector Ratio (T={})", metric.title(), fmt_param(t)),
        Param::DefectorRatio.axis_label(),
        column,
    );
    spec.curves = curves;
    ctx.render(output, &file, TRACE_FIGSIZE, |area, fig| {
        draw_line_chart(area, &spec, fig)
    })
}
