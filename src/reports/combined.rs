//! Heatmap and defector-ratio traces side by side, per temptation.

use anyhow::Context;

use crate::metric::Metric;
use crate::output::{fmt_param, ReportOutput};
use crate::render::{draw_heatmap, draw_line_chart, panels, HeatmapSpec, LineChartSpec};
use crate::reports::transitions::density_traces;
use crate::reports::{ReportContext, ReportKind};
use crate::table::Param;

const FIGSIZE: (f64, f64) = (20.0, 8.0);

pub fn run(ctx: &ReportContext<'_>) -> anyhow::Result<ReportOutput> {
    let mut output = ctx.begin(ReportKind::Combined)?;

    for metric in Metric::ALL {
        for &t in &ctx.config.combined_temptations {
            combined_view(ctx, &mut output, metric, t)?;
        }
    }

    ctx.complete(output)
}

fn combined_view(
    ctx: &ReportContext<'_>,
    output: &mut ReportOutput,
    metric: Metric,
    t: f64,
) -> anyhow::Result<()> {
    let cfg = ctx.config;
    let column = ctx.column(metric);
    let file = format!("combined_{column}_T{}.png", fmt_param(t));

    let view = ctx.dataset.filter(Param::Temptation, t);
    if view.is_empty() {
        output.skip(format!("{file}: no rows at temptation {}", fmt_param(t)));
        return Ok(());
    }
    let grid = view
        .pivot(Param::DefectorRatio, Param::Density, metric)
        .with_context(|| format!("failed to pivot data for {file}"))?;

    let heatmap = HeatmapSpec {
        title: format!("Phase Diagram (T={})", fmt_param(t)),
        x_desc: Param::Density.axis_label().to_string(),
        y_desc: Param::DefectorRatio.axis_label().to_string(),
        cmap: cfg.heatmap_cmap,
        annotate: cfg.annotate_heatmaps,
        colorbar_label: None,
    };
    let mut traces = LineChartSpec::new(
        format!("{} vs Defector Ratio (T={})", metric.title(), fmt_param(t)),
        Param::DefectorRatio.axis_label(),
        column,
    );
    traces.curves = density_traces(&view, metric, &cfg.selected_densities, cfg.density_tolerance);

    ctx.render(output, &file, FIGSIZE, |area, fig| {
        let cells = panels(area, None, 1, 2, fig)?;
        if !grid.is_empty() {
            draw_heatmap(&cells[0], &grid, &heatmap, fig)?;
        }
        if traces.has_data() {
            draw_line_chart(&cells[1], &traces, fig)?;
        }
        Ok(())
    })
}
