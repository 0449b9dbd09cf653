//! Annotated defector-ratio heatmaps, against density at fixed temptation and
//! against temptation at fixed agent count.

use anyhow::Context;

use crate::metric::Metric;
use crate::output::{fmt_count, fmt_param, ReportOutput};
use crate::render::{draw_heatmap, HeatmapSpec};
use crate::reports::{ReportContext, ReportKind};
use crate::table::{Param, View};

const FIGSIZE: (f64, f64) = (12.0, 10.0);
const ROW_LABEL: &str = "Initial Defector Ratio";

pub fn run(ctx: &ReportContext<'_>) -> anyhow::Result<ReportOutput> {
    let mut output = ctx.begin(ReportKind::PhaseDiagrams)?;

    for &t in &ctx.config.density_diagram_temptations {
        let view = ctx.dataset.filter(Param::Temptation, t);
        for metric in Metric::ALL {
            let file = format!("phase_density_{}_T{}.png", ctx.column(metric), fmt_param(t));
            let title = format!("{} (T={})", metric.title(), fmt_param(t));
            diagram(ctx, &mut output, &view, Param::Density, metric, title, &file)?;
        }
    }

    for &n in &ctx.config.temptation_diagram_agent_counts {
        let view = ctx.dataset.filter(Param::AgentCount, n);
        for metric in Metric::ALL {
            let file = format!("phase_temptation_{}_N{}.png", ctx.column(metric), fmt_count(n));
            let title = format!("{} (N={})", metric.title(), fmt_count(n));
            diagram(ctx, &mut output, &view, Param::Temptation, metric, title, &file)?;
        }
    }

    ctx.complete(output)
}

fn diagram(
    ctx: &ReportContext<'_>,
    output: &mut ReportOutput,
    view: &View<'_>,
    columns: Param,
    metric: Metric,
    title: String,
    file: &str,
) -> anyhow::Result<()> {
    let grid = view
        .pivot(Param::DefectorRatio, columns, metric)
        .with_context(|| format!("failed to pivot data for {file}"))?;
    if grid.is_empty() {
        output.skip(format!("{file}: no matching rows"));
        return Ok(());
    }

    let spec = HeatmapSpec {
        title,
        x_desc: columns.axis_label().to_string(),
        y_desc: ROW_LABEL.to_string(),
        cmap: metric.heatmap_colormap(),
        annotate: ctx.config.annotate_heatmaps,
        colorbar_label: None,
    };
    ctx.render(output, file, FIGSIZE, |area, fig| {
        draw_heatmap(area, &grid, &spec, fig)
    })
}
