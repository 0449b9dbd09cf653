//! Three views of the density sweep at one temptation: grouped line panels,
//! an annotated heatmap and a 3D surface.

use anyhow::Context;
use plotters::style::RGBColor;

use crate::colormap::cycle_color;
use crate::config::RatioGroup;
use crate::metric::Metric;
use crate::output::{fmt_param, ReportOutput};
use crate::render::{
    draw_heatmap, draw_line_chart, draw_surface, panels, Curve, CurveKind, HeatmapSpec,
    LineChartSpec, SurfaceSpec, VLine,
};
use crate::reports::{smoothed_slices, ReportContext, ReportKind};
use crate::smoothing::first_crossing;
use crate::table::{Param, View};

const SUBPLOTS_FIGSIZE: (f64, f64) = (20.0, 6.0);
const HEATMAP_FIGSIZE: (f64, f64) = (12.0, 8.0);
const GUIDE: RGBColor = RGBColor(128, 128, 128);

pub fn run(ctx: &ReportContext<'_>) -> anyhow::Result<ReportOutput> {
    let mut output = ctx.begin(ReportKind::Improved)?;
    let t = ctx.config.focus_temptation;
    let view = ctx.dataset.filter(Param::Temptation, t);

    for metric in Metric::ALL {
        log::info!("creating visualizations for {}", metric.title());
        grouped_subplots(ctx, &mut output, &view, metric)?;
        heatmap(ctx, &mut output, &view, metric)?;
        surface(ctx, &mut output, &view, metric)?;
    }

    ctx.complete(output)
}

/// One line chart per ratio group; probability metrics get a guide at each
/// slice's smoothed crossing.
pub fn group_chart(
    view: &View<'_>,
    group: &RatioGroup,
    metric: Metric,
    column: &str,
    sigma: f64,
    threshold: f64,
) -> LineChartSpec {
    let mut spec = LineChartSpec::new(
        format!("{} Defector Ratios", group.name),
        Param::Density.axis_label(),
        column,
    );
    let slices = smoothed_slices(view, Param::DefectorRatio, &group.ratios, Param::Density, metric, sigma);
    for (i, slice) in slices.iter().enumerate() {
        let color = cycle_color(i);
        spec.curves.push(
            Curve::new(CurveKind::Line, color, slice.smooth_points())
                .label(format!("Ratio = {}", fmt_param(slice.key))),
        );
        spec.curves.push(
            Curve::new(CurveKind::Markers, color, slice.raw.points().collect()).opacity(0.5),
        );
        if metric.is_probability() {
            if let Some(x) = first_crossing(&slice.raw.x, &slice.smooth, threshold) {
                spec.vlines.push(VLine {
                    x,
                    color: GUIDE,
                    opacity: 0.3,
                });
            }
        }
    }
    spec
}

fn grouped_subplots(
    ctx: &ReportContext<'_>,
    output: &mut ReportOutput,
    view: &View<'_>,
    metric: Metric,
) -> anyhow::Result<()> {
    let cfg = ctx.config;
    let t = cfg.focus_temptation;
    let column = ctx.column(metric);
    let file = format!("subplots_{column}_T{}.png", fmt_param(t));

    let charts: Vec<LineChartSpec> = cfg
        .ratio_groups
        .iter()
        .map(|group| group_chart(view, group, metric, column, cfg.sigma, cfg.threshold))
        .collect();
    if !charts.iter().any(LineChartSpec::has_data) {
        output.skip(format!("{file}: no rows at temptation {}", fmt_param(t)));
        return Ok(());
    }

    let title = format!("{} (T={})", metric.title(), fmt_param(t));
    ctx.render(output, &file, SUBPLOTS_FIGSIZE, |area, fig| {
        let cells = panels(area, Some(title.as_str()), 1, charts.len(), fig)?;
        for (chart, cell) in charts.iter().zip(&cells) {
            if chart.has_data() {
                draw_line_chart(cell, chart, fig)?;
            }
        }
        Ok(())
    })
}

fn heatmap(
    ctx: &ReportContext<'_>,
    output: &mut ReportOutput,
    view: &View<'_>,
    metric: Metric,
) -> anyhow::Result<()> {
    let t = ctx.config.focus_temptation;
    let file = format!("heatmap_{}_T{}.png", ctx.column(metric), fmt_param(t));
    let grid = view
        .pivot(Param::DefectorRatio, Param::Density, metric)
        .with_context(|| format!("failed to pivot data for {file}"))?;
    if grid.is_empty() {
        output.skip(format!("{file}: no rows at temptation {}", fmt_param(t)));
        return Ok(());
    }

    let spec = HeatmapSpec {
        title: format!("{}, T={}", metric.title(), fmt_param(t)),
        x_desc: Param::Density.axis_label().to_string(),
        y_desc: Param::DefectorRatio.axis_label().to_string(),
        cmap: ctx.config.heatmap_cmap,
        annotate: ctx.config.annotate_heatmaps,
        colorbar_label: None,
    };
    ctx.render(output, &file, HEATMAP_FIGSIZE, |area, fig| {
        draw_heatmap(area, &grid, &spec, fig)
    })
}

fn surface(
    ctx: &ReportContext<'_>,
    output: &mut ReportOutput,
    view: &View<'_>,
    metric: Metric,
) -> anyhow::Result<()> {
    let t = ctx.config.focus_temptation;
    let column = ctx.column(metric);
    let file = format!("surface3d_{column}_T{}.png", fmt_param(t));
    let grid = view
        .pivot(Param::DefectorRatio, Param::Density, metric)
        .with_context(|| format!("failed to pivot data for {file}"))?;
    if grid.is_empty() {
        output.skip(format!("{file}: no rows at temptation {}", fmt_param(t)));
        return Ok(());
    }

    let spec = SurfaceSpec {
        title: format!("{}, T={}", metric.title(), fmt_param(t)),
        x_desc: Param::Density.axis_label().to_string(),
        z_desc: Param::DefectorRatio.axis_label().to_string(),
        value_desc: column.to_string(),
        cmap: ctx.config.surface_cmap,
    };
    ctx.render(output, &file, HEATMAP_FIGSIZE, |area, fig| {
        draw_surface(area, &grid, &spec, fig)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotConfig;
    use crate::dataset::{Dataset, PhaseRecord, SourceFormat};

    fn sweep() -> Dataset {
        let mut records = Vec::new();
        for ratio in [0.1, 0.2, 0.5] {
            for (i, density) in [0.1, 0.3, 0.5, 0.7, 0.9].into_iter().enumerate() {
                let p = if i >= 2 { 1.0 } else { 0.0 };
                records.push(PhaseRecord {
                    temptation: 1.7,
                    agent_count: None,
                    density,
                    defector_ratio: ratio,
                    avg_compliance: 1.0 - p,
                    defector_percolation_prob: p,
                    avg_largest_cluster_frac: p * ratio,
                    geometric_percolation_prob: p,
                });
            }
        }
        Dataset::from_records(records, SourceFormat::Csv).unwrap()
    }

    #[test]
    fn groups_only_draw_ratios_present() {
        let data = sweep();
        let cfg = PlotConfig::default();
        let view = data.filter(Param::Temptation, 1.7);
        let low = group_chart(&view, &cfg.ratio_groups[0], Metric::Compliance, "avgCompliance", 1.0, 0.5);
        // 0.1 and 0.2 exist, 0.3 does not: a line and a marker set each.
        assert_eq!(low.curves.len(), 4);
        assert!(low.vlines.is_empty());

        let high = group_chart(&view, &cfg.ratio_groups[2], Metric::Compliance, "avgCompliance", 1.0, 0.5);
        assert!(!high.has_data());
    }

    #[test]
    fn probability_groups_mark_the_crossing() {
        let data = sweep();
        let cfg = PlotConfig::default();
        let view = data.filter(Param::Temptation, 1.7);
        let mid = group_chart(
            &view,
            &cfg.ratio_groups[1],
            Metric::DefectorPercolation,
            "defectorPercolationProb",
            1.0,
            0.5,
        );
        assert_eq!(mid.vlines.len(), 1);
        assert!(mid.vlines[0].x >= 0.3 && mid.vlines[0].x <= 0.5);
    }
}
