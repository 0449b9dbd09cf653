//! Where do the metrics change? Smoothed density sweeps with their 0.5
//! crossings, steepest-change points and a temptation x density map.

use anyhow::Context;

use crate::colormap::Colormap;
use crate::metric::Metric;
use crate::output::{fmt_param, write_thresholds_csv, ReportOutput, ThresholdRow};
use crate::render::{
    draw_line_chart, draw_phase_space, CrossMark, Curve, CurveKind, HeatmapSpec, LineChartSpec,
    VLine,
};
use crate::reports::{smoothed_slices, ReportContext, ReportKind, SmoothedSeries};
use crate::smoothing::{find_peaks, find_threshold, gradient};
use crate::table::Param;

const CURVES_FIGSIZE: (f64, f64) = (15.0, 10.0);
const MAP_FIGSIZE: (f64, f64) = (12.0, 10.0);

pub fn run(ctx: &ReportContext<'_>) -> anyhow::Result<ReportOutput> {
    let mut output = ctx.begin(ReportKind::Thresholds)?;

    for metric in Metric::ALL {
        if metric.is_probability() {
            let rows = threshold_curves(ctx, &mut output, metric)?;
            output.thresholds.extend(rows);
        }
        density_curves(ctx, &mut output, metric)?;
        phase_space(ctx, &mut output, metric)?;
    }

    let csv_path = output.output_dir.join("thresholds.csv");
    write_thresholds_csv(&csv_path, &output.thresholds)?;
    ctx.complete(output)
}

/// Density at which each slice's smoothed curve first reaches `threshold`.
///
/// The crossing is searched on a second smoothing pass over the already
/// smoothed curve, so it lags the plotted line slightly on steep fronts.
pub fn crossings(slices: &[SmoothedSeries], threshold: f64, sigma: f64) -> Vec<(f64, f64)> {
    slices
        .iter()
        .filter_map(|s| find_threshold(&s.raw.x, &s.smooth, threshold, sigma).map(|x| (s.key, x)))
        .collect()
}

/// Indices where |d smooth / dx| peaks with at least `min_prominence`.
/// Slices too short for a gradient have none.
pub fn steepest_points(slice: &SmoothedSeries, min_prominence: f64) -> Vec<usize> {
    let Ok(slope) = gradient(&slice.smooth, &slice.raw.x) else {
        return Vec::new();
    };
    let magnitude: Vec<f64> = slope.iter().map(|d| d.abs()).collect();
    find_peaks(&magnitude, min_prominence)
}

fn threshold_curves(
    ctx: &ReportContext<'_>,
    output: &mut ReportOutput,
    metric: Metric,
) -> anyhow::Result<Vec<ThresholdRow>> {
    let cfg = ctx.config;
    let t = cfg.focus_temptation;
    let column = ctx.column(metric);
    let file = format!("threshold_{column}_T{}.png", fmt_param(t));

    let ratios = ctx.dataset.unique(Param::DefectorRatio);
    let colors = Colormap::Viridis.sample(ratios.len());
    let view = ctx.dataset.filter(Param::Temptation, t);
    let slices = smoothed_slices(&view, Param::DefectorRatio, &ratios, Param::Density, metric, cfg.sigma);
    if slices.is_empty() {
        output.skip(format!("{file}: no rows at temptation {}", fmt_param(t)));
        return Ok(Vec::new());
    }

    let color_of = |key: f64| {
        let idx = ratios.iter().position(|r| *r == key).unwrap_or(0);
        colors[idx]
    };

    let mut spec = LineChartSpec::new(
        format!("{}, T={}, Threshold={}", metric.title(), fmt_param(t), fmt_param(cfg.threshold)),
        Param::Density.axis_label(),
        column,
    );
    for slice in &slices {
        let color = color_of(slice.key);
        spec.curves.push(Curve::new(CurveKind::Line, color, slice.smooth_points()).opacity(0.7));
        spec.curves.push(
            Curve::new(CurveKind::Markers, color, slice.raw.points().collect())
                .label(format!("Defector Ratio = {:.1}", slice.key)),
        );
    }

    let found = crossings(&slices, cfg.threshold, cfg.sigma);
    for &(ratio, x) in &found {
        let color = color_of(ratio);
        spec.vlines.push(VLine { x, color, opacity: 0.3 });
        spec.crosses.push(CrossMark { at: (x, cfg.threshold), color });
    }

    ctx.render(output, &file, CURVES_FIGSIZE, |area, fig| {
        draw_line_chart(area, &spec, fig)
    })?;

    Ok(found
        .into_iter()
        .map(|(defector_ratio, density_threshold)| ThresholdRow {
            metric: column.to_string(),
            temptation: t,
            defector_ratio,
            density_threshold,
        })
        .collect())
}

fn density_curves(
    ctx: &ReportContext<'_>,
    output: &mut ReportOutput,
    metric: Metric,
) -> anyhow::Result<()> {
    let cfg = ctx.config;
    let ratio = cfg.focus_defector_ratio;
    let column = ctx.column(metric);
    let file = format!("density_curves_{column}_DR{}.png", fmt_param(ratio));

    let temptations = ctx.dataset.unique(Param::Temptation);
    let colors = Colormap::Viridis.sample(temptations.len());
    let view = ctx.dataset.filter(Param::DefectorRatio, ratio);
    let slices = smoothed_slices(&view, Param::Temptation, &temptations, Param::Density, metric, cfg.sigma);
    if slices.is_empty() {
        output.skip(format!("{file}: no rows at defector ratio {}", fmt_param(ratio)));
        return Ok(());
    }

    let mut spec = LineChartSpec::new(
        format!("{}, Defector Ratio = {}", metric.title(), fmt_param(ratio)),
        Param::Density.axis_label(),
        column,
    );
    for slice in &slices {
        let idx = temptations.iter().position(|t| *t == slice.key).unwrap_or(0);
        let color = colors[idx];
        spec.curves.push(Curve::new(CurveKind::Line, color, slice.smooth_points()).opacity(0.7));
        spec.curves.push(
            Curve::new(CurveKind::Markers, color, slice.raw.points().collect())
                .label(format!("T = {}", fmt_param(slice.key))),
        );
        for peak in steepest_points(slice, cfg.min_prominence) {
            spec.crosses.push(CrossMark {
                at: (slice.raw.x[peak], slice.raw.y[peak]),
                color,
            });
        }
    }

    ctx.render(output, &file, CURVES_FIGSIZE, |area, fig| {
        draw_line_chart(area, &spec, fig)
    })
}

fn phase_space(
    ctx: &ReportContext<'_>,
    output: &mut ReportOutput,
    metric: Metric,
) -> anyhow::Result<()> {
    let ratio = ctx.config.focus_defector_ratio;
    let column = ctx.column(metric);
    let file = format!("phase_space_{column}_DR{}.png", fmt_param(ratio));

    let grid = ctx
        .dataset
        .filter(Param::DefectorRatio, ratio)
        .pivot(Param::Temptation, Param::Density, metric)
        .with_context(|| format!("failed to pivot data for {file}"))?;
    if grid.is_empty() {
        output.skip(format!("{file}: no rows at defector ratio {}", fmt_param(ratio)));
        return Ok(());
    }

    let spec = HeatmapSpec {
        title: format!("{}, Defector Ratio = {}", metric.title(), fmt_param(ratio)),
        x_desc: Param::Density.axis_label().to_string(),
        y_desc: Param::Temptation.axis_label().to_string(),
        cmap: ctx.config.phase_space_cmap,
        annotate: false,
        colorbar_label: Some(column.to_string()),
    };
    ctx.render(output, &file, MAP_FIGSIZE, |area, fig| {
        draw_phase_space(area, &grid, &spec, fig)
    })
}
