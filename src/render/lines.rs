//! Line/marker charts with threshold annotations.

use plotters::prelude::*;

use crate::render::figure::{padded_range, Area, Figure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    Line,
    Markers,
    LineMarkers,
}

#[derive(Debug, Clone)]
pub struct Curve {
    pub label: Option<String>,
    pub color: RGBColor,
    pub kind: CurveKind,
    pub opacity: f64,
    pub points: Vec<(f64, f64)>,
}

impl Curve {
    pub fn new(kind: CurveKind, color: RGBColor, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: None,
            color,
            kind,
            opacity: 1.0,
            points,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Dashed vertical guide at `x`.
#[derive(Debug, Clone, Copy)]
pub struct VLine {
    pub x: f64,
    pub color: RGBColor,
    pub opacity: f64,
}

/// `x`-shaped marker at a data point.
#[derive(Debug, Clone, Copy)]
pub struct CrossMark {
    pub at: (f64, f64),
    pub color: RGBColor,
}

#[derive(Debug, Clone, Default)]
pub struct LineChartSpec {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub curves: Vec<Curve>,
    pub vlines: Vec<VLine>,
    pub crosses: Vec<CrossMark>,
    pub legend: bool,
}

impl LineChartSpec {
    pub fn new(title: impl Into<String>, x_desc: impl Into<String>, y_desc: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_desc: x_desc.into(),
            y_desc: y_desc.into(),
            legend: true,
            ..Self::default()
        }
    }

    pub fn has_data(&self) -> bool {
        self.curves.iter().any(|c| !c.points.is_empty())
    }

    fn x_range(&self) -> (f64, f64) {
        let xs = self
            .curves
            .iter()
            .flat_map(|c| c.points.iter().map(|p| p.0))
            .chain(self.vlines.iter().map(|v| v.x))
            .chain(self.crosses.iter().map(|m| m.at.0));
        padded_range(xs, 0.05)
    }

    fn y_range(&self) -> (f64, f64) {
        let ys = self
            .curves
            .iter()
            .flat_map(|c| c.points.iter().map(|p| p.1))
            .chain(self.crosses.iter().map(|m| m.at.1));
        padded_range(ys, 0.05)
    }
}

pub fn draw_line_chart(area: &Area<'_>, spec: &LineChartSpec, fig: &Figure) -> anyhow::Result<()> {
    let (x0, x1) = spec.x_range();
    let (y0, y1) = spec.y_range();

    let mut chart = ChartBuilder::on(area)
        .caption(&spec.title, fig.font(13.0))
        .margin(fig.px(15))
        .x_label_area_size(fig.px(55))
        .y_label_area_size(fig.px(70))
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(BLACK.mix(0.06))
        .x_desc(spec.x_desc.as_str())
        .y_desc(spec.y_desc.as_str())
        .axis_desc_style(fig.font(12.0))
        .label_style(fig.font(9.0))
        .draw()?;

    let stroke = fig.px(2);
    let radius = fig.px(4);

    for curve in &spec.curves {
        let color = curve.color.mix(curve.opacity);
        let has_line = matches!(curve.kind, CurveKind::Line | CurveKind::LineMarkers);

        if has_line {
            let series = chart.draw_series(LineSeries::new(
                curve.points.iter().copied(),
                color.stroke_width(stroke),
            ))?;
            if let Some(label) = &curve.label {
                let legend_color = curve.color;
                series.label(label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], legend_color.stroke_width(stroke))
                });
            }
        }

        if matches!(curve.kind, CurveKind::Markers | CurveKind::LineMarkers) {
            let series = chart.draw_series(
                curve
                    .points
                    .iter()
                    .map(|p| Circle::new(*p, radius, color.filled())),
            )?;
            if let (false, Some(label)) = (has_line, &curve.label) {
                let legend_color = curve.color;
                series.label(label.as_str()).legend(move |(x, y)| {
                    Circle::new((x + 10, y), radius, legend_color.filled())
                });
            }
        }
    }

    for vline in &spec.vlines {
        chart.draw_series(DashedLineSeries::new(
            vec![(vline.x, y0), (vline.x, y1)],
            fig.px(8),
            fig.px(5),
            vline.color.mix(vline.opacity).stroke_width(fig.px(1)),
        ))?;
    }

    let cross_size = fig.px(7);
    chart.draw_series(spec.crosses.iter().map(|m| {
        Cross::new(m.at, cross_size, m.color.stroke_width(fig.px(2)))
    }))?;

    if spec.legend && spec.curves.iter().any(|c| c.label.is_some()) {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font(fig.font(9.0))
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;
    }

    Ok(())
}
