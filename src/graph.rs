#![cfg(feature = "web")]
use crate::animation::{Marker, RouteAnimation};
use crate::error::DashboardError;
use crate::model::{ScenarioResult, WarehouseData};
use crate::roi::ScenarioComparison;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::error::Error;

/// Fill colour for optimized model bars
pub const OPTIMIZED_BAR: RGBColor = RGBColor(0x2e, 0xcc, 0x71);
/// Fill colour for current practice bars
pub const CURRENT_BAR: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);

const LOCATION_BLUE: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const START_ORANGE: RGBColor = RGBColor(0xff, 0x7f, 0x0e);
const RACK_GREY: RGBColor = RGBColor(0xd3, 0xd3, 0xd3);
const PLOT_BACKGROUND: RGBColor = RGBColor(0xf8, 0xf9, 0xfa);

/// Light/dark ends of the sequential palettes used by the scenario charts
const GREENS: (RGBColor, RGBColor) = (RGBColor(0xc7, 0xe9, 0xc0), RGBColor(0x00, 0x6d, 0x2c));
const BLUES: (RGBColor, RGBColor) = (RGBColor(0xc6, 0xdb, 0xef), RGBColor(0x08, 0x51, 0x9c));

/// Configuration options for chart generation
///
/// This structure contains the text and size of a chart. Every chart is
/// rendered as a standalone SVG document.
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            width: 640,
            height: 420,
        }
    }
}

impl GraphOptions {
    pub fn titled(title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Which figure of a scenario a comparison chart shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Distance,
    Time,
}

/// One labelled bar
#[derive(Clone, Debug)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: RGBColor,
}

type DrawResult = Result<(), Box<dyn Error>>;

fn chart_error<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::Chart(e.to_string())
}

/// Renders into an in-memory SVG document
///
/// # Arguments
/// * `options` - Chart size
/// * `draw` - Draws the chart onto the prepared white canvas
///
/// # Returns
/// * The SVG markup or a chart error
fn render_svg<F>(options: &GraphOptions, draw: F) -> Result<String, DashboardError>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult,
{
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;
        draw(&root).map_err(chart_error)?;
        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

/// Scatter plot of every layout location with the start point highlighted
///
/// # Examples
/// ```
/// use warehouse_dashboard::graph::{GraphOptions, layout_chart};
/// use warehouse_dashboard::model::{LocationRow, WarehouseData};
///
/// let data = WarehouseData::new(
///     vec![LocationRow::new("Start", 0.0, 0.0), LocationRow::new("Rack 1", 4.0, 4.0)],
///     vec![],
/// );
/// let svg = layout_chart(&data, &GraphOptions::default()).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
pub fn layout_chart(data: &WarehouseData, options: &GraphOptions) -> Result<String, DashboardError> {
    render_svg(options, |root| draw_layout(root, data, options))
}

fn draw_layout(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    data: &WarehouseData,
    options: &GraphOptions,
) -> DrawResult {
    let (x_range, y_range) = axis_ranges(data.layout.iter().map(|l| (l.x, l.y)));

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 22).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)?;

    chart.plotting_area().fill(&PLOT_BACKGROUND)?;
    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    chart.draw_series(data.layout.iter().map(|l| {
        EmptyElement::at((l.x, l.y))
            + Circle::new((0, 0), 5, LOCATION_BLUE.filled())
            + Text::new(l.name.clone(), (-14, -16), ("sans-serif", 10).into_font())
    }))?;

    if let Some(start) = data.start() {
        chart
            .draw_series(std::iter::once(TriangleMarker::new(
                (start.x, start.y),
                9,
                START_ORANGE.filled(),
            )))?
            .label("Start Point")
            .legend(|(x, y)| TriangleMarker::new((x, y), 6, START_ORANGE.filled()));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}

/// Optimized vs. current practice bars for one scenario
pub fn comparison_chart(
    scenario: &ScenarioResult,
    metric: Metric,
    options: &GraphOptions,
) -> Result<String, DashboardError> {
    let (optimized, current) = match metric {
        Metric::Distance => (scenario.distance_optimized, scenario.distance_current),
        Metric::Time => (scenario.time_optimized, scenario.time_current),
    };
    let bars = vec![
        Bar {
            label: "Optimized".to_string(),
            value: optimized,
            color: OPTIMIZED_BAR,
        },
        Bar {
            label: "Current Practice".to_string(),
            value: current,
            color: CURRENT_BAR,
        },
    ];
    bar_chart(&bars, 2, options)
}

/// Distance reduction per scenario, shaded on a green scale
pub fn reduction_chart(
    rows: &[ScenarioComparison],
    options: &GraphOptions,
) -> Result<String, DashboardError> {
    let values: Vec<f64> = rows
        .iter()
        .map(|r| r.distance_reduction.percent().unwrap_or(0.0))
        .collect();
    bar_chart(&shaded_bars(rows, &values, GREENS), 1, options)
}

/// Annual cost savings per scenario, shaded on a blue scale
pub fn savings_chart(
    rows: &[ScenarioComparison],
    options: &GraphOptions,
) -> Result<String, DashboardError> {
    let values: Vec<f64> = rows.iter().map(|r| r.annual_cost_saved).collect();
    bar_chart(&shaded_bars(rows, &values, BLUES), 0, options)
}

fn shaded_bars(
    rows: &[ScenarioComparison],
    values: &[f64],
    palette: (RGBColor, RGBColor),
) -> Vec<Bar> {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    rows.iter()
        .zip(values)
        .map(|(row, &value)| {
            let t = if hi > lo { (value - lo) / (hi - lo) } else { 1.0 };
            Bar {
                label: row.scenario.clone(),
                value,
                color: blend(palette.0, palette.1, t),
            }
        })
        .collect()
}

/// Linear blend between two colours, `t` in `[0, 1]`
pub fn blend(from: RGBColor, to: RGBColor, t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Vertical bar chart with one category per bar and the value printed above
/// each bar
pub fn bar_chart(
    bars: &[Bar],
    decimals: usize,
    options: &GraphOptions,
) -> Result<String, DashboardError> {
    render_svg(options, |root| draw_bars(root, bars, decimals, options))
}

fn draw_bars(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    bars: &[Bar],
    decimals: usize,
    options: &GraphOptions,
) -> DrawResult {
    let count = bars.len().max(1) as u32;
    let (lo, hi) = value_span(bars.iter().map(|b| b.value));

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 22).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..count).into_segmented(), lo..hi)?;

    let label_of = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => bars
            .get(*i as usize)
            .map(|b| b.label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&label_of)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    for (i, bar) in bars.iter().enumerate() {
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(bar.color.filled())
                .margin(30)
                .data(std::iter::once((i as u32, bar.value))),
        )?;
    }

    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        EmptyElement::at((SegmentValue::CenterOf(i as u32), bar.value))
            + Text::new(
                format!("{:.*}", decimals, bar.value),
                (-16, -18),
                ("sans-serif", 12).into_font(),
            )
    }))?;

    Ok(())
}

/// One frame of a route animation
///
/// Racks and the depot come from the loaded layout when there is one; the
/// routes themselves are drawn in full with each worker at its position for
/// step `frame`.
pub fn route_frame_chart(
    animation: &RouteAnimation,
    frame: usize,
    layout: Option<&WarehouseData>,
    options: &GraphOptions,
) -> Result<String, DashboardError> {
    let positions = animation
        .frame(frame)
        .ok_or_else(|| DashboardError::Chart(format!("frame {} out of range", frame)))?
        .positions;
    render_svg(options, |root| {
        draw_route_frame(root, animation, &positions, layout, options)
    })
}

fn draw_route_frame(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    animation: &RouteAnimation,
    positions: &[Option<crate::animation::Point>],
    layout: Option<&WarehouseData>,
    options: &GraphOptions,
) -> DrawResult {
    let layout_points = layout
        .into_iter()
        .flat_map(|d| d.layout.iter().map(|l| (l.x, l.y)));
    let route_points = animation.all_points().map(|p| (p.x, p.y));
    let (x_range, y_range) = axis_ranges(layout_points.chain(route_points));

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 22).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .light_line_style(RGBColor(0xee, 0xee, 0xee))
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    if let Some(data) = layout {
        chart
            .draw_series(
                data.racks()
                    .map(|l| Circle::new((l.x, l.y), 5, RACK_GREY.filled())),
            )?
            .label("Racks")
            .legend(|(x, y)| Circle::new((x, y), 4, RACK_GREY.filled()));
        if let Some(start) = data.start() {
            chart
                .draw_series(std::iter::once(TriangleMarker::new(
                    (start.x, start.y),
                    9,
                    BLACK.filled(),
                )))?
                .label("Depot")
                .legend(|(x, y)| TriangleMarker::new((x, y), 6, BLACK.filled()));
        }
    }

    for route in &animation.routes {
        let color = RGBColor(route.color.0, route.color.1, route.color.2);
        let points = route.coords.iter().map(|p| (p.x, p.y));
        let anno = if route.dotted {
            chart.draw_series(DashedLineSeries::new(
                points,
                4,
                4,
                color.mix(0.7).stroke_width(1),
            ))?
        } else {
            chart.draw_series(LineSeries::new(points, color.stroke_width(2)))?
        };
        anno.label(route.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2)));
    }

    for (route, pos) in animation.routes.iter().zip(positions) {
        let Some(pos) = pos else {
            continue;
        };
        let color = RGBColor(route.color.0, route.color.1, route.color.2);
        let at = EmptyElement::at((pos.x, pos.y));
        match route.marker {
            Marker::Square => {
                chart.draw_series(std::iter::once(
                    at + Rectangle::new([(-7, -7), (7, 7)], color.filled()),
                ))?;
            }
            Marker::Circle => {
                chart.draw_series(std::iter::once(
                    at + Circle::new((0, 0), 7, color.filled()),
                ))?;
            }
            Marker::Cross => {
                chart.draw_series(std::iter::once(
                    at + Cross::new((0, 0), 7, color.stroke_width(3)),
                ))?;
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Axis ranges covering every point with a 10% margin (at least one meter)
fn axis_ranges(
    points: impl Iterator<Item = (f64, f64)>,
) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for (x, y) in points {
        bounds = Some(match bounds {
            None => (x, x, y, y),
            Some((x0, x1, y0, y1)) => (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
        });
    }
    let (x0, x1, y0, y1) = bounds.unwrap_or((0.0, 1.0, 0.0, 1.0));
    (pad(x0, x1), pad(y0, y1))
}

fn pad(lo: f64, hi: f64) -> std::ops::Range<f64> {
    let margin = ((hi - lo) * 0.1).max(1.0);
    (lo - margin)..(hi + margin)
}

/// Value axis always includes zero and leaves headroom for the bar labels
fn value_span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    if span <= 0.0 {
        return (0.0, 1.0);
    }
    let lo = if lo < 0.0 { lo - span * 0.15 } else { 0.0 };
    (lo, hi + span * 0.15)
}
