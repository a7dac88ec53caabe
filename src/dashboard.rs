//! View model for the dashboard page.
//!
//! Everything the template shows is computed here as plain strings so the
//! template itself only lays things out.

use crate::animation::{RouteAnimation, RouteSet, fleet_stop_counts};
use crate::error::DataUnavailable;
use crate::model::{ScenarioResult, WarehouseData};
use crate::roi::{
    self, ORDERS_RANGE, ORDERS_STEP, Reduction, RoiInputs, RoiOutputs, ScenarioComparison,
    WAGE_RANGE, WAGE_STEP, WORKING_DAYS_RANGE, WORKING_DAYS_STEP,
};
use serde::Serialize;

/// Format with a fixed number of decimals and comma thousands separators
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Dollar amount with cents, e.g. `$1,234.50`
pub fn format_money(value: f64) -> String {
    let digits = format_thousands(value, 2);
    match digits.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", digits),
    }
}

pub fn format_count(value: u64) -> String {
    format_thousands(value as f64, 0)
}

/// Which of the two tabs is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Roi,
    Route,
}

impl Tab {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("route") => Tab::Route,
            _ => Tab::Roi,
        }
    }
}

/// What the user asked for on this request
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRequest {
    pub inputs: RoiInputs,
    pub scenario: Option<String>,
    pub tab: Tab,
    pub route: RouteSet,
}

impl Default for ViewRequest {
    fn default() -> Self {
        ViewRequest {
            inputs: RoiInputs::default(),
            scenario: None,
            tab: Tab::Roi,
            route: RouteSet::Pair,
        }
    }
}

impl ViewRequest {
    /// Query string reproducing this request, for chart and tab links
    pub fn query_string(&self, scenario: Option<&str>) -> String {
        let mut query = format!(
            "wage={}&orders={}&days={}",
            self.inputs.hourly_wage, self.inputs.orders_per_day, self.inputs.working_days_per_year
        );
        if let Some(name) = scenario {
            query.push_str("&scenario=");
            query.push_str(&urlencoding::encode(name));
        }
        query
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SliderView {
    pub name: &'static str,
    pub label: &'static str,
    pub help: &'static str,
    pub value: String,
    pub min: String,
    pub max: String,
    pub step: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricCard {
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRowView {
    pub scenario: String,
    pub distance_reduction: String,
    pub time_reduction: String,
    pub annual_savings: String,
    pub annual_time_saved: String,
    pub annual_distance_saved: String,
    /// CSS background for the savings cell
    pub shade: String,
    pub selected: bool,
}

/// Everything under the "ROI Dashboard" tab
#[derive(Debug, Clone, Serialize)]
pub struct RoiSection {
    pub scenario: String,
    pub layout_stats: Vec<MetricCard>,
    pub distance_banner: String,
    pub time_banner: String,
    pub cards: Vec<MetricCard>,
    pub parameters: Vec<TableRow>,
    pub per_order: Vec<TableRow>,
    pub comparison: Vec<ComparisonRowView>,
}

/// Everything under the "Route Animation" tab
#[derive(Debug, Clone, Serialize)]
pub struct RouteView {
    pub set: &'static str,
    pub is_fleet: bool,
    pub frames: usize,
    pub cards: Vec<MetricCard>,
    pub legend: Vec<TableRow>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub data_source: String,
    pub error: Option<String>,
    pub tab: Tab,
    pub route_tab: bool,
    pub sliders: Vec<SliderView>,
    pub scenarios: Vec<OptionView>,
    pub query: String,
    pub roi: Option<RoiSection>,
    pub route: RouteView,
}

impl DashboardView {
    /// Build the page model for one request
    ///
    /// When the workbook could not be loaded the sidebar and tabs are still
    /// produced, with `error` set and no ROI section.
    pub fn build(
        data: Result<&WarehouseData, &DataUnavailable>,
        request: &ViewRequest,
        data_source: &str,
    ) -> Self {
        let inputs = request.inputs;
        let (error, loaded) = match data {
            Ok(d) => (None, Some(d)),
            Err(e) => (Some(format!("Error loading data from Excel file: {}", e)), None),
        };

        let selected = loaded.and_then(|d| select_scenario(d, request.scenario.as_deref()));
        let scenarios = loaded
            .map(|d| {
                d.scenario_names()
                    .into_iter()
                    .map(|name| OptionView {
                        value: name.to_string(),
                        selected: selected.is_some_and(|s| s.name == name),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let roi = match (loaded, selected) {
            (Some(d), Some(s)) => Some(roi_section(d, s, &inputs)),
            _ => None,
        };

        DashboardView {
            data_source: data_source.to_string(),
            error,
            tab: request.tab,
            route_tab: request.tab == Tab::Route,
            sliders: sliders(&inputs),
            scenarios,
            query: request.query_string(selected.map(|s| s.name.as_str())),
            roi,
            route: route_view(request.route, loaded),
        }
    }
}

/// The requested scenario when it exists, otherwise the default one
pub fn select_scenario<'a>(
    data: &'a WarehouseData,
    requested: Option<&str>,
) -> Option<&'a ScenarioResult> {
    requested
        .and_then(|name| data.scenario(name).ok())
        .or_else(|| data.default_scenario())
}

fn sliders(inputs: &RoiInputs) -> Vec<SliderView> {
    vec![
        SliderView {
            name: "wage",
            label: "Hourly Worker Wage ($)",
            help: "Average hourly wage for warehouse workers",
            value: format!("{:.1}", inputs.hourly_wage),
            min: format!("{:.1}", WAGE_RANGE.start()),
            max: format!("{:.1}", WAGE_RANGE.end()),
            step: WAGE_STEP.to_string(),
        },
        SliderView {
            name: "orders",
            label: "Orders per Day",
            help: "Average number of orders processed per day",
            value: inputs.orders_per_day.to_string(),
            min: ORDERS_RANGE.start().to_string(),
            max: ORDERS_RANGE.end().to_string(),
            step: ORDERS_STEP.to_string(),
        },
        SliderView {
            name: "days",
            label: "Working Days per Year",
            help: "Number of working days in a year",
            value: inputs.working_days_per_year.to_string(),
            min: WORKING_DAYS_RANGE.start().to_string(),
            max: WORKING_DAYS_RANGE.end().to_string(),
            step: WORKING_DAYS_STEP.to_string(),
        },
    ]
}

fn card(label: &str, value: String, delta: Option<String>, caption: Option<String>) -> MetricCard {
    MetricCard {
        label: label.to_string(),
        value,
        delta,
        caption,
    }
}

fn row(label: &str, value: String) -> TableRow {
    TableRow {
        label: label.to_string(),
        value,
    }
}

fn reduction_banner(reduction: Reduction, what: &str, zero: &str) -> String {
    match reduction {
        Reduction::Fraction(_) => format!("{} reduction in {}", reduction.display_with(1), what),
        Reduction::NotApplicable => format!("Reduction in {} not applicable ({} is zero)", what, zero),
    }
}

fn roi_section(data: &WarehouseData, scenario: &ScenarioResult, inputs: &RoiInputs) -> RoiSection {
    let out: RoiOutputs = roi::compute(scenario, inputs);
    let stats = data.layout_stats();
    let range_text = |r: Option<(f64, f64)>| match r {
        Some((lo, hi)) => format!("{:.0} to {:.0}", lo, hi),
        None => "n/a".to_string(),
    };

    let comparison = roi::compare_all(&data.scenarios, inputs);

    RoiSection {
        scenario: scenario.name.clone(),
        layout_stats: vec![
            card("Total Locations", stats.total_locations.to_string(), None, None),
            card("X Range", range_text(stats.x_range), None, None),
            card("Y Range", range_text(stats.y_range), None, None),
        ],
        distance_banner: reduction_banner(
            out.distance_reduction,
            "travel distance",
            "current distance",
        ),
        time_banner: reduction_banner(out.time_reduction, "operation time", "current time"),
        cards: vec![
            card(
                "Total Annual Cost Savings",
                format_money(out.annual_cost_saved),
                Some(format!("{} improvement", out.distance_reduction)),
                Some(format!("Based on {} annual orders", format_count(out.annual_orders))),
            ),
            card(
                "Annual Time Saved",
                format!("{} hrs", format_thousands(out.annual_time_saved_hours, 2)),
                Some(format!("{:.3} hrs per order", out.time_saved_per_order_hours)),
                Some(format!("At ${}/hour wage rate", inputs.hourly_wage)),
            ),
            card(
                "Annual Distance Saved",
                format!("{} m", format_thousands(out.annual_distance_saved, 2)),
                Some(format!("{:.2} m per order", out.distance_saved_per_order)),
                Some("Reduced travel distance".to_string()),
            ),
        ],
        parameters: vec![
            row("Hourly Wage", format_money(inputs.hourly_wage)),
            row("Orders per Day", format_count(inputs.orders_per_day as u64)),
            row("Working Days per Year", inputs.working_days_per_year.to_string()),
            row("Annual Orders", format_count(out.annual_orders)),
            row("Selected Scenario", scenario.name.clone()),
        ],
        per_order: vec![
            row("Time - Optimized", format!("{:.3} hrs", scenario.time_optimized)),
            row("Time - Current", format!("{:.3} hrs", scenario.time_current)),
            row("Time Saved", format!("{:.3} hrs", out.time_saved_per_order_hours)),
            row("Distance - Optimized", format!("{:.2} m", scenario.distance_optimized)),
            row("Distance - Current", format!("{:.2} m", scenario.distance_current)),
            row("Distance Saved", format!("{:.2} m", out.distance_saved_per_order)),
        ],
        comparison: comparison_rows(&comparison, &scenario.name),
    }
}

fn comparison_rows(rows: &[ScenarioComparison], selected: &str) -> Vec<ComparisonRowView> {
    let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
        (lo.min(r.annual_cost_saved), hi.max(r.annual_cost_saved))
    });
    rows.iter()
        .map(|r| {
            let t = if hi > lo {
                (r.annual_cost_saved - lo) / (hi - lo)
            } else {
                1.0
            };
            ComparisonRowView {
                scenario: r.scenario.clone(),
                distance_reduction: r.distance_reduction.display_with(2),
                time_reduction: r.time_reduction.display_with(2),
                annual_savings: format_money(r.annual_cost_saved),
                annual_time_saved: format_thousands(r.annual_time_saved_hours, 2),
                annual_distance_saved: format_thousands(r.annual_distance_saved, 2),
                shade: format!("rgba(46, 204, 113, {:.2})", 0.1 + 0.6 * t),
                selected: r.scenario == selected,
            }
        })
        .collect()
}

fn route_view(set: RouteSet, data: Option<&WarehouseData>) -> RouteView {
    let animation = match (set, data) {
        (RouteSet::Pair, _) => Ok(RouteAnimation::demo_pair()),
        (RouteSet::Fleet, Some(d)) => RouteAnimation::fleet(d).map_err(|e| e.to_string()),
        (RouteSet::Fleet, None) => Err("the workbook is not loaded".to_string()),
    };
    let (frames, legend, error) = match &animation {
        Ok(anim) => (
            anim.frame_count(),
            anim.routes
                .iter()
                .map(|r| {
                    row(
                        &r.name,
                        format!("#{:02x}{:02x}{:02x}", r.color.0, r.color.1, r.color.2),
                    )
                })
                .collect(),
            None,
        ),
        Err(e) => (0, Vec::new(), Some(format!("Route data unavailable: {}", e))),
    };

    let cards = match set {
        RouteSet::Pair => {
            let anim = RouteAnimation::demo_pair();
            anim.routes
                .iter()
                .map(|r| card(&format!("{} Steps", r.name), r.coords.len().to_string(), None, None))
                .collect()
        }
        RouteSet::Fleet => {
            let (current, optimized) = fleet_stop_counts();
            vec![
                card(
                    "Current Practice (Red) Stops",
                    format!("{} stops", current),
                    None,
                    None,
                ),
                card(
                    "Optimized Fleet (Total) Stops",
                    format!("{} stops", optimized),
                    None,
                    None,
                ),
            ]
        }
    };

    RouteView {
        set: set.as_param(),
        is_fleet: set == RouteSet::Fleet,
        frames,
        cards,
        legend,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LocationRow;

    fn data() -> WarehouseData {
        let scenarios = (1..=5)
            .map(|i| ScenarioResult {
                name: format!("Loadform {}", i),
                distance_current: 1000.0,
                distance_optimized: 1000.0 - 100.0 * i as f64,
                time_current: 2.0,
                time_optimized: 2.0 - 0.1 * i as f64,
            })
            .collect();
        WarehouseData::new(
            vec![
                LocationRow::new("Start", 0.0, 0.0),
                LocationRow::new("Rack 1", 4.0, 9.0),
            ],
            scenarios,
        )
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(format_thousands(0.0, 2), "0.00");
        assert_eq!(format_thousands(999.999, 2), "1,000.00");
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(-4321.0, 1), "-4,321.0");
        assert_eq!(format_thousands(-0.001, 2), "0.00");
        assert_eq!(format_count(180_000), "180,000");
        assert_eq!(format_money(2500.5), "$2,500.50");
        assert_eq!(format_money(-12.0), "-$12.00");
    }

    #[test]
    fn default_request_selects_loadform_five() {
        let d = data();
        let view = DashboardView::build(Ok(&d), &ViewRequest::default(), "results.xlsx");
        let roi = view.roi.unwrap();
        assert_eq!(roi.scenario, "Loadform 5");
        assert_eq!(roi.comparison.len(), 5);
        assert_eq!(view.scenarios.iter().filter(|o| o.selected).count(), 1);
        assert!(view.query.contains("scenario=Loadform%205"));
        assert_eq!(roi.distance_banner, "50.0% reduction in travel distance");
    }

    #[test]
    fn unknown_scenario_falls_back_to_default() {
        let d = data();
        let request = ViewRequest {
            scenario: Some("Loadform 42".to_string()),
            ..ViewRequest::default()
        };
        let view = DashboardView::build(Ok(&d), &request, "results.xlsx");
        assert_eq!(view.roi.unwrap().scenario, "Loadform 5");
    }

    #[test]
    fn unavailable_data_keeps_sidebar_and_tabs() {
        let err = DataUnavailable::MissingSheet("Model Testing (Final)".to_string());
        let view = DashboardView::build(Err(&err), &ViewRequest::default(), "missing.xlsx");
        assert!(view.error.unwrap().contains("Model Testing (Final)"));
        assert!(view.roi.is_none());
        assert!(view.scenarios.is_empty());
        assert_eq!(view.sliders.len(), 3);
        assert_eq!(view.route.frames, 12);
    }

    #[test]
    fn fleet_view_reports_missing_racks() {
        let d = data();
        let request = ViewRequest {
            route: RouteSet::Fleet,
            tab: Tab::Route,
            ..ViewRequest::default()
        };
        let view = DashboardView::build(Ok(&d), &request, "results.xlsx");
        assert!(view.route.is_fleet);
        assert!(view.route.error.unwrap().contains("location 11"));
        assert_eq!(view.route.cards[0].value, "30 stops");
    }

    #[test]
    fn zero_current_time_shows_not_applicable() {
        let mut d = data();
        d.scenarios[4].time_current = 0.0;
        d.scenarios[4].time_optimized = 0.0;
        let view = DashboardView::build(Ok(&d), &ViewRequest::default(), "results.xlsx");
        let roi = view.roi.unwrap();
        assert!(roi.time_banner.contains("not applicable"));
        assert_eq!(roi.comparison[4].time_reduction, "n/a");
    }
}
