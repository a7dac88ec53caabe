use crate::error::DataUnavailable;
use serde::{Deserialize, Serialize};

/// Name the layout sheet uses for the depot every route starts from
pub const START_LOCATION: &str = "Start";

/// Scenario preselected in the sidebar when the workbook has it
pub const DEFAULT_SCENARIO: &str = "Loadform 5";

/// What a layout location is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationCategory {
    /// The depot where pickers start and finish
    Start,
    /// A storage rack visited by pickers
    Rack,
}

/// One row of the warehouse layout sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRow {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub category: LocationCategory,
}

impl LocationRow {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        let name = name.into();
        let category = if name == START_LOCATION {
            LocationCategory::Start
        } else {
            LocationCategory::Rack
        };
        LocationRow {
            name,
            x,
            y,
            category,
        }
    }

    pub fn is_start(&self) -> bool {
        self.category == LocationCategory::Start
    }

    /// Node number used by the route definitions
    ///
    /// The start point is node 0. Racks are numbered by the integer after the
    /// last space of their name, so `"Rack 7"` is node 7.
    pub fn node_id(&self) -> Option<u32> {
        if self.is_start() {
            return Some(0);
        }
        self.name
            .rsplit(' ')
            .next()
            .and_then(|part| part.trim().parse().ok())
    }
}

/// Current-practice vs. optimized figures for one Loadform scenario
///
/// Distances are meters per order, times are hours per order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub distance_current: f64,
    pub distance_optimized: f64,
    pub time_current: f64,
    pub time_optimized: f64,
}

impl ScenarioResult {
    pub fn distance_saved(&self) -> f64 {
        self.distance_current - self.distance_optimized
    }

    pub fn time_saved(&self) -> f64 {
        self.time_current - self.time_optimized
    }
}

/// Summary numbers shown under the layout chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutStats {
    pub total_locations: usize,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
}

/// Everything read from the workbook
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WarehouseData {
    pub layout: Vec<LocationRow>,
    pub scenarios: Vec<ScenarioResult>,
}

impl WarehouseData {
    pub fn new(layout: Vec<LocationRow>, scenarios: Vec<ScenarioResult>) -> Self {
        WarehouseData { layout, scenarios }
    }

    pub fn scenario(&self, name: &str) -> Result<&ScenarioResult, DataUnavailable> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| DataUnavailable::UnknownScenario(name.to_string()))
    }

    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    /// `Loadform 5` when the workbook has it, otherwise the first scenario
    pub fn default_scenario(&self) -> Option<&ScenarioResult> {
        self.scenarios
            .iter()
            .find(|s| s.name == DEFAULT_SCENARIO)
            .or_else(|| self.scenarios.first())
    }

    pub fn start(&self) -> Option<&LocationRow> {
        self.layout.iter().find(|l| l.is_start())
    }

    pub fn racks(&self) -> impl Iterator<Item = &LocationRow> {
        self.layout.iter().filter(|l| !l.is_start())
    }

    pub fn location_by_node(&self, node: u32) -> Result<&LocationRow, DataUnavailable> {
        self.layout
            .iter()
            .find(|l| l.node_id() == Some(node))
            .ok_or(DataUnavailable::MissingLocation(node))
    }

    pub fn layout_stats(&self) -> LayoutStats {
        LayoutStats {
            total_locations: self.layout.len(),
            x_range: min_max(self.layout.iter().map(|l| l.x)),
            y_range: min_max(self.layout.iter().map(|l| l.y)),
        }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
