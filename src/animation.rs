use crate::error::DataUnavailable;
use crate::model::WarehouseData;
use serde::Serialize;

/// A position on the warehouse floor, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// How a worker is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Marker {
    Square,
    Circle,
    Cross,
}

/// One scripted worker path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub name: String,
    /// RGB colour used for the path and the worker
    pub color: (u8, u8, u8),
    pub marker: Marker,
    pub coords: Vec<Point>,
    /// Dotted paths are drawn thinner and semi-transparent
    pub dotted: bool,
}

/// Worker positions at one step of the animation, one per route in route
/// order. A route without coordinates has no worker to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub index: usize,
    pub positions: Vec<Option<Point>>,
}

/// Which scripted animation to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteSet {
    /// Hard-coded 12-step current vs. optimized pair
    Pair,
    /// One current-practice worker against a fleet of four
    Fleet,
}

impl RouteSet {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("fleet") => RouteSet::Fleet,
            _ => RouteSet::Pair,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            RouteSet::Pair => "pair",
            RouteSet::Fleet => "fleet",
        }
    }
}

pub const CURRENT_COLOR: (u8, u8, u8) = (0xe7, 0x4c, 0x3c);
pub const OPTIMIZED_COLOR: (u8, u8, u8) = (0x2e, 0xcc, 0x71);

/// Number of frames in the demo route pair
pub const DEMO_STEPS: usize = 12;

const DEMO_CURRENT: [Point; DEMO_STEPS] = [
    Point::new(0.0, 0.0),
    Point::new(4.0, 24.0),
    Point::new(10.0, 4.0),
    Point::new(16.0, 19.0),
    Point::new(4.0, 9.0),
    Point::new(22.0, 24.0),
    Point::new(10.0, 14.0),
    Point::new(28.0, 4.0),
    Point::new(16.0, 9.0),
    Point::new(34.0, 19.0),
    Point::new(22.0, 14.0),
    Point::new(0.0, 0.0),
];

const DEMO_OPTIMIZED: [Point; 9] = [
    Point::new(0.0, 0.0),
    Point::new(4.0, 9.0),
    Point::new(4.0, 24.0),
    Point::new(10.0, 14.0),
    Point::new(16.0, 9.0),
    Point::new(16.0, 19.0),
    Point::new(22.0, 24.0),
    Point::new(22.0, 14.0),
    Point::new(0.0, 0.0),
];

/// Rack visiting order of the single current-practice worker
pub const FLEET_CURRENT_NODES: [u32; 30] = [
    1, 11, 21, 6, 16, 26, 2, 12, 22, 7, 17, 27, 3, 13, 23, 8, 18, 28, 4, 14, 24, 9, 19, 29, 5,
    15, 25, 10, 20, 30,
];

/// One zone per optimized worker
pub const FLEET_OPTIMIZED_NODES: [&[u32]; 4] = [
    &[1, 2, 3, 4, 5, 10, 9, 8],
    &[6, 7, 11, 12, 13, 14, 15],
    &[16, 17, 18, 19, 20, 25, 24],
    &[21, 22, 23, 26, 27, 28, 29, 30],
];

const FLEET_COLORS: [(u8, u8, u8); 4] = [
    OPTIMIZED_COLOR,
    (0x34, 0x98, 0xdb),
    (0xf3, 0x9c, 0x12),
    (0x9b, 0x59, 0xb6),
];

/// A set of routes animated side by side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteAnimation {
    pub routes: Vec<Route>,
}

impl RouteAnimation {
    pub fn new(routes: Vec<Route>) -> Self {
        RouteAnimation { routes }
    }

    /// The fixed demo comparison. The coordinates are literal and do not
    /// depend on the loaded workbook.
    pub fn demo_pair() -> Self {
        RouteAnimation::new(vec![
            Route {
                name: "Current Practice".to_string(),
                color: CURRENT_COLOR,
                marker: Marker::Square,
                coords: DEMO_CURRENT.to_vec(),
                dotted: true,
            },
            Route {
                name: "Optimized".to_string(),
                color: OPTIMIZED_COLOR,
                marker: Marker::Square,
                coords: DEMO_OPTIMIZED.to_vec(),
                dotted: false,
            },
        ])
    }

    /// One zig-zagging worker against four zoned workers, each path running
    /// `Start -> racks -> Start` over the loaded layout.
    pub fn fleet(data: &WarehouseData) -> Result<Self, DataUnavailable> {
        let mut routes = vec![Route {
            name: "Current Practice".to_string(),
            color: CURRENT_COLOR,
            marker: Marker::Cross,
            coords: node_path(data, &FLEET_CURRENT_NODES)?,
            dotted: true,
        }];
        for (i, (nodes, color)) in FLEET_OPTIMIZED_NODES.iter().zip(FLEET_COLORS).enumerate() {
            routes.push(Route {
                name: format!("Optimized {}", i + 1),
                color,
                marker: Marker::Circle,
                coords: node_path(data, nodes)?,
                dotted: false,
            });
        }
        Ok(RouteAnimation::new(routes))
    }

    /// Length of the longest route
    pub fn frame_count(&self) -> usize {
        self.routes.iter().map(|r| r.coords.len()).max().unwrap_or(0)
    }

    /// Worker positions at step `k`. Routes that already finished stay on
    /// their last point.
    pub fn frame(&self, k: usize) -> Option<Frame> {
        if k >= self.frame_count() {
            return None;
        }
        let positions = self
            .routes
            .iter()
            .map(|r| r.coords.get(k).or_else(|| r.coords.last()).copied())
            .collect();
        Some(Frame { index: k, positions })
    }

    pub fn frames(&self) -> Vec<Frame> {
        (0..self.frame_count()).filter_map(|k| self.frame(k)).collect()
    }

    /// Points of every route, for sizing the chart axes
    pub fn all_points(&self) -> impl Iterator<Item = &Point> {
        self.routes.iter().flat_map(|r| r.coords.iter())
    }
}

/// Stops per worker in the fleet simulation, for the metric cards
pub fn fleet_stop_counts() -> (usize, usize) {
    let optimized = FLEET_OPTIMIZED_NODES.iter().map(|z| z.len()).sum();
    (FLEET_CURRENT_NODES.len(), optimized)
}

fn node_path(data: &WarehouseData, nodes: &[u32]) -> Result<Vec<Point>, DataUnavailable> {
    if nodes.is_empty() {
        return Ok(Vec::new());
    }
    let start = data.location_by_node(0)?;
    let start = Point::new(start.x, start.y);

    let mut path = Vec::with_capacity(nodes.len() + 2);
    path.push(start);
    for &node in nodes {
        let loc = data.location_by_node(node)?;
        path.push(Point::new(loc.x, loc.y));
    }
    path.push(start);
    Ok(path)
}
