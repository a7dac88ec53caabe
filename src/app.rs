#![cfg(feature = "web")]
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use handlebars::Handlebars;
use log::{error, info, warn};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::animation::{RouteAnimation, RouteSet};
use crate::config::DashboardConfig;
use crate::dashboard::{DashboardView, Tab, ViewRequest, select_scenario};
use crate::error::{DashboardError, DataUnavailable};
use crate::graph::{self, GraphOptions, Metric};
use crate::loader;
use crate::model::{ScenarioResult, WarehouseData};
use crate::roi::{self, RoiInputs};

const PAGE_TEMPLATE: &str = "dashboard";

/// Shared, read-only state behind every handler
pub struct AppState {
    config: DashboardConfig,
    data: Result<WarehouseData, DataUnavailable>,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(
        config: DashboardConfig,
        data: Result<WarehouseData, DataUnavailable>,
    ) -> Result<Self, DashboardError> {
        let mut templates = Handlebars::new();
        templates.register_template_string(PAGE_TEMPLATE, include_str!("./static/dashboard.hbs"))?;
        Ok(AppState {
            config,
            data,
            templates,
        })
    }

    /// Read the configured workbook once and keep the outcome
    ///
    /// A workbook that cannot be loaded is not fatal: the failure is kept and
    /// shown on every page.
    pub fn load(config: DashboardConfig) -> Result<Self, DashboardError> {
        let data = loader::load_workbook(&config.workbook, &config.sheets);
        if let Err(e) = &data {
            warn!("Starting without data: {}", e);
        }
        Self::new(config, data)
    }

    pub fn data(&self) -> Result<&WarehouseData, &DataUnavailable> {
        self.data.as_ref()
    }

    fn loaded(&self) -> Result<&WarehouseData, ApiError> {
        self.data.as_ref().map_err(|e| ApiError::from(e.clone()))
    }
}

/// Sidebar form fields; anything missing falls back to the configured defaults
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    wage: Option<f64>,
    orders: Option<u32>,
    days: Option<u32>,
    scenario: Option<String>,
    tab: Option<String>,
    route: Option<String>,
}

impl DashboardQuery {
    fn inputs(&self, defaults: &RoiInputs) -> RoiInputs {
        RoiInputs::new(
            self.wage.unwrap_or(defaults.hourly_wage),
            self.orders.unwrap_or(defaults.orders_per_day),
            self.days.unwrap_or(defaults.working_days_per_year),
        )
        .clamped()
    }

    fn view_request(&self, defaults: &RoiInputs) -> ViewRequest {
        ViewRequest {
            inputs: self.inputs(defaults),
            scenario: self.scenario.clone().filter(|s| !s.is_empty()),
            tab: Tab::from_param(self.tab.as_deref()),
            route: RouteSet::from_param(self.route.as_deref()),
        }
    }

    /// The named scenario, or the default one when none was asked for
    fn scenario<'a>(&self, data: &'a WarehouseData) -> Result<&'a ScenarioResult, ApiError> {
        match self.scenario.as_deref().filter(|s| !s.is_empty()) {
            Some(name) => Ok(data.scenario(name)?),
            None => select_scenario(data, None)
                .ok_or_else(|| ApiError::from(DataUnavailable::NoScenarios(String::new()))),
        }
    }
}

/// Error response carrying a status code and a plain-text message
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<DataUnavailable> for ApiError {
    fn from(e: DataUnavailable) -> Self {
        let status = match e {
            DataUnavailable::UnknownScenario(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::SERVICE_UNAVAILABLE,
        };
        ApiError {
            status,
            message: e.to_string(),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        match e {
            DashboardError::DataUnavailable(d) => d.into(),
            other => {
                error!("Request failed: {}", other);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: other.to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

fn svg(body: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], body).into_response()
}

/// Build the dashboard router over a prepared state
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/api/data", get(get_data))
        .route("/api/roi", get(get_roi))
        .route("/api/comparison", get(get_comparison))
        .route("/charts/layout", get(layout_chart))
        .route("/charts/distance", get(distance_chart))
        .route("/charts/time", get(time_chart))
        .route("/charts/reduction", get(reduction_chart))
        .route("/charts/savings", get(savings_chart))
        .route("/charts/route/:set/:frame", get(route_frame))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Load the workbook, bind and serve until the process is stopped
pub async fn run(config: DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let bind = config.server.bind.clone();
    let state = Arc::new(AppState::load(config)?);
    let app = router(state);

    let listener = TcpListener::bind(&bind).await?;
    info!("Listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard(
    Query(params): Query<DashboardQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ApiError> {
    let request = params.view_request(&state.config.defaults);
    let source = state.config.workbook.display().to_string();
    let view = DashboardView::build(state.data(), &request, &source);
    let page = state
        .templates
        .render(PAGE_TEMPLATE, &view)
        .map_err(DashboardError::from)?;
    Ok(Html(page))
}

async fn get_data(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let data = state.loaded()?;
    Ok(Json(serde_json::json!({
        "layout": data.layout,
        "scenarios": data.scenarios,
        "layout_stats": data.layout_stats(),
    })))
}

async fn get_roi(
    Query(params): Query<DashboardQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let data = state.loaded()?;
    let scenario = params.scenario(data)?;
    let inputs = params.inputs(&state.config.defaults);
    Ok(Json(roi::compute(scenario, &inputs)))
}

async fn get_comparison(
    Query(params): Query<DashboardQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let data = state.loaded()?;
    let inputs = params.inputs(&state.config.defaults);
    Ok(Json(roi::compare_all(&data.scenarios, &inputs)))
}

async fn layout_chart(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let data = state.loaded()?;
    let options = GraphOptions::titled("Warehouse Layout", "X Coordinate", "Y Coordinate")
        .with_size(720, 560);
    Ok(svg(graph::layout_chart(data, &options)?))
}

async fn distance_chart(
    Query(params): Query<DashboardQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    metric_chart(&params, &state, Metric::Distance)
}

async fn time_chart(
    Query(params): Query<DashboardQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    metric_chart(&params, &state, Metric::Time)
}

fn metric_chart(
    params: &DashboardQuery,
    state: &AppState,
    metric: Metric,
) -> Result<Response, ApiError> {
    let data = state.loaded()?;
    let scenario = params.scenario(data)?;
    let options = match metric {
        Metric::Distance => GraphOptions::titled(
            &format!("Total Distance Comparison - {}", scenario.name),
            "",
            "Distance (meters)",
        ),
        Metric::Time => GraphOptions::titled(
            &format!("Operation Time Comparison - {}", scenario.name),
            "",
            "Time (hours)",
        ),
    };
    Ok(svg(graph::comparison_chart(scenario, metric, &options)?))
}

async fn reduction_chart(
    Query(params): Query<DashboardQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let data = state.loaded()?;
    let rows = roi::compare_all(&data.scenarios, &params.inputs(&state.config.defaults));
    let options = GraphOptions::titled(
        "Distance Reduction by Scenario",
        "Scenario",
        "Distance Reduction (%)",
    );
    Ok(svg(graph::reduction_chart(&rows, &options)?))
}

async fn savings_chart(
    Query(params): Query<DashboardQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let data = state.loaded()?;
    let rows = roi::compare_all(&data.scenarios, &params.inputs(&state.config.defaults));
    let options = GraphOptions::titled(
        "Annual Cost Savings by Scenario",
        "Scenario",
        "Annual Savings ($)",
    );
    Ok(svg(graph::savings_chart(&rows, &options)?))
}

async fn route_frame(
    Path((set, frame)): Path<(String, usize)>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let set = match set.as_str() {
        "pair" => RouteSet::Pair,
        "fleet" => RouteSet::Fleet,
        _ => {
            return Err(ApiError {
                status: StatusCode::NOT_FOUND,
                message: format!("unknown route set '{}'", set),
            });
        }
    };

    let layout = state.data().ok();
    let animation = match set {
        RouteSet::Fleet => RouteAnimation::fleet(state.loaded()?)?,
        RouteSet::Pair => RouteAnimation::demo_pair(),
    };

    if frame >= animation.frame_count() {
        return Err(ApiError {
            status: StatusCode::NOT_FOUND,
            message: format!(
                "frame {} out of range (0..{})",
                frame,
                animation.frame_count()
            ),
        });
    }

    let title = match set {
        RouteSet::Pair => "Current vs. Optimized Route",
        RouteSet::Fleet => "Current Worker vs. Optimized Fleet",
    };
    let options = GraphOptions::titled(
        &format!("{} (step {} of {})", title, frame + 1, animation.frame_count()),
        "X Coordinate",
        "Y Coordinate",
    )
    .with_size(720, 560);
    Ok(svg(graph::route_frame_chart(&animation, frame, layout, &options)?))
}
