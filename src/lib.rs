/*!
# Warehouse Optimization Dashboard

A browser-based ROI dashboard for warehouse routing optimization, built in Rust.

## Overview

The dashboard reads the results of a routing optimization study from an Excel
workbook and turns them into annual savings figures. Users adjust the hourly
wage, orders per day and working days per year, pick one of the `Loadform`
scenarios, and see how much distance, time and money the optimized routing
saves compared with current practice. A second tab animates worker routes
through the warehouse.

## Architecture

### Data Layer
- **loader**: Reads the layout and comparison sheets with `calamine`
- **model**: Layout rows, scenario results and the loaded tables
- **error**: The `DataUnavailable` taxonomy and the top-level error type

### Computation Layer
- **roi**: Per-scenario ROI arithmetic and the all-scenarios comparison
- **animation**: Scripted route sets and their per-step frames

### Presentation Layer
- **dashboard**: View model for the page (cards, tables, sliders, formatting)
- **graph**: SVG charts rendered with `plotters`
- **app**: Axum routes for the page, JSON endpoints and charts

### Support
- **config**: TOML configuration with defaults
- **logging**: `env_logger` set-up
- **sample**: Writes a demo workbook in the expected layout

## REST API Endpoints

- `/` - The dashboard page (`tab`, `wage`, `orders`, `days`, `scenario`, `route`)
- `/api/data` - Loaded layout and scenarios
- `/api/roi` - ROI figures for one scenario
- `/api/comparison` - ROI figures for every scenario
- `/charts/{layout,distance,time,reduction,savings}` - SVG charts
- `/charts/route/{set}/{frame}` - One frame of a route animation
*/

pub mod animation;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod logging;
pub mod model;
pub mod roi;
pub mod sample;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod graph;

pub use error::{DashboardError, DataUnavailable};
pub use loader::{SheetNames, load_workbook};
pub use model::{LocationRow, ScenarioResult, WarehouseData};
pub use roi::{Reduction, RoiInputs, RoiOutputs};
