use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between the workbook on disk and the
/// figures shown on screen.
///
/// These are all reported to the user as "data unavailable"; the dashboard
/// keeps running with an empty state instead of retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataUnavailable {
    /// The workbook file is missing or is not a readable xlsx file
    #[error("workbook '{}' could not be opened: {reason}", path.display())]
    Workbook { path: PathBuf, reason: String },

    /// A required sheet is not present in the workbook
    #[error("sheet '{0}' not found in workbook")]
    MissingSheet(String),

    /// A required header is not present in the layout sheet
    #[error("required column '{column}' not found in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },

    /// A scenario block ends before its distance or time row
    #[error("could not find {metric} data for {scenario}")]
    MissingMetric {
        scenario: String,
        metric: &'static str,
    },

    /// A metric cell holds something that is not a number
    #[error("{metric} value in column {column} for {scenario} is not numeric")]
    NonNumeric {
        scenario: String,
        metric: &'static str,
        column: char,
    },

    /// The comparison sheet has no `Loadform` blocks at all
    #[error("no scenario data found in sheet '{0}'")]
    NoScenarios(String),

    /// The requested scenario was not part of the loaded workbook
    #[error("scenario '{0}' not found")]
    UnknownScenario(String),

    /// A route references a layout location that was not loaded
    #[error("location {0} is missing from the warehouse layout")]
    MissingLocation(u32),
}

/// Top-level error type for the dashboard
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] DataUnavailable),

    #[error("invalid configuration in '{}': {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[cfg(feature = "web")]
    #[error("template rendering failed: {0}")]
    Template(#[from] handlebars::RenderError),

    #[cfg(feature = "web")]
    #[error("template registration failed: {0}")]
    TemplateSyntax(#[from] handlebars::TemplateError),

    #[error("workbook writing failed: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// True when the failure is one of the user-facing data problems
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, DashboardError::DataUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
