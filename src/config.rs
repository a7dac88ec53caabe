use crate::error::DashboardError;
use crate::loader::SheetNames;
use crate::roi::RoiInputs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "WAREHOUSE_DASHBOARD_CONFIG";
/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";
pub const DEFAULT_WORKBOOK: &str =
    "Danish Final Model - Flow Conservation with Data Analysis and Results.xlsx";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:3000".to_string(),
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

/// Settings for the dashboard server
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub workbook: PathBuf,
    pub sheets: SheetNames,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    /// Sidebar values before the user touches anything
    pub defaults: RoiInputs,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            workbook: PathBuf::from(DEFAULT_WORKBOOK),
            sheets: SheetNames::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            defaults: RoiInputs::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, DashboardError> {
        let mut config: DashboardConfig =
            toml::from_str(text).map_err(|e| DashboardError::Config {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })?;
        config.defaults = config.defaults.clamped();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, DashboardError> {
        let text = fs::read_to_string(path).map_err(|e| DashboardError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text, path)
    }

    /// Pick the configuration file to read
    ///
    /// An explicit path wins, then the environment variable, then
    /// `dashboard.toml` in the working directory.
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        let local = Path::new(DEFAULT_CONFIG_FILE);
        explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(|| local.exists().then(|| local.to_path_buf()))
    }

    /// Load the file chosen by [`DashboardConfig::resolve_path`], or the
    /// built-in defaults when there is none
    ///
    /// Runs before the logger is installed, so the chosen path is returned
    /// for the caller to report.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), DashboardError> {
        match Self::resolve_path(explicit) {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = DashboardConfig::from_toml(
            r#"
                workbook = "data/results.xlsx"

                [server]
                bind = "0.0.0.0:8080"

                [defaults]
                hourly_wage = 32.5
            "#,
            Path::new("inline.toml"),
        )
        .unwrap();

        assert_eq!(config.workbook, PathBuf::from("data/results.xlsx"));
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.static_dir, PathBuf::from("static"));
        assert_eq!(config.sheets, SheetNames::default());
        assert_eq!(config.defaults.hourly_wage, 32.5);
        assert_eq!(config.defaults.orders_per_day, 600);
    }

    #[test]
    fn out_of_range_defaults_are_clamped() {
        let config = DashboardConfig::from_toml(
            "[defaults]\norders_per_day = 10\nworking_days_per_year = 900\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(config.defaults.orders_per_day, 100);
        assert_eq!(config.defaults.working_days_per_year, 365);
    }

    #[test]
    fn malformed_file_names_its_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workbook = [").unwrap();
        let err = DashboardConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, DashboardError::Config { ref path, .. } if path == file.path()));
    }

    #[test]
    fn explicit_path_wins_over_environment() {
        let explicit = Path::new("explicit.toml");
        assert_eq!(
            DashboardConfig::resolve_path(Some(explicit)),
            Some(PathBuf::from("explicit.toml"))
        );
    }

    #[test]
    fn explicit_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sheets]\nlayout = \"Layout\"").unwrap();
        let (config, source) = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(source.as_deref(), Some(file.path()));
        assert_eq!(config.sheets.layout, "Layout");
        assert_eq!(config.sheets.comparison, "Data Analysis (Comparison)");
    }
}
