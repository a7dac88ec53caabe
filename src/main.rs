use clap::Parser;
use log::info;
use std::path::PathBuf;
use warehouse_dashboard::app;
use warehouse_dashboard::config::DashboardConfig;
use warehouse_dashboard::logging;

/// Serve the warehouse optimization ROI dashboard
#[derive(Parser, Debug)]
#[command(name = "dashboard", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Workbook to load instead of the configured one
    #[arg(short, long)]
    workbook: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8080
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (mut config, source) = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(workbook) = cli.workbook {
        config.workbook = workbook;
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    logging::init(&config.logging.level);
    match source {
        Some(path) => info!("Configuration read from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    // Start the web application
    app::run(config).await?;

    Ok(())
}
