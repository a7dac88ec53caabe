use std::env;
use std::path::PathBuf;
use warehouse_dashboard::config::DEFAULT_WORKBOOK;
use warehouse_dashboard::loader::SheetNames;
use warehouse_dashboard::logging;
use warehouse_dashboard::sample::write_sample_workbook;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("info");

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK));

    write_sample_workbook(&path, &SheetNames::default())?;
    log::info!("Sample workbook written to {}", path.display());

    Ok(())
}
