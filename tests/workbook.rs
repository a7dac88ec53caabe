use std::path::PathBuf;
use tempfile::TempDir;
use warehouse_dashboard::loader::{SheetNames, load_workbook};
use warehouse_dashboard::roi::{self, Reduction, RoiInputs};
use warehouse_dashboard::sample::{SAMPLE_RESULTS, sample_location_count, write_sample_workbook};
use warehouse_dashboard::{DataUnavailable, animation::RouteAnimation};

fn sample_file(dir: &TempDir, sheets: &SheetNames) -> PathBuf {
    let path = dir.path().join("results.xlsx");
    write_sample_workbook(&path, sheets).unwrap();
    path
}

#[test]
fn sample_workbook_loads_every_row() {
    let dir = TempDir::new().unwrap();
    let path = sample_file(&dir, &SheetNames::default());

    let data = load_workbook(&path, &SheetNames::default()).unwrap();
    assert_eq!(data.layout.len(), sample_location_count());
    assert_eq!(data.scenarios.len(), SAMPLE_RESULTS.len());
    assert!(data.start().is_some());
    assert_eq!(data.racks().count(), 30);

    let names = data.scenario_names();
    assert_eq!(names, vec!["Loadform 1", "Loadform 2", "Loadform 3", "Loadform 4", "Loadform 5"]);

    let third = data.scenario("Loadform 3").unwrap();
    let (d_opt, d_cur, t_opt, t_cur) = SAMPLE_RESULTS[2];
    assert_eq!(third.distance_optimized, d_opt);
    assert_eq!(third.distance_current, d_cur);
    assert_eq!(third.time_optimized, t_opt);
    assert_eq!(third.time_current, t_cur);
}

#[test]
fn loaded_scenarios_feed_the_roi_model() {
    let dir = TempDir::new().unwrap();
    let path = sample_file(&dir, &SheetNames::default());
    let data = load_workbook(&path, &SheetNames::default()).unwrap();

    let rows = roi::compare_all(&data.scenarios, &RoiInputs::default());
    assert_eq!(rows.len(), 5);
    for row in &rows {
        let fraction = row.distance_reduction.fraction().unwrap();
        assert!(fraction > 0.0 && fraction <= 1.0);
        assert!(row.annual_cost_saved > 0.0);
        assert_ne!(row.time_reduction, Reduction::NotApplicable);
    }
}

#[test]
fn fleet_routes_resolve_against_the_sample_layout() {
    let dir = TempDir::new().unwrap();
    let path = sample_file(&dir, &SheetNames::default());
    let data = load_workbook(&path, &SheetNames::default()).unwrap();

    let fleet = RouteAnimation::fleet(&data).unwrap();
    assert_eq!(fleet.routes.len(), 5);
    // 30 racks plus the depot at both ends
    assert_eq!(fleet.frame_count(), 32);
}

#[test]
fn missing_sheet_is_reported_without_partial_data() {
    let dir = TempDir::new().unwrap();
    let written = SheetNames {
        layout: "Layout".to_string(),
        ..SheetNames::default()
    };
    let path = sample_file(&dir, &written);

    let err = load_workbook(&path, &SheetNames::default()).unwrap_err();
    assert_eq!(
        err,
        DataUnavailable::MissingSheet("Model Testing (Final)".to_string())
    );
}

#[test]
fn missing_file_is_data_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.xlsx");

    let err = load_workbook(&path, &SheetNames::default()).unwrap_err();
    assert!(matches!(err, DataUnavailable::Workbook { path: ref p, .. } if *p == path));
}
