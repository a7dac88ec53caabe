use crate::error::DataUnavailable;
use crate::model::{LocationRow, ScenarioResult, WarehouseData};
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

lazy_static! {
    static ref LOADFORM_HEADER: Regex = Regex::new(r"Loadform\s*([^)]*?)\s*(?:\)|Loadform|$)").unwrap();
}

/// Rows above the layout header (banner, notes, blank lines)
pub const LAYOUT_SKIP_ROWS: u32 = 7;

/// Column holding the optimized model figures (C)
const OPTIMIZED_COLUMN: u32 = 2;
/// Column holding the current practice figures (M)
const CURRENT_COLUMN: u32 = 12;
/// Offset from a `Loadform` header to its total distance row
const DISTANCE_ROW_OFFSET: u32 = 2;
/// Offset from a `Loadform` header to its total time row
const TIME_ROW_OFFSET: u32 = 4;

const LAYOUT_COLUMNS: [&str; 3] = ["Location", "x", "y"];

/// Names of the two sheets the dashboard reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub layout: String,
    pub comparison: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        SheetNames {
            layout: "Model Testing (Final)".to_string(),
            comparison: "Data Analysis (Comparison)".to_string(),
        }
    }
}

/// Load the layout and scenario tables from an Excel workbook
///
/// Both sheets must be present and parse cleanly; on any failure nothing is
/// returned, so callers never see a half-loaded workbook.
///
/// # Arguments
/// * `filepath` - Path to the xlsx file
/// * `sheets` - Names of the layout and comparison sheets
///
/// # Returns
/// * `Result<WarehouseData, DataUnavailable>` - The loaded tables or the reason they are unavailable
///
/// # Examples
/// ```no_run
/// use warehouse_dashboard::loader::{load_workbook, SheetNames};
///
/// match load_workbook("results.xlsx", &SheetNames::default()) {
///     Ok(data) => println!("Loaded {} scenarios", data.scenarios.len()),
///     Err(e) => eprintln!("Data unavailable: {}", e),
/// }
/// ```
pub fn load_workbook(
    filepath: impl AsRef<Path>,
    sheets: &SheetNames,
) -> Result<WarehouseData, DataUnavailable> {
    let path = filepath.as_ref();
    let mut workbook = open_workbook::<Xlsx<_>, _>(path).map_err(|e| DataUnavailable::Workbook {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let layout_range = sheet_range(&mut workbook, &sheets.layout)?;
    let comparison_range = sheet_range(&mut workbook, &sheets.comparison)?;

    let layout = parse_layout(&layout_range, &sheets.layout)?;
    let scenarios = parse_scenarios(&comparison_range, &sheets.comparison)?;

    info!(
        "Loaded {} locations and {} scenarios from {}",
        layout.len(),
        scenarios.len(),
        path.display()
    );
    Ok(WarehouseData::new(layout, scenarios))
}

fn sheet_range<R>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<Data>, DataUnavailable>
where
    R: std::io::Read + std::io::Seek,
{
    if !workbook.sheet_names().iter().any(|s| s == name) {
        return Err(DataUnavailable::MissingSheet(name.to_string()));
    }
    workbook
        .worksheet_range(name)
        .map_err(|e| {
            warn!("Sheet '{}' could not be read: {}", name, e);
            DataUnavailable::MissingSheet(name.to_string())
        })
}

/// Parse the warehouse layout table
///
/// The header sits on row 8 (after [`LAYOUT_SKIP_ROWS`] rows) and must
/// contain `Location`, `x` and `y`. Coordinates are coerced to numbers and
/// rows with an empty location or a non-numeric coordinate are dropped.
pub fn parse_layout(range: &Range<Data>, sheet: &str) -> Result<Vec<LocationRow>, DataUnavailable> {
    let header_row = LAYOUT_SKIP_ROWS;
    let width = last_column(range);

    let mut columns = [0u32; 3];
    for (slot, wanted) in columns.iter_mut().zip(LAYOUT_COLUMNS) {
        *slot = (0..=width)
            .find(|&c| cell_text(range, header_row, c).trim() == wanted)
            .ok_or_else(|| DataUnavailable::MissingColumn {
                sheet: sheet.to_string(),
                column: wanted.to_string(),
            })?;
    }
    let [name_col, x_col, y_col] = columns;

    let mut rows = Vec::new();
    for r in (header_row + 1)..=last_row(range) {
        let name = cell_text(range, r, name_col).trim().to_string();
        let x = cell_number(range, r, x_col);
        let y = cell_number(range, r, y_col);
        match (name.is_empty(), x, y) {
            (false, Some(x), Some(y)) => rows.push(LocationRow::new(name, x, y)),
            _ => debug!("Skipping layout row {} in '{}'", r + 1, sheet),
        }
    }
    Ok(rows)
}

/// Parse the scenario comparison table
///
/// Every row whose first cell mentions `Loadform` opens a block: total
/// distance is two rows below and total time four rows below, with the
/// optimized figure in column C and the current practice figure in column M.
pub fn parse_scenarios(
    range: &Range<Data>,
    sheet: &str,
) -> Result<Vec<ScenarioResult>, DataUnavailable> {
    let height = last_row(range);
    let mut results = Vec::new();

    for r in 0..=height {
        let label = cell_text(range, r, 0);
        let Some(name) = scenario_name(&label) else {
            continue;
        };

        let (distance_optimized, distance_current) =
            metric_pair(range, height, r + DISTANCE_ROW_OFFSET, &name, "distance")?;
        let (time_optimized, time_current) =
            metric_pair(range, height, r + TIME_ROW_OFFSET, &name, "time")?;

        results.push(ScenarioResult {
            name,
            distance_current,
            distance_optimized,
            time_current,
            time_optimized,
        });
    }

    if results.is_empty() {
        return Err(DataUnavailable::NoScenarios(sheet.to_string()));
    }
    Ok(results)
}

/// Normalise a block header such as `Results (Loadform 3)` to `Loadform 3`
///
/// The id ends at the first `)` or at the next `Loadform`.
pub fn scenario_name(label: &str) -> Option<String> {
    let caps = LOADFORM_HEADER.captures(label)?;
    let id = caps.get(1)?.as_str().trim();
    if id.is_empty() {
        return None;
    }
    Some(format!("Loadform {}", id))
}

fn metric_pair(
    range: &Range<Data>,
    height: u32,
    row: u32,
    scenario: &str,
    metric: &'static str,
) -> Result<(f64, f64), DataUnavailable> {
    if row > height {
        return Err(DataUnavailable::MissingMetric {
            scenario: scenario.to_string(),
            metric,
        });
    }
    let read = |col: u32, letter: char| {
        cell_number(range, row, col).ok_or_else(|| DataUnavailable::NonNumeric {
            scenario: scenario.to_string(),
            metric,
            column: letter,
        })
    };
    Ok((read(OPTIMIZED_COLUMN, 'C')?, read(CURRENT_COLUMN, 'M')?))
}

// Cell positions are absolute so row/column constants line up with the sheet
// no matter where calamine decides the used range starts.
fn cell(range: &Range<Data>, row: u32, col: u32) -> Option<&Data> {
    range.get_value((row, col))
}

fn cell_text(range: &Range<Data>, row: u32, col: u32) -> String {
    match cell(range, row, col) {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn cell_number(range: &Range<Data>, row: u32, col: u32) -> Option<f64> {
    let value = match cell(range, row, col)? {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn last_row(range: &Range<Data>) -> u32 {
    range.end().map(|(r, _)| r).unwrap_or(0)
}

fn last_column(range: &Range<Data>) -> u32 {
    range.end().map(|(_, c)| c).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(cells: &[((u32, u32), Data)]) -> Range<Data> {
        let mut range = Range::new((0, 0), (0, 0));
        for (pos, value) in cells {
            range.set_value(*pos, value.clone());
        }
        range
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    fn layout_header() -> Vec<((u32, u32), Data)> {
        vec![
            ((0, 0), text("Warehouse layout")),
            ((7, 0), text("Location")),
            ((7, 1), text("x")),
            ((7, 2), text("y")),
        ]
    }

    #[test]
    fn scenario_names_are_normalised() {
        assert_eq!(
            scenario_name("Results (Loadform 3)").as_deref(),
            Some("Loadform 3")
        );
        assert_eq!(scenario_name("Loadform 1").as_deref(), Some("Loadform 1"));
        assert_eq!(scenario_name("Loadform )"), None);
        assert_eq!(scenario_name("Total Distance"), None);
    }

    #[test]
    fn scenario_id_stops_at_the_next_loadform() {
        assert_eq!(
            scenario_name("Loadform 1 vs Loadform 2").as_deref(),
            Some("Loadform 1 vs")
        );
        assert_eq!(
            scenario_name("Results (Loadform 2) - final").as_deref(),
            Some("Loadform 2")
        );
    }

    #[test]
    fn layout_range_starting_at_the_header_row() {
        // calamine trims leading blank rows, so the used range may start late
        let mut range = Range::new((7, 0), (9, 2));
        for (pos, value) in [
            ((7, 0), text("Location")),
            ((7, 1), text("x")),
            ((7, 2), text("y")),
            ((8, 0), text("Start")),
            ((8, 1), Data::Int(0)),
            ((8, 2), Data::Int(0)),
            ((9, 0), text("Rack 3")),
            ((9, 1), Data::Float(16.0)),
            ((9, 2), Data::Float(4.0)),
        ] {
            range.set_value(pos, value);
        }
        assert_eq!(range.start(), Some((7, 0)));

        let rows = parse_layout(&range, "Layout").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "Rack 3");
        assert_eq!((rows[1].x, rows[1].y), (16.0, 4.0));
    }

    #[test]
    fn scenario_range_starting_below_row_zero() {
        let mut range = Range::new((3, 0), (7, 12));
        for (pos, value) in [
            ((3, 0), text("Results (Loadform 1)")),
            ((5, 2), Data::Float(300.0)),
            ((5, 12), Data::Float(500.0)),
            ((7, 2), Data::Float(1.0)),
            ((7, 12), Data::Float(1.5)),
        ] {
            range.set_value(pos, value);
        }

        let scenarios = parse_scenarios(&range, "Comparison").unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].distance_current, 500.0);
        assert_eq!(scenarios[0].time_optimized, 1.0);
    }

    #[test]
    fn layout_rows_follow_the_header() {
        let mut cells = layout_header();
        cells.extend([
            ((8, 0), text("Start")),
            ((8, 1), Data::Int(0)),
            ((8, 2), Data::Int(0)),
            ((9, 0), text("Rack 1")),
            ((9, 1), Data::Float(4.5)),
            ((9, 2), text("7")),
        ]);
        let rows = parse_layout(&sheet(&cells), "Layout").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_start());
        assert_eq!(rows[1].x, 4.5);
        assert_eq!(rows[1].y, 7.0);
    }

    #[test]
    fn layout_rows_with_bad_coordinates_are_dropped() {
        crate::logging::init_for_tests();
        let mut cells = layout_header();
        cells.extend([
            ((8, 0), text("Rack 1")),
            ((8, 1), text("n/a")),
            ((8, 2), Data::Int(3)),
            ((9, 0), Data::Empty),
            ((9, 1), Data::Int(1)),
            ((9, 2), Data::Int(1)),
            ((10, 0), text("Rack 2")),
            ((10, 1), Data::Int(2)),
            ((10, 2), Data::Int(2)),
        ]);
        let rows = parse_layout(&sheet(&cells), "Layout").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Rack 2");
    }

    #[test]
    fn missing_layout_column_is_reported() {
        let cells = vec![((7, 0), text("Location")), ((7, 1), text("x"))];
        let err = parse_layout(&sheet(&cells), "Layout").unwrap_err();
        assert_eq!(
            err,
            DataUnavailable::MissingColumn {
                sheet: "Layout".to_string(),
                column: "y".to_string(),
            }
        );
    }

    #[test]
    fn scenario_blocks_read_columns_c_and_m() {
        let cells = vec![
            ((1, 0), text("Results (Loadform 2)")),
            ((3, 0), text("Total Distance (meters)")),
            ((3, 2), Data::Float(410.0)),
            ((3, 12), Data::Float(650.0)),
            ((5, 0), text("Total Time (Hours)")),
            ((5, 2), Data::Float(1.2)),
            ((5, 12), Data::Float(2.0)),
        ];
        let scenarios = parse_scenarios(&sheet(&cells), "Comparison").unwrap();
        assert_eq!(scenarios.len(), 1);
        let s = &scenarios[0];
        assert_eq!(s.name, "Loadform 2");
        assert_eq!(s.distance_optimized, 410.0);
        assert_eq!(s.distance_current, 650.0);
        assert_eq!(s.time_optimized, 1.2);
        assert_eq!(s.time_current, 2.0);
    }

    #[test]
    fn truncated_block_is_missing_metric() {
        let cells = vec![
            ((0, 0), text("Loadform 1")),
            ((2, 2), Data::Float(1.0)),
            ((2, 12), Data::Float(2.0)),
        ];
        let err = parse_scenarios(&sheet(&cells), "Comparison").unwrap_err();
        assert_eq!(
            err,
            DataUnavailable::MissingMetric {
                scenario: "Loadform 1".to_string(),
                metric: "time",
            }
        );
    }

    #[test]
    fn text_in_metric_cell_is_non_numeric() {
        let cells = vec![
            ((0, 0), text("Loadform 4")),
            ((2, 2), text("pending")),
            ((2, 12), Data::Float(2.0)),
            ((4, 2), Data::Float(1.0)),
            ((4, 12), Data::Float(2.0)),
        ];
        let err = parse_scenarios(&sheet(&cells), "Comparison").unwrap_err();
        assert!(matches!(
            err,
            DataUnavailable::NonNumeric { column: 'C', metric: "distance", .. }
        ));
    }

    #[test]
    fn sheet_without_blocks_has_no_scenarios() {
        let cells = vec![((0, 0), text("Summary"))];
        assert_eq!(
            parse_scenarios(&sheet(&cells), "Comparison").unwrap_err(),
            DataUnavailable::NoScenarios("Comparison".to_string())
        );
    }
}
