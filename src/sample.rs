use crate::error::DashboardError;
use crate::loader::{LAYOUT_SKIP_ROWS, SheetNames};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;

/// Racks per aisle in the sample layout
const RACKS_PER_AISLE: u32 = 5;
const AISLES: u32 = 6;

/// Per-order figures for the sample scenarios:
/// (optimized distance, current distance, optimized hours, current hours)
pub const SAMPLE_RESULTS: [(f64, f64, f64, f64); 5] = [
    (533.1, 812.4, 1.48, 2.21),
    (598.7, 905.0, 1.62, 2.37),
    (470.2, 760.2, 1.31, 2.02),
    (655.9, 990.5, 1.77, 2.61),
    (702.6, 1120.8, 1.86, 2.94),
];

/// Rows between two scenario blocks in the comparison sheet
const BLOCK_HEIGHT: u32 = 7;

/// Write a demo workbook in the layout the loader expects
///
/// The layout sheet holds a start point plus 30 racks in six aisles, the
/// comparison sheet one block per entry of [`SAMPLE_RESULTS`].
///
/// # Examples
/// ```no_run
/// use warehouse_dashboard::loader::SheetNames;
/// use warehouse_dashboard::sample::write_sample_workbook;
///
/// write_sample_workbook("demo.xlsx", &SheetNames::default()).unwrap();
/// ```
pub fn write_sample_workbook(
    path: impl AsRef<Path>,
    sheets: &SheetNames,
) -> Result<(), DashboardError> {
    let mut workbook = Workbook::new();

    let mut layout = Worksheet::new();
    layout.set_name(&sheets.layout)?;
    write_layout(&mut layout)?;
    workbook.push_worksheet(layout);

    let mut comparison = Worksheet::new();
    comparison.set_name(&sheets.comparison)?;
    write_comparison(&mut comparison)?;
    workbook.push_worksheet(comparison);

    workbook.save(path.as_ref())?;
    Ok(())
}

/// Number of data rows [`write_sample_workbook`] puts in the layout sheet
pub fn sample_location_count() -> usize {
    (RACKS_PER_AISLE * AISLES + 1) as usize
}

/// Coordinates of rack `n` (1-based), aisle by aisle. Rack 0 sits where
/// rack 1 does.
fn rack_position(n: u32) -> (f64, f64) {
    let index = n.saturating_sub(1);
    let aisle = index / RACKS_PER_AISLE;
    let slot = index % RACKS_PER_AISLE;
    (4.0 + 6.0 * aisle as f64, 4.0 + 5.0 * slot as f64)
}

fn write_layout(sheet: &mut Worksheet) -> Result<(), DashboardError> {
    sheet.write_string(0, 0, "Warehouse Layout - Model Testing")?;
    sheet.write_string(2, 0, "Coordinates in meters from the depot")?;

    let header = LAYOUT_SKIP_ROWS;
    sheet.write_string(header, 0, "Location")?;
    sheet.write_string(header, 1, "x")?;
    sheet.write_string(header, 2, "y")?;
    sheet.write_string(header, 3, "Demand")?;

    sheet.write_string(header + 1, 0, "Start")?;
    sheet.write_number(header + 1, 1, 0.0)?;
    sheet.write_number(header + 1, 2, 0.0)?;

    for n in 1..=RACKS_PER_AISLE * AISLES {
        let row = header + 1 + n;
        let (x, y) = rack_position(n);
        sheet.write_string(row, 0, format!("Rack {}", n))?;
        sheet.write_number(row, 1, x)?;
        sheet.write_number(row, 2, y)?;
        sheet.write_number(row, 3, (n % 4 + 1) as f64)?;
    }
    Ok(())
}

fn write_comparison(sheet: &mut Worksheet) -> Result<(), DashboardError> {
    sheet.write_string(0, 0, "Data Analysis - Optimized Model vs. Current Practice")?;

    for (i, (d_opt, d_cur, t_opt, t_cur)) in SAMPLE_RESULTS.iter().enumerate() {
        let top = 2 + BLOCK_HEIGHT * i as u32;
        sheet.write_string(top, 0, format!("Results (Loadform {})", i + 1))?;
        sheet.write_string(top + 1, 2, "Optimized Model")?;
        sheet.write_string(top + 1, 12, "Current Practice")?;
        sheet.write_string(top + 2, 0, "Total Distance (meters)")?;
        sheet.write_number(top + 2, 2, *d_opt)?;
        sheet.write_number(top + 2, 12, *d_cur)?;
        sheet.write_string(top + 3, 0, "Number of Vehicles")?;
        sheet.write_number(top + 3, 2, 4.0)?;
        sheet.write_number(top + 3, 12, 1.0)?;
        sheet.write_string(top + 4, 0, "Total Time (Hours)")?;
        sheet.write_number(top + 4, 2, *t_opt)?;
        sheet.write_number(top + 4, 12, *t_cur)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn racks_fill_aisles_in_order() {
        assert_eq!(rack_position(1), (4.0, 4.0));
        assert_eq!(rack_position(5), (4.0, 24.0));
        assert_eq!(rack_position(6), (10.0, 4.0));
        assert_eq!(rack_position(30), (34.0, 24.0));
        assert_eq!(sample_location_count(), 31);
    }

    #[test]
    fn rack_zero_does_not_underflow() {
        assert_eq!(rack_position(0), rack_position(1));
    }
}
