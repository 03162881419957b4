use std::path::Path;

use calamine::DataType;
use chrono::{Duration, NaiveDate};
use exit_destination::Cell;
use log::warn;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Excel counts the days from 1899-12-30 (this absorbs the 1900 leap year bug for
/// all the dates after February 1900).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Numbers are written the way they appear in the exports: integral values without
/// a decimal part (identifiers are often stored as numbers).
pub fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Converts a cell of a worksheet to the text of the record tables.
pub fn cell_to_text(cell: &DataType) -> Cell {
    match cell {
        DataType::String(s) if s.trim().is_empty() => None,
        DataType::String(s) => Some(s.clone()),
        DataType::Float(f) => Some(format_number(*f)),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Bool(b) => Some(b.to_string()),
        DataType::DateTime(f) => excel_serial_to_date(*f).map(|d| d.format("%m/%d/%Y").to_string()),
        DataType::Error(e) => {
            warn!("cell_to_text: error cell {:?} read as missing", e);
            None
        }
        DataType::Empty => None,
    }
}

/// Converts a CSV field. Blank fields are missing values.
pub fn field_to_text(field: &str) -> Cell {
    if field.trim().is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_dates() {
        assert_eq!(format_number(12345.0), "12345");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(
            excel_serial_to_date(44197.0),
            NaiveDate::from_ymd_opt(2021, 1, 1)
        );
        assert_eq!(
            cell_to_text(&DataType::DateTime(44197.75)),
            Some("01/01/2021".to_string())
        );
        assert_eq!(cell_to_text(&DataType::Float(7.0)), Some("7".to_string()));
        assert_eq!(cell_to_text(&DataType::String("  ".to_string())), None);
        assert_eq!(cell_to_text(&DataType::Empty), None);
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/tmp/exports/q1.xlsx"), "q1.xlsx");
        assert_eq!(field_to_text(""), None);
        assert_eq!(field_to_text("H1"), Some("H1".to_string()));
    }
}
