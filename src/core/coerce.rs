//! Cell value coercion: raw spreadsheet cells → [`CellValue`]

use crate::types::{CellValue, RawCell};
use calamine::ExcelDateTime;
use chrono::NaiveDateTime;

/// Largest serial Excel can display (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

/// Coerce a raw cell into the uniform value model.
///
/// Formula cells use their cached result. A date-formatted number whose
/// serial cannot be represented as a date stays a plain number.
pub fn coerce(cell: &RawCell) -> CellValue {
    match cell {
        RawCell::Formula { cached, .. } => coerce(cached),
        RawCell::Blank => CellValue::Text(String::new()),
        RawCell::Text(s) => CellValue::Text(s.clone()),
        RawCell::Number(n) => CellValue::Number(*n),
        RawCell::Date(dt) => match to_datetime(dt) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        RawCell::Boolean(b) => CellValue::Boolean(*b),
        RawCell::Error(description) => CellValue::Text(description.clone()),
    }
}

/// Convert an Excel serial to a datetime, honoring the workbook's date system.
fn to_datetime(dt: &ExcelDateTime) -> Option<NaiveDateTime> {
    let serial = dt.as_f64();
    if !serial.is_finite() || !(0.0..MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    dt.as_datetime()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_blank_is_empty_text() {
        assert_eq!(coerce(&RawCell::Blank), CellValue::Text(String::new()));
    }

    #[test]
    fn test_text_and_boolean() {
        assert_eq!(
            coerce(&RawCell::text("Alice")),
            CellValue::Text("Alice".to_string())
        );
        assert_eq!(coerce(&RawCell::Boolean(false)), CellValue::Boolean(false));
    }

    #[test]
    fn test_plain_number_stays_number() {
        assert_eq!(coerce(&RawCell::number(45292.0)), CellValue::Number(45292.0));
    }

    #[test]
    fn test_date_formatted_number_becomes_datetime() {
        assert_eq!(
            coerce(&RawCell::date_serial(45292.5)),
            CellValue::DateTime(datetime(2024, 1, 1, 12, 0))
        );
    }

    #[test]
    fn test_unrepresentable_date_serial_falls_back_to_number() {
        assert_eq!(coerce(&RawCell::date_serial(-1.0)), CellValue::Number(-1.0));
    }

    #[test]
    fn test_error_becomes_text() {
        assert_eq!(
            coerce(&RawCell::Error("#N/A".to_string())),
            CellValue::Text("#N/A".to_string())
        );
    }

    #[test]
    fn test_formula_uses_cached_result() {
        let cell = RawCell::formula("A2>1", RawCell::Boolean(true));
        assert_eq!(coerce(&cell), CellValue::Boolean(true));

        let cell = RawCell::formula("TODAY()", RawCell::date_serial(45292.0));
        assert_eq!(coerce(&cell), CellValue::DateTime(datetime(2024, 1, 1, 0, 0)));
    }

    #[test]
    fn test_excel_serial_epoch() {
        assert_eq!(
            coerce(&RawCell::date_serial(1.0)),
            CellValue::DateTime(datetime(1900, 1, 1, 0, 0))
        );
        assert_eq!(
            coerce(&RawCell::date_serial(61.0)),
            CellValue::DateTime(datetime(1900, 3, 1, 0, 0))
        );
        assert!(matches!(
            coerce(&RawCell::date_serial(f64::NAN)),
            CellValue::Number(n) if n.is_nan()
        ));
    }

    #[test]
    fn test_1904_date_system_serial() {
        assert_eq!(
            coerce(&RawCell::date_serial_1904(43830.0)),
            CellValue::DateTime(datetime(2024, 1, 1, 0, 0))
        );
        assert_eq!(
            coerce(&RawCell::date_serial_1904(0.0)),
            CellValue::DateTime(datetime(1904, 1, 1, 0, 0))
        );
    }
}
