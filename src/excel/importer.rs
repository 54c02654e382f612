//! Excel importer implementation - Excel (.xlsx) → Sheet

use crate::core::Sheet;
use crate::error::{JoinError, JoinResult};
use crate::types::RawCell;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads one worksheet of an .xlsx file into a [`Sheet`]
pub struct ExcelImporter {
    path: PathBuf,
    sheet: Option<String>,
}

impl ExcelImporter {
    /// Create an importer for the first worksheet of `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet: None,
        }
    }

    /// Read the named worksheet instead of the first one
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn import(&self) -> JoinResult<Sheet> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| {
            JoinError::Import(format!(
                "Failed to open Excel file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        let sheet_name = match &self.sheet {
            Some(name) => name.clone(),
            None => workbook.sheet_names().first().cloned().ok_or_else(|| {
                JoinError::Import(format!("'{}' has no worksheets", self.path.display()))
            })?,
        };

        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            JoinError::Import(format!(
                "Failed to read worksheet '{}' of '{}': {}",
                sheet_name,
                self.path.display(),
                e
            ))
        })?;

        // Formula text is optional; values alone are enough to join
        let formulas = workbook.worksheet_formula(&sheet_name).ok();

        let sheet = range_to_sheet(&range, formulas.as_ref());
        info!(
            path = %self.path.display(),
            sheet = %sheet_name,
            data_rows = sheet.data_row_count(),
            "worksheet loaded"
        );
        Ok(sheet)
    }
}

/// Convert a calamine range to a sheet using absolute coordinates, so that
/// spreadsheet row 1 is always the header even when column A is empty.
fn range_to_sheet(range: &Range<Data>, formulas: Option<&Range<String>>) -> Sheet {
    let mut sheet = Sheet::new();
    let Some((last_row, last_col)) = range.end() else {
        return sheet;
    };

    for row in 0..=last_row {
        let cells: Vec<RawCell> = (0..=last_col)
            .map(|col| {
                let value = range
                    .get_value((row, col))
                    .map(to_raw_cell)
                    .unwrap_or(RawCell::Blank);
                match formulas.and_then(|f| f.get_value((row, col))) {
                    Some(formula) if !formula.is_empty() => {
                        RawCell::formula(formula.clone(), value)
                    }
                    _ => value,
                }
            })
            .collect();
        sheet.push_row(cells);
    }
    debug!(rows = last_row + 1, columns = last_col + 1, "range converted");
    sheet
}

/// Map a calamine cell to a raw cell
fn to_raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Blank,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Int(i) => RawCell::number(*i as f64),
        Data::Float(f) => RawCell::number(*f),
        Data::Bool(b) => RawCell::Boolean(*b),
        Data::DateTime(dt) if dt.is_duration() => RawCell::number(dt.as_f64()),
        Data::DateTime(dt) => RawCell::Date(*dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => RawCell::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TabularSource;
    use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};
    use crate::core::coerce;
    use crate::types::CellValue;
    use chrono::NaiveDate;

    #[test]
    fn test_1904_workbook_dates_keep_their_epoch() {
        let cell = Data::DateTime(ExcelDateTime::new(
            43830.0,
            ExcelDateTimeType::DateTime,
            true,
        ));
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(coerce(&to_raw_cell(&cell)), CellValue::DateTime(expected));
    }

    #[test]
    fn test_duration_cells_stay_numbers() {
        let cell = Data::DateTime(ExcelDateTime::new(
            1.5,
            ExcelDateTimeType::TimeDelta,
            false,
        ));
        assert_eq!(to_raw_cell(&cell), RawCell::number(1.5));
    }

    #[test]
    fn test_to_raw_cell_scalars() {
        assert_eq!(to_raw_cell(&Data::Empty), RawCell::Blank);
        assert_eq!(to_raw_cell(&Data::Int(7)), RawCell::number(7.0));
        assert_eq!(to_raw_cell(&Data::Float(1.5)), RawCell::number(1.5));
        assert_eq!(to_raw_cell(&Data::Bool(true)), RawCell::Boolean(true));
        assert_eq!(
            to_raw_cell(&Data::String("x".to_string())),
            RawCell::text("x")
        );
        assert_eq!(
            to_raw_cell(&Data::DateTimeIso("2024-01-01".to_string())),
            RawCell::text("2024-01-01")
        );
    }

    #[test]
    fn test_to_raw_cell_error() {
        assert_eq!(
            to_raw_cell(&Data::Error(CellErrorType::Div0)),
            RawCell::Error("#DIV/0!".to_string())
        );
    }

    #[test]
    fn test_range_to_sheet_wraps_formulas() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("a".to_string()));
        range.set_value((0, 1), Data::String("b".to_string()));
        range.set_value((1, 0), Data::Float(2.0));
        range.set_value((1, 1), Data::Bool(true));

        let mut formulas: Range<String> = Range::new((1, 1), (1, 1));
        formulas.set_value((1, 1), "A2>1".to_string());

        let sheet = range_to_sheet(&range, Some(&formulas));
        assert_eq!(sheet.last_row(), Some(1));
        let row = sheet.row(1).unwrap();
        assert_eq!(row[0], RawCell::number(2.0));
        assert_eq!(row[1], RawCell::formula("A2>1", RawCell::Boolean(true)));
    }

    #[test]
    fn test_range_to_sheet_offset_range_keeps_absolute_rows() {
        // Data starting at B2: row 0 and column A are absent
        let mut range: Range<Data> = Range::new((1, 1), (2, 1));
        range.set_value((1, 1), Data::String("id".to_string()));
        range.set_value((2, 1), Data::Int(5));

        let sheet = range_to_sheet(&range, None);
        assert!(sheet.row(0).is_none());
        assert_eq!(
            sheet.row(1).unwrap(),
            &[RawCell::Blank, RawCell::text("id")][..]
        );
    }

    #[test]
    fn test_import_missing_file_is_import_error() {
        let err = ExcelImporter::new("does/not/exist.xlsx").import().unwrap_err();
        assert!(matches!(err, JoinError::Import(_)));
    }
}
