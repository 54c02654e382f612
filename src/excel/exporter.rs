//! Excel exporter implementation

use crate::core::row_writer::{write_table, TabularSink};
use crate::error::{JoinError, JoinResult};
use crate::types::OutputTable;
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

/// Name of the single output worksheet
pub const OUTPUT_SHEET_NAME: &str = "Data";

/// Number format applied to datetime cells
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// [`TabularSink`] backed by a rust_xlsxwriter worksheet.
/// Nothing touches the disk until [`XlsxSink::save`].
pub struct XlsxSink {
    worksheet: Worksheet,
    datetime_format: Format,
}

impl XlsxSink {
    pub fn new() -> JoinResult<Self> {
        let mut worksheet = Worksheet::new();
        worksheet
            .set_name(OUTPUT_SHEET_NAME)
            .map_err(|e| JoinError::Export(format!("Failed to set worksheet name: {}", e)))?;
        Ok(Self {
            worksheet,
            datetime_format: Format::new().set_num_format(DATETIME_FORMAT),
        })
    }

    /// Save the worksheet as a one-sheet workbook
    pub fn save(self, path: &Path) -> JoinResult<()> {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.worksheet);
        workbook
            .save(path)
            .map_err(|e| JoinError::Export(format!("Failed to save Excel file: {}", e)))?;
        Ok(())
    }
}

impl TabularSink for XlsxSink {
    fn write_text(&mut self, row: u32, col: u16, value: &str) -> JoinResult<()> {
        self.worksheet
            .write_string(row, col, value)
            .map_err(|e| JoinError::Export(format!("Failed to write text: {}", e)))?;
        Ok(())
    }

    fn write_number(&mut self, row: u32, col: u16, value: f64) -> JoinResult<()> {
        self.worksheet
            .write_number(row, col, value)
            .map_err(|e| JoinError::Export(format!("Failed to write number: {}", e)))?;
        Ok(())
    }

    fn write_boolean(&mut self, row: u32, col: u16, value: bool) -> JoinResult<()> {
        self.worksheet
            .write_boolean(row, col, value)
            .map_err(|e| JoinError::Export(format!("Failed to write boolean: {}", e)))?;
        Ok(())
    }

    fn write_datetime(&mut self, row: u32, col: u16, value: &NaiveDateTime) -> JoinResult<()> {
        self.worksheet
            .write_datetime_with_format(row, col, value, &self.datetime_format)
            .map_err(|e| JoinError::Export(format!("Failed to write datetime: {}", e)))?;
        Ok(())
    }
}

/// Writes a finished [`OutputTable`] to an .xlsx file
pub struct ExcelExporter<'a> {
    table: &'a OutputTable,
}

impl<'a> ExcelExporter<'a> {
    pub fn new(table: &'a OutputTable) -> Self {
        Self { table }
    }

    pub fn export(&self, output_path: &Path) -> JoinResult<()> {
        let mut sink = XlsxSink::new()?;
        write_table(&mut sink, self.table)?;
        sink.save(output_path)?;
        info!(
            path = %output_path.display(),
            rows = self.table.row_count(),
            "output written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OutputCell, OutputRow};
    use tempfile::TempDir;

    #[test]
    fn test_export_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.xlsx");

        let mut table = OutputTable::new(vec!["id".to_string()]);
        table.push(OutputRow {
            driver_row: 1,
            cells: vec![OutputCell::Number(1.0)],
        });

        ExcelExporter::new(&table).export(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_export_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope").join("out.xlsx");
        let table = OutputTable::new(vec!["id".to_string()]);

        let err = ExcelExporter::new(&table).export(&path).unwrap_err();
        assert!(matches!(err, JoinError::Export(_)));
    }
}
