//! Excel workbook I/O
//!
//! - Import: first (or named) worksheet of an .xlsx → [`Sheet`](crate::core::Sheet)
//! - Export: [`OutputTable`](crate::types::OutputTable) → single-sheet .xlsx

mod exporter;
mod importer;

pub use exporter::{ExcelExporter, XlsxSink};
pub use importer::ExcelImporter;
