//! XLJoin - join three Excel workbooks by chained key lookups
//!
//! The first workbook drives the join. For each of its data rows, one key
//! column selects the matching row of the second workbook and another key
//! column selects the matching row of the third. The selected columns of the
//! three rows become one output row.
//!
//! # Features
//!
//! - Fields qualified by source name (`file2.name`), case-insensitive
//! - Uniform cell values (Text, Number, DateTime, Boolean); formulas use cached results
//! - Loose key equality: `42` matches `"42"`
//! - Unmatched lookups surface as errors instead of blank cells
//! - Excel import/export
//!
//! # Example
//!
//! ```no_run
//! use royalbit_xljoin::config::JoinSettings;
//! use royalbit_xljoin::core::{run, JoinSources};
//! use royalbit_xljoin::excel::{ExcelExporter, ExcelImporter};
//! use std::path::Path;
//!
//! let settings = JoinSettings::load(Path::new("xljoin.yaml"))?;
//! let driver = ExcelImporter::new(&settings.driver.path).import()?;
//! let lookup_b = ExcelImporter::new(&settings.lookup_b.source.path).import()?;
//! let lookup_c = ExcelImporter::new(&settings.lookup_c.source.path).import()?;
//!
//! let outcome = run(
//!     &settings.plan(),
//!     JoinSources { driver: &driver, lookup_b: &lookup_b, lookup_c: &lookup_c },
//! )?;
//! ExcelExporter::new(&outcome.table).export(Path::new("out.xlsx"))?;
//! # Ok::<(), royalbit_xljoin::error::JoinError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod types;

// Re-export commonly used types
pub use error::{JoinError, JoinResult};
pub use types::{CellValue, FieldKey, MaterializedRow, MergedRow, OutputSpec, OutputTable, RawCell};
