use calamine::{ExcelDateTime, ExcelDateTimeType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

//==============================================================================
// Raw cells (what a tabular source hands us)
//==============================================================================

/// A cell as stored in a spreadsheet, before coercion
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// Cell inside the row's extent with no content
    Blank,
    Text(String),
    /// Numeric cell with a general/number format
    Number(f64),
    /// Numeric cell whose number format denotes a date/time. The serial keeps
    /// the workbook's date system (1900 or 1904).
    Date(ExcelDateTime),
    Boolean(bool),
    /// Error cell (e.g. `#DIV/0!`)
    Error(String),
    /// Formula cell with its last computed result
    Formula { formula: String, cached: Box<RawCell> },
}

impl RawCell {
    pub fn text(value: impl Into<String>) -> Self {
        RawCell::Text(value.into())
    }

    pub fn number(value: f64) -> Self {
        RawCell::Number(value)
    }

    /// Date-formatted serial in the 1900 date system
    pub fn date_serial(value: f64) -> Self {
        RawCell::Date(ExcelDateTime::new(value, ExcelDateTimeType::DateTime, false))
    }

    /// Date-formatted serial in the 1904 date system
    pub fn date_serial_1904(value: f64) -> Self {
        RawCell::Date(ExcelDateTime::new(value, ExcelDateTimeType::DateTime, true))
    }

    pub fn formula(formula: impl Into<String>, cached: RawCell) -> Self {
        RawCell::Formula {
            formula: formula.into(),
            cached: Box::new(cached),
        }
    }
}

//==============================================================================
// Cell values (uniform value model)
//==============================================================================

/// A coerced cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    Boolean(bool),
    Error(String),
}

/// String representation used for key comparison and for text output.
///
/// Whole numbers print without a fractional part, so `Number(42.0)` and
/// `Text("42")` render identically. Negative zero prints as `0`.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) | CellValue::Error(s) => f.write_str(s),
            CellValue::Number(n) if *n == 0.0 => f.write_str("0"),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

//==============================================================================
// Qualified field keys
//==============================================================================

/// A column of a named source, e.g. `file2.name`.
///
/// Both parts are trimmed and lower-cased on construction, so lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    source: String,
    column: String,
}

impl FieldKey {
    pub fn new(source: &str, column: &str) -> Self {
        Self {
            source: normalize(source),
            column: normalize(column),
        }
    }

    /// Parse `source.column`, or a bare `column` qualified with `default_source`.
    /// Only the first dot separates the source, so labels may contain dots.
    pub fn parse(text: &str, default_source: &str) -> Self {
        match text.trim().split_once('.') {
            Some((source, column)) => Self::new(source, column),
            None => Self::new(default_source, text),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.source, self.column)
    }
}

pub(crate) fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

//==============================================================================
// Rows
//==============================================================================

/// One source row keyed by qualified field key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterializedRow {
    fields: HashMap<FieldKey, CellValue>,
}

impl MaterializedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FieldKey, value: CellValue) {
        self.fields.insert(key, value);
    }

    pub fn get(&self, key: &FieldKey) -> Option<&CellValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Driver row plus whatever the two lookups found, for one driver row index.
///
/// Built once per driver row and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    driver_row: usize,
    fields: HashMap<FieldKey, CellValue>,
    unmatched: Vec<String>,
}

impl MergedRow {
    /// Merge the driver row with the lookup results. Each lookup is given as
    /// `(source name, match)`; a `None` match contributes no fields and is
    /// remembered as unmatched.
    pub fn merge(
        driver_row: usize,
        driver: MaterializedRow,
        lookups: Vec<(&str, Option<MaterializedRow>)>,
    ) -> Self {
        let mut fields = driver.fields;
        let mut unmatched = Vec::new();
        for (source, found) in lookups {
            match found {
                Some(row) => fields.extend(row.fields),
                None => unmatched.push(normalize(source)),
            }
        }
        Self {
            driver_row,
            fields,
            unmatched,
        }
    }

    pub fn driver_row(&self) -> usize {
        self.driver_row
    }

    pub fn get(&self, key: &FieldKey) -> Option<&CellValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of lookup sources that had no matching row
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }
}

//==============================================================================
// Output
//==============================================================================

/// One selected output column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    pub key: FieldKey,
}

impl OutputColumn {
    /// Header text: the bare column label, or the qualified key
    pub fn header(&self, include_source_name: bool) -> String {
        if include_source_name {
            self.key.to_string()
        } else {
            self.key.column().to_string()
        }
    }
}

/// Ordered output column selection, fixed for a whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    columns: Vec<OutputColumn>,
}

impl OutputSpec {
    /// Build from `source.label` / `label` strings. Bare labels belong to `driver_source`.
    pub fn parse<S: AsRef<str>>(columns: &[S], driver_source: &str) -> Self {
        let columns = columns
            .iter()
            .map(|c| c.as_ref().trim())
            .filter(|c| !c.is_empty())
            .map(|c| OutputColumn {
                key: FieldKey::parse(c, driver_source),
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A value ready for a sink. Error values have already become text.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell {
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    Boolean(bool),
}

impl From<&CellValue> for OutputCell {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Text(s) | CellValue::Error(s) => OutputCell::Text(s.clone()),
            CellValue::Number(n) => OutputCell::Number(*n),
            CellValue::DateTime(dt) => OutputCell::DateTime(*dt),
            CellValue::Boolean(b) => OutputCell::Boolean(*b),
        }
    }
}

/// One projected output row
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    /// Driver data row this row was built from
    pub driver_row: usize,
    pub cells: Vec<OutputCell>,
}

/// Header plus data rows, in driver row order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputTable {
    pub header: Vec<String>,
    pub rows: Vec<OutputRow>,
}

impl OutputTable {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: OutputRow) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

//==============================================================================
// Policies
//==============================================================================

/// What to do when an output column cannot be resolved for a driver row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Stop the run; nothing is written
    #[default]
    Abort,
    /// Leave the driver row out of the output and log a warning
    SkipRow,
}
