//! Tabular sources: rows of raw cells with a header row at index 0

use crate::types::RawCell;

/// Read-only rows of typed cells. Row 0 is the header row.
///
/// Implementations must be safe to scan repeatedly; the join rescans the
/// lookup sources once per driver row.
pub trait TabularSource {
    /// Index of the last row, or `None` when the source has no rows at all
    fn last_row(&self) -> Option<usize>;

    /// Cells of a row up to its last populated cell, or `None` if the row does not exist
    fn row(&self, index: usize) -> Option<&[RawCell]>;
}

/// In-memory sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Option<Vec<RawCell>>>,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a header and data rows, all present
    pub fn from_rows(header: Vec<RawCell>, data: Vec<Vec<RawCell>>) -> Self {
        let mut sheet = Self::new();
        sheet.push_row(header);
        for row in data {
            sheet.push_row(row);
        }
        sheet
    }

    /// Append a row. Trailing blanks are dropped; a row with no populated
    /// cell becomes an absent row.
    pub fn push_row(&mut self, mut cells: Vec<RawCell>) {
        while matches!(cells.last(), Some(RawCell::Blank)) {
            cells.pop();
        }
        if cells.is_empty() {
            self.rows.push(None);
        } else {
            self.rows.push(Some(cells));
        }
    }

    /// Append an absent row (a gap in the sheet)
    pub fn push_missing_row(&mut self) {
        self.rows.push(None);
    }

    /// Number of data rows (excluding the header)
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

impl TabularSource for Sheet {
    fn last_row(&self) -> Option<usize> {
        self.rows.len().checked_sub(1)
    }

    fn row(&self, index: usize) -> Option<&[RawCell]> {
        self.rows.get(index)?.as_deref()
    }
}
