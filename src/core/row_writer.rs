//! Row writer: projects merged rows through the output spec and writes
//! output tables to a sink

use crate::error::{JoinError, JoinResult};
use crate::types::{MergedRow, OutputCell, OutputRow, OutputSpec, OutputTable};
use chrono::NaiveDateTime;

/// Destination for output cells, addressed by zero-based row and column
pub trait TabularSink {
    fn write_text(&mut self, row: u32, col: u16, value: &str) -> JoinResult<()>;
    fn write_number(&mut self, row: u32, col: u16, value: f64) -> JoinResult<()>;
    fn write_boolean(&mut self, row: u32, col: u16, value: bool) -> JoinResult<()>;
    fn write_datetime(&mut self, row: u32, col: u16, value: &NaiveDateTime) -> JoinResult<()>;
}

/// Select the spec's columns from a merged row, in spec order.
///
/// Any column missing from the row is a [`JoinError::UnresolvedOutputField`];
/// nothing is substituted for it.
pub fn project(merged: &MergedRow, spec: &OutputSpec) -> JoinResult<OutputRow> {
    let cells = spec
        .columns()
        .iter()
        .map(|column| {
            merged
                .get(&column.key)
                .map(OutputCell::from)
                .ok_or_else(|| JoinError::UnresolvedOutputField {
                    row: merged.driver_row(),
                    field: column.key.to_string(),
                    unmatched: merged.unmatched().to_vec(),
                })
        })
        .collect::<JoinResult<Vec<_>>>()?;

    Ok(OutputRow {
        driver_row: merged.driver_row(),
        cells,
    })
}

/// Header labels for the spec: bare column labels, or `source.label` when
/// `include_source_name` is set
pub fn header_row(spec: &OutputSpec, include_source_name: bool) -> Vec<String> {
    spec.columns()
        .iter()
        .map(|column| column.header(include_source_name))
        .collect()
}

/// Write one cell, dispatching on its kind
pub fn write_cell(
    sink: &mut dyn TabularSink,
    row: u32,
    col: u16,
    cell: &OutputCell,
) -> JoinResult<()> {
    match cell {
        OutputCell::DateTime(dt) => sink.write_datetime(row, col, dt),
        OutputCell::Boolean(b) => sink.write_boolean(row, col, *b),
        OutputCell::Number(n) => sink.write_number(row, col, *n),
        OutputCell::Text(s) => sink.write_text(row, col, s),
    }
}

/// Write the header at row 0 and data rows from row 1, in table order
pub fn write_table(sink: &mut dyn TabularSink, table: &OutputTable) -> JoinResult<()> {
    for (col, label) in table.header.iter().enumerate() {
        sink.write_text(0, column_index(col)?, label)?;
    }
    for (index, row) in table.rows.iter().enumerate() {
        let sink_row = u32::try_from(index + 1)
            .map_err(|_| JoinError::Export(format!("Too many output rows: {}", index + 1)))?;
        for (col, cell) in row.cells.iter().enumerate() {
            write_cell(sink, sink_row, column_index(col)?, cell)?;
        }
    }
    Ok(())
}

fn column_index(col: usize) -> JoinResult<u16> {
    u16::try_from(col).map_err(|_| JoinError::Export(format!("Too many output columns: {}", col + 1)))
}
