//! Keyed lookup: first row of a source whose key column matches a value

use crate::core::materialize::materialize;
use crate::core::source::TabularSource;
use crate::error::JoinResult;
use crate::types::{CellValue, FieldKey, MaterializedRow};
use tracing::trace;

/// Scan data rows in order and return the first whose `key_column` value has
/// the same string representation as `target`.
///
/// `Ok(None)` means no row matched. A row without the key column never
/// matches. Rows are compared by text, so `Number(42.0)` matches `Text("42")`.
pub fn find_by_key(
    source_name: &str,
    source: &dyn TabularSource,
    key_column: &str,
    target: &CellValue,
) -> JoinResult<Option<MaterializedRow>> {
    let Some(last_row) = source.last_row() else {
        return Ok(None);
    };
    let key = FieldKey::new(source_name, key_column);
    let wanted = target.to_string();

    for index in 1..=last_row {
        let row = materialize(source_name, source, index)?;
        let matches = row
            .get(&key)
            .is_some_and(|value| value.to_string() == wanted);
        if matches {
            trace!(source = source_name, row = index, key = %key, "key matched");
            return Ok(Some(row));
        }
    }
    Ok(None)
}
