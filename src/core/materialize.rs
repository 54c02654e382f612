//! Row materializer: one source row → [`MaterializedRow`]

use crate::core::coerce::coerce;
use crate::core::source::TabularSource;
use crate::error::{JoinError, JoinResult};
use crate::types::{FieldKey, MaterializedRow};

/// Header labels of a source, trimmed and lower-cased
pub fn header_labels(source_name: &str, source: &dyn TabularSource) -> JoinResult<Vec<String>> {
    let header = source.row(0).ok_or_else(|| JoinError::MalformedRow {
        source_name: source_name.to_string(),
        row: 0,
        reason: "header row is missing".to_string(),
    })?;
    Ok(header
        .iter()
        .map(|cell| coerce(cell).to_string().trim().to_lowercase())
        .collect())
}

/// Materialize row `row_index` of `source`, keying every populated cell by
/// `source_name.header_label`.
///
/// The row's own extent decides which columns appear; a short row yields a
/// partial mapping. A missing row, or a cell beyond the header's extent, is
/// a [`JoinError::MalformedRow`].
pub fn materialize(
    source_name: &str,
    source: &dyn TabularSource,
    row_index: usize,
) -> JoinResult<MaterializedRow> {
    let headers = header_labels(source_name, source)?;
    let cells = source.row(row_index).ok_or_else(|| JoinError::MalformedRow {
        source_name: source_name.to_string(),
        row: row_index,
        reason: "row has no data".to_string(),
    })?;

    if cells.len() > headers.len() {
        return Err(JoinError::MalformedRow {
            source_name: source_name.to_string(),
            row: row_index,
            reason: format!(
                "{} cells but only {} header columns",
                cells.len(),
                headers.len()
            ),
        });
    }

    let mut row = MaterializedRow::new();
    for (label, cell) in headers.iter().zip(cells) {
        row.insert(FieldKey::new(source_name, label), coerce(cell));
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::Sheet;
    use crate::types::{CellValue, RawCell};

    fn people() -> Sheet {
        Sheet::from_rows(
            vec![
                RawCell::text(" ID "),
                RawCell::text("Name"),
                RawCell::text("Active"),
            ],
            vec![
                vec![
                    RawCell::number(1.0),
                    RawCell::text("Alice"),
                    RawCell::Boolean(true),
                ],
                vec![RawCell::number(2.0)],
            ],
        )
    }

    #[test]
    fn test_materialize_full_row() {
        let row = materialize("File1", &people(), 1).unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(
            row.get(&FieldKey::new("file1", "id")),
            Some(&CellValue::Number(1.0))
        );
        assert_eq!(
            row.get(&FieldKey::new("file1", "name")),
            Some(&CellValue::Text("Alice".to_string()))
        );
        assert_eq!(
            row.get(&FieldKey::new("file1", "active")),
            Some(&CellValue::Boolean(true))
        );
    }

    #[test]
    fn test_short_row_yields_partial_mapping() {
        let row = materialize("file1", &people(), 2).unwrap();
        assert_eq!(row.len(), 1);
        assert!(row.get(&FieldKey::new("file1", "name")).is_none());
    }

    #[test]
    fn test_row_past_end_is_malformed() {
        let err = materialize("file1", &people(), 3).unwrap_err();
        assert!(matches!(err, JoinError::MalformedRow { row: 3, .. }));
    }

    #[test]
    fn test_row_wider_than_header_is_malformed() {
        let sheet = Sheet::from_rows(
            vec![RawCell::text("id")],
            vec![vec![RawCell::number(1.0), RawCell::text("extra")]],
        );
        let err = materialize("file1", &sheet, 1).unwrap_err();
        assert!(matches!(err, JoinError::MalformedRow { row: 1, .. }));
    }

    #[test]
    fn test_numeric_header_label() {
        let sheet = Sheet::from_rows(
            vec![RawCell::number(2024.0)],
            vec![vec![RawCell::text("x")]],
        );
        let row = materialize("file1", &sheet, 1).unwrap();
        assert!(row.get(&FieldKey::new("file1", "2024")).is_some());
    }
}
