use thiserror::Error;

pub type JoinResult<T> = Result<T, JoinError>;

#[derive(Error, Debug)]
pub enum JoinError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Malformed row {row} in source '{source_name}': {reason}")]
    MalformedRow {
        source_name: String,
        row: usize,
        reason: String,
    },

    #[error("Missing key field: row {row} of source '{source_name}' has no '{column}' column")]
    MissingKeyField {
        source_name: String,
        row: usize,
        column: String,
    },

    #[error("Unresolved output field '{field}' for driver row {row}{}", unmatched_hint(.unmatched))]
    UnresolvedOutputField {
        row: usize,
        field: String,
        unmatched: Vec<String>,
    },
}

fn unmatched_hint(unmatched: &[String]) -> String {
    if unmatched.is_empty() {
        String::new()
    } else {
        format!(" (no matching row in: {})", unmatched.join(", "))
    }
}
