//! Join settings (YAML)
//!
//! ```yaml
//! driver:   { name: file1, path: a.xlsx }
//! lookup_b: { name: file2, path: b.xlsx, key: bkey }
//! lookup_c: { name: file3, path: c.xlsx, key: ckey }
//! output:
//!   dir: out
//!   columns: [file1.id, file2.name, file3.amount]
//! ```

use crate::core::{JoinPlan, LookupSpec};
use crate::error::{JoinError, JoinResult};
use crate::types::{normalize, OutputSpec, UnresolvedPolicy};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings file used when the requested one does not exist
pub const FALLBACK_CONFIG_PATH: &str = "config/xljoin.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Qualifier for this source's fields, e.g. `file1`
    #[serde(default)]
    pub name: String,
    pub path: PathBuf,
    /// Worksheet to read; the first one when absent
    #[serde(default)]
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupSettings {
    #[serde(flatten)]
    pub source: SourceSettings,
    /// Driver column whose value selects the row in this source
    pub key: String,
}

/// Output columns as a YAML list or one comma-separated string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnList {
    List(Vec<String>),
    Csv(String),
}

impl ColumnList {
    pub fn to_vec(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            ColumnList::List(items) => items.iter().map(String::as_str).collect(),
            ColumnList::Csv(text) => text.split(',').collect(),
        };
        raw.into_iter()
            .map(normalize)
            .filter(|c| !c.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    pub columns: ColumnList,
    #[serde(default)]
    pub include_source_names: bool,
    #[serde(default)]
    pub on_unresolved: UnresolvedPolicy,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSettings {
    pub driver: SourceSettings,
    pub lookup_b: LookupSettings,
    pub lookup_c: LookupSettings,
    pub output: OutputSettings,
}

impl JoinSettings {
    /// Parse and validate settings from YAML text. Relative paths are kept as written.
    pub fn from_yaml(content: &str) -> JoinResult<Self> {
        let mut settings: JoinSettings = serde_yaml::from_str(content)?;
        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    /// Load a settings file; relative source and output paths resolve against its directory
    pub fn load(path: &Path) -> JoinResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut settings = Self::from_yaml(&content)?;
        if let Some(base) = path.parent() {
            settings.resolve_paths(base);
        }
        info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Load `path`, or `fallback` when `path` does not exist.
    /// Returns the settings and the file they came from.
    pub fn load_with_fallback(path: &Path, fallback: &Path) -> JoinResult<(Self, PathBuf)> {
        if path.exists() {
            return Ok((Self::load(path)?, path.to_path_buf()));
        }
        warn!(
            requested = %path.display(),
            fallback = %fallback.display(),
            "settings file not found, using fallback"
        );
        if !fallback.exists() {
            return Err(JoinError::Config(format!(
                "Settings file '{}' not found (fallback '{}' not found either)",
                path.display(),
                fallback.display()
            )));
        }
        Ok((Self::load(fallback)?, fallback.to_path_buf()))
    }

    /// The join plan these settings describe
    pub fn plan(&self) -> JoinPlan {
        let columns = self.output.columns.to_vec();
        JoinPlan::new(
            &self.driver.name,
            LookupSpec::new(&self.lookup_b.source.name, &self.lookup_b.key),
            LookupSpec::new(&self.lookup_c.source.name, &self.lookup_c.key),
            OutputSpec::parse(&columns, &self.driver.name),
        )
        .with_source_names_in_header(self.output.include_source_names)
        .with_unresolved_policy(self.output.on_unresolved)
    }

    fn normalize(&mut self) {
        for (source, default_name) in [
            (&mut self.driver, "file1"),
            (&mut self.lookup_b.source, "file2"),
            (&mut self.lookup_c.source, "file3"),
        ] {
            source.name = normalize(&source.name);
            if source.name.is_empty() {
                source.name = default_name.to_string();
            }
        }
        self.lookup_b.key = normalize(&self.lookup_b.key);
        self.lookup_c.key = normalize(&self.lookup_c.key);
    }

    fn validate(&self) -> JoinResult<()> {
        let sources = [&self.driver, &self.lookup_b.source, &self.lookup_c.source];
        for source in sources {
            if source.path.as_os_str().is_empty() {
                return Err(JoinError::Config(format!(
                    "Source '{}' has an empty path",
                    source.name
                )));
            }
            if source.name.contains('.') {
                return Err(JoinError::Config(format!(
                    "Source name '{}' must not contain '.'",
                    source.name
                )));
            }
        }
        if sources[0].name == sources[1].name
            || sources[0].name == sources[2].name
            || sources[1].name == sources[2].name
        {
            return Err(JoinError::Config(
                "Source names must be distinct".to_string(),
            ));
        }
        for (lookup, label) in [(&self.lookup_b, "lookup_b"), (&self.lookup_c, "lookup_c")] {
            if lookup.key.is_empty() {
                return Err(JoinError::Config(format!("{}.key must not be empty", label)));
            }
        }
        if self.output.columns.to_vec().is_empty() {
            return Err(JoinError::Config(
                "output.columns must name at least one column".to_string(),
            ));
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.driver.path);
        resolve(&mut self.lookup_b.source.path);
        resolve(&mut self.lookup_c.source.path);
        resolve(&mut self.output.dir);
    }
}

/// `Out_<YYYYMMDDHHMMSS>.xlsx`
pub fn output_file_name(now: NaiveDateTime) -> String {
    format!("Out_{}.xlsx", now.format("%Y%m%d%H%M%S"))
}

/// Output file path under `dir` for the current local time
pub fn output_path(dir: &Path) -> PathBuf {
    dir.join(output_file_name(chrono::Local::now().naive_local()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const BASIC: &str = r#"
driver:
  path: a.xlsx
lookup_b:
  path: b.xlsx
  key: " BKey "
lookup_c:
  name: Costs
  path: c.xlsx
  sheet: Q1
  key: ckey
output:
  columns: "file1.ID, file2.name , costs.amount"
"#;

    #[test]
    fn test_defaults_and_normalization() {
        let settings = JoinSettings::from_yaml(BASIC).unwrap();
        assert_eq!(settings.driver.name, "file1");
        assert_eq!(settings.lookup_b.source.name, "file2");
        assert_eq!(settings.lookup_c.source.name, "costs");
        assert_eq!(settings.lookup_c.source.sheet.as_deref(), Some("Q1"));
        assert_eq!(settings.lookup_b.key, "bkey");
        assert_eq!(settings.output.dir, PathBuf::from("."));
        assert!(!settings.output.include_source_names);
        assert_eq!(settings.output.on_unresolved, UnresolvedPolicy::Abort);
        assert_eq!(
            settings.output.columns.to_vec(),
            vec!["file1.id", "file2.name", "costs.amount"]
        );
    }

    #[test]
    fn test_columns_as_list_and_policy() {
        let yaml = r#"
driver: { path: a.xlsx }
lookup_b: { path: b.xlsx, key: bkey }
lookup_c: { path: c.xlsx, key: ckey }
output:
  columns: [file1.id, file3.amount]
  include_source_names: true
  on_unresolved: skip_row
"#;
        let settings = JoinSettings::from_yaml(yaml).unwrap();
        let plan = settings.plan();
        assert_eq!(plan.output.len(), 2);
        assert!(plan.include_source_names);
        assert_eq!(plan.on_unresolved, UnresolvedPolicy::SkipRow);
        assert_eq!(plan.lookup_c, LookupSpec::new("file3", "ckey"));
    }

    #[test]
    fn test_duplicate_source_names_rejected() {
        let yaml = r#"
driver: { name: data, path: a.xlsx }
lookup_b: { name: DATA, path: b.xlsx, key: k }
lookup_c: { path: c.xlsx, key: k }
output: { columns: [data.id] }
"#;
        let err = JoinSettings::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, JoinError::Config(_)));
    }

    #[test]
    fn test_empty_columns_rejected() {
        let yaml = r#"
driver: { path: a.xlsx }
lookup_b: { path: b.xlsx, key: k }
lookup_c: { path: c.xlsx, key: k }
output: { columns: " , " }
"#;
        let err = JoinSettings::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, JoinError::Config(_)));
    }

    #[test]
    fn test_missing_key_is_yaml_error() {
        let yaml = r#"
driver: { path: a.xlsx }
lookup_b: { path: b.xlsx }
lookup_c: { path: c.xlsx, key: k }
output: { columns: [id] }
"#;
        let err = JoinSettings::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, JoinError::Yaml(_)));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("join.yaml");
        std::fs::write(&path, BASIC).unwrap();

        let settings = JoinSettings::load(&path).unwrap();
        assert_eq!(settings.driver.path, temp_dir.path().join("a.xlsx"));
        assert_eq!(settings.output.dir, temp_dir.path().join("."));
    }

    #[test]
    fn test_load_with_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let fallback = temp_dir.path().join("fallback.yaml");
        std::fs::write(&fallback, BASIC).unwrap();
        let missing = temp_dir.path().join("missing.yaml");

        let (settings, used) = JoinSettings::load_with_fallback(&missing, &fallback).unwrap();
        assert_eq!(used, fallback);
        assert_eq!(settings.lookup_c.source.name, "costs");

        let err = JoinSettings::load_with_fallback(&missing, &missing).unwrap_err();
        assert!(matches!(err, JoinError::Config(_)));
    }

    #[test]
    fn test_output_file_name() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 42)
            .unwrap();
        assert_eq!(output_file_name(now), "Out_20260307090542.xlsx");
    }
}
