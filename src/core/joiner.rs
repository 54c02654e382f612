//! Join driver: walks the driver source and chains the two keyed lookups
//!
//! For each driver data row:
//! 1. materialize the row
//! 2. read its two key values
//! 3. look up source B by the first key and source C by the second
//! 4. merge whatever was found into a fresh [`MergedRow`]
//! 5. project the merged row through the output spec
//!
//! Output rows keep driver row order. Lookups are plain scans, so cost is
//! O(driver rows × (B rows + C rows)) and duplicate keys resolve to the
//! earliest row.

use crate::core::lookup::find_by_key;
use crate::core::materialize::materialize;
use crate::core::row_writer::{header_row, project};
use crate::core::source::TabularSource;
use crate::error::{JoinError, JoinResult};
use crate::types::{FieldKey, MergedRow, OutputSpec, OutputTable, UnresolvedPolicy};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A lookup source and the driver column used to key into it.
/// The column has the same label in the driver and in the lookup source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSpec {
    pub source_name: String,
    pub key_column: String,
}

impl LookupSpec {
    pub fn new(source_name: &str, key_column: &str) -> Self {
        Self {
            source_name: source_name.trim().to_lowercase(),
            key_column: key_column.trim().to_lowercase(),
        }
    }
}

/// Everything the join needs besides the sources themselves
#[derive(Debug, Clone)]
pub struct JoinPlan {
    pub driver_name: String,
    pub lookup_b: LookupSpec,
    pub lookup_c: LookupSpec,
    pub output: OutputSpec,
    pub include_source_names: bool,
    pub on_unresolved: UnresolvedPolicy,
}

impl JoinPlan {
    pub fn new(
        driver_name: &str,
        lookup_b: LookupSpec,
        lookup_c: LookupSpec,
        output: OutputSpec,
    ) -> Self {
        Self {
            driver_name: driver_name.trim().to_lowercase(),
            lookup_b,
            lookup_c,
            output,
            include_source_names: false,
            on_unresolved: UnresolvedPolicy::default(),
        }
    }

    pub fn with_source_names_in_header(mut self, include: bool) -> Self {
        self.include_source_names = include;
        self
    }

    pub fn with_unresolved_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.on_unresolved = policy;
        self
    }
}

/// The three sources of one run
#[derive(Clone, Copy)]
pub struct JoinSources<'a> {
    pub driver: &'a dyn TabularSource,
    pub lookup_b: &'a dyn TabularSource,
    pub lookup_c: &'a dyn TabularSource,
}

/// A driver row left out under [`UnresolvedPolicy::SkipRow`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub driver_row: usize,
    pub field: String,
    pub unmatched: Vec<String>,
}

/// Run statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub driver_rows: usize,
    pub rows_written: usize,
    pub unmatched_b: usize,
    pub unmatched_c: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Output table plus run statistics
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub table: OutputTable,
    pub report: JoinReport,
}

/// Join the three sources according to `plan`
pub fn run(plan: &JoinPlan, sources: JoinSources<'_>) -> JoinResult<JoinOutcome> {
    let mut table = OutputTable::new(header_row(&plan.output, plan.include_source_names));
    let mut report = JoinReport::default();

    let key_b = FieldKey::new(&plan.driver_name, &plan.lookup_b.key_column);
    let key_c = FieldKey::new(&plan.driver_name, &plan.lookup_c.key_column);
    let last_row = sources.driver.last_row().unwrap_or(0);

    for index in 1..=last_row {
        let driver_row = materialize(&plan.driver_name, sources.driver, index)?;

        let value_b = driver_row
            .get(&key_b)
            .cloned()
            .ok_or_else(|| missing_key(plan, index, &key_b))?;
        let value_c = driver_row
            .get(&key_c)
            .cloned()
            .ok_or_else(|| missing_key(plan, index, &key_c))?;

        let match_b = find_by_key(
            &plan.lookup_b.source_name,
            sources.lookup_b,
            &plan.lookup_b.key_column,
            &value_b,
        )?;
        let match_c = find_by_key(
            &plan.lookup_c.source_name,
            sources.lookup_c,
            &plan.lookup_c.key_column,
            &value_c,
        )?;

        if match_b.is_none() {
            report.unmatched_b += 1;
            debug!(row = index, key = %value_b, source = %plan.lookup_b.source_name, "no match");
        }
        if match_c.is_none() {
            report.unmatched_c += 1;
            debug!(row = index, key = %value_c, source = %plan.lookup_c.source_name, "no match");
        }

        let merged = MergedRow::merge(
            index,
            driver_row,
            vec![
                (plan.lookup_b.source_name.as_str(), match_b),
                (plan.lookup_c.source_name.as_str(), match_c),
            ],
        );
        report.driver_rows += 1;

        match project(&merged, &plan.output) {
            Ok(row) => {
                debug!(row = index, fields = merged.len(), "row joined");
                table.push(row);
            }
            Err(JoinError::UnresolvedOutputField {
                row,
                field,
                unmatched,
            }) if plan.on_unresolved == UnresolvedPolicy::SkipRow => {
                warn!(row, %field, ?unmatched, "skipping driver row with unresolved output field");
                report.skipped.push(SkippedRow {
                    driver_row: row,
                    field,
                    unmatched,
                });
            }
            Err(e) => return Err(e),
        }
    }

    report.rows_written = table.row_count();
    info!(
        driver_rows = report.driver_rows,
        rows_written = report.rows_written,
        skipped = report.skipped.len(),
        "join complete"
    );
    Ok(JoinOutcome { table, report })
}

fn missing_key(plan: &JoinPlan, row: usize, key: &FieldKey) -> JoinError {
    JoinError::MissingKeyField {
        source_name: plan.driver_name.clone(),
        row,
        column: key.column().to_string(),
    }
}
