//! Join engine: coercion, row materialization, keyed lookup, join driver, row writer

pub mod coerce;
pub mod joiner;
pub mod lookup;
pub mod materialize;
pub mod row_writer;
pub mod source;

pub use coerce::coerce;
pub use joiner::{run, JoinOutcome, JoinPlan, JoinReport, JoinSources, LookupSpec, SkippedRow};
pub use lookup::find_by_key;
pub use materialize::{header_labels, materialize};
pub use row_writer::{header_row, project, write_table, TabularSink};
pub use source::{Sheet, TabularSource};
