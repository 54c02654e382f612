//! CLI command handlers

pub mod commands;

pub use commands::{headers, run, RunOptions};
