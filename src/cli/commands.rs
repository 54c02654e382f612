use crate::config::{self, JoinSettings, SourceSettings, FALLBACK_CONFIG_PATH};
use crate::core::{self, header_labels, JoinReport, JoinSources, Sheet};
use crate::error::JoinResult;
use crate::excel::{ExcelExporter, ExcelImporter};
use crate::types::{FieldKey, UnresolvedPolicy};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Options of the `run` command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub include_source_names: bool,
    pub skip_unresolved: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub json: bool,
}

/// `--json` output of the `run` command
#[derive(Debug, Serialize)]
struct RunSummary {
    config: String,
    output: Option<String>,
    #[serde(flatten)]
    report: JoinReport,
}

fn import_source(source: &SourceSettings) -> JoinResult<Sheet> {
    ExcelImporter::new(&source.path)
        .with_sheet(source.sheet.clone())
        .import()
}

/// Execute the run command
pub fn run(options: RunOptions) -> JoinResult<()> {
    let quiet = options.json;
    if !quiet {
        println!("{}", "🔗 XLJoin - Joining workbooks".bold().green());
    }

    let (settings, used_config) =
        JoinSettings::load_with_fallback(&options.config, Path::new(FALLBACK_CONFIG_PATH))?;

    let mut plan = settings.plan();
    if options.include_source_names {
        plan = plan.with_source_names_in_header(true);
    }
    if options.skip_unresolved {
        plan = plan.with_unresolved_policy(UnresolvedPolicy::SkipRow);
    }

    if !quiet {
        println!("   Settings: {}", used_config.display());
        if options.dry_run {
            println!(
                "{}",
                "📋 DRY RUN MODE - No output file will be written".yellow()
            );
        }
        println!();
    }

    if options.verbose && !quiet {
        println!("{}", "📖 Reading workbooks...".cyan());
    }
    let driver = import_source(&settings.driver)?;
    let lookup_b = import_source(&settings.lookup_b.source)?;
    let lookup_c = import_source(&settings.lookup_c.source)?;

    if options.verbose && !quiet {
        for (source, sheet) in [
            (&settings.driver, &driver),
            (&settings.lookup_b.source, &lookup_b),
            (&settings.lookup_c.source, &lookup_c),
        ] {
            println!(
                "   {} {} ({} rows)",
                source.name.bright_blue().bold(),
                source.path.display(),
                sheet.data_row_count()
            );
        }
        println!("{}", "🧮 Joining rows...".cyan());
    }

    let outcome = core::run(
        &plan,
        JoinSources {
            driver: &driver,
            lookup_b: &lookup_b,
            lookup_c: &lookup_c,
        },
    )?;

    let output_path = if options.dry_run {
        None
    } else {
        let path = options
            .output
            .clone()
            .unwrap_or_else(|| config::output_path(&settings.output.dir));
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        ExcelExporter::new(&outcome.table).export(&path)?;
        Some(path)
    };

    let report = outcome.report;
    if quiet {
        let summary = RunSummary {
            config: used_config.display().to_string(),
            output: output_path.as_ref().map(|p| p.display().to_string()),
            report,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "✅ Join complete".bold().green());
    println!("   Driver rows:   {}", report.driver_rows);
    println!("   Rows written:  {}", report.rows_written);
    println!(
        "   No match in {}: {}",
        plan.lookup_b.source_name, report.unmatched_b
    );
    println!(
        "   No match in {}: {}",
        plan.lookup_c.source_name, report.unmatched_c
    );
    if !report.skipped.is_empty() {
        println!(
            "{}",
            format!("⚠️  Skipped {} row(s):", report.skipped.len()).yellow()
        );
        for skipped in &report.skipped {
            println!(
                "      row {}: '{}' unresolved",
                skipped.driver_row, skipped.field
            );
        }
    }
    match output_path {
        Some(path) => println!("   📄 File '{}' created", path.display()),
        None => println!("{}", "📋 Dry run complete - no file written".yellow()),
    }

    Ok(())
}

/// Execute the headers command: list the qualified keys a workbook exposes
pub fn headers(file: PathBuf, sheet: Option<String>, name: String) -> JoinResult<()> {
    let source = ExcelImporter::new(&file).with_sheet(sheet).import()?;
    let labels = header_labels(&name, &source)?;

    println!("{}", format!("📑 Columns of {}", file.display()).bold().green());
    for label in labels {
        println!("   {}", FieldKey::new(&name, &label));
    }
    Ok(())
}
