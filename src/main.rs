use clap::{Parser, Subcommand};
use royalbit_xljoin::cli;
use royalbit_xljoin::error::JoinResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "xljoin")]
#[command(about = "Join three Excel workbooks into one by chained key lookups.")]
#[command(long_about = "XLJoin - Join three Excel workbooks by key

The driver workbook (file1) decides the output rows. For each driver row,
one key column finds the matching row in file2 and another key column finds
the matching row in file3. Selected columns from the three rows are written
to a new workbook.

COMMANDS:
  run       - Join the workbooks named in a settings file
  headers   - List the qualified column keys of a workbook

EXAMPLES:
  xljoin run -c xljoin.yaml                 # Join and write Out_<timestamp>.xlsx
  xljoin run -c xljoin.yaml --dry-run       # Join without writing
  xljoin headers customers.xlsx --name file2")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Join the workbooks named in a settings file.

SETTINGS (YAML):
  driver:   { name: file1, path: orders.xlsx }
  lookup_b: { name: file2, path: customers.xlsx, key: customer_id }
  lookup_c: { name: file3, path: prices.xlsx, key: sku }
  output:
    dir: out
    columns: [file1.order_id, file2.name, file3.price]
    include_source_names: false
    on_unresolved: abort        # or skip_row

If the settings file does not exist, config/xljoin.yaml is used instead.

An output column whose source had no matching row stops the run
(or skips that row with --skip-unresolved). It is never written blank.")]
    /// Join the workbooks named in a settings file
    Run {
        /// Path to the YAML settings file
        #[arg(short, long, default_value = "xljoin.yaml", env = "XLJOIN_CONFIG")]
        config: PathBuf,

        /// Output file (default: <output.dir>/Out_<timestamp>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep the source name in header cells (file2.name instead of name)
        #[arg(long)]
        include_source_names: bool,

        /// Skip driver rows with unresolved output columns instead of aborting
        #[arg(long)]
        skip_unresolved: bool,

        /// Join without writing the output file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show verbose progress
        #[arg(short, long)]
        verbose: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the qualified column keys of a workbook
    Headers {
        /// Path to Excel file (.xlsx)
        file: PathBuf,

        /// Worksheet to read (default: first)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Source name used to qualify the keys
        #[arg(long, default_value = "file1")]
        name: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "xljoin=debug,royalbit_xljoin=debug"
    } else {
        "xljoin=warn,royalbit_xljoin=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> JoinResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            include_source_names,
            skip_unresolved,
            dry_run,
            verbose,
            json,
        } => {
            init_tracing(verbose);
            cli::run(cli::RunOptions {
                config,
                output,
                include_source_names,
                skip_unresolved,
                dry_run,
                verbose,
                json,
            })
        }

        Commands::Headers { file, sheet, name } => {
            init_tracing(false);
            cli::headers(file, sheet, name)
        }
    }
}
