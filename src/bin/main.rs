//! ldp-stage CLI - Stage extracted JSON pages into SQL loading tables
//!
//! Usage:
//!   ldp-stage stage --load-dir <dir> [--table <name>]... [--dialect <dialect>] [--output <file>]
//!   ldp-stage analyze --load-dir <dir> --table <name>
//!   ldp-stage tables
//!
//! Examples:
//!   ldp-stage stage --load-dir /var/lib/ldp/load --output stage.sql
//!   ldp-stage stage --load-dir ./load --table user_users --dialect redshift
//!   ldp-stage analyze --load-dir ./load --table circulation_loans

use clap::{Parser, Subcommand, ValueEnum};
use ldp_stage::config::Settings;
use ldp_stage::sql::Dialect;
use ldp_stage::stage::{
    stage_tables, ContinuePolicy, LoadDir, ScriptExecutor, TableOutcome, TableStager,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ldp-stage")]
#[command(about = "Stage paginated JSON records into typed SQL loading tables")]
#[command(version)]
struct Cli {
    /// Path to the settings file (defaults to $LDP_CONFIG, ./ldp.toml, or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log everything, including generated SQL
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both passes for the selected tables and write the SQL script
    Stage {
        /// Directory holding the extracted pages
        #[arg(short, long)]
        load_dir: Option<PathBuf>,

        /// Table to stage (repeatable; all catalog tables if omitted)
        #[arg(short, long = "table")]
        tables: Vec<String>,

        /// SQL dialect to generate (overrides the settings file)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop at the first table that fails
        #[arg(long)]
        abort_on_error: bool,
    },

    /// Run pass 1 only and print the statistics and inferred columns
    Analyze {
        /// Directory holding the extracted pages
        #[arg(short, long)]
        load_dir: Option<PathBuf>,

        /// Table to analyze
        #[arg(short, long)]
        table: String,
    },

    /// List the known tables
    Tables,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Postgres,
    Redshift,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Redshift => Dialect::Redshift,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Stage {
            load_dir,
            tables,
            dialect,
            output,
            abort_on_error,
        } => cmd_stage(&settings, load_dir, tables, dialect, output, abort_on_error),
        Commands::Analyze { load_dir, table } => cmd_analyze(&settings, load_dir, table),
        Commands::Tables => cmd_tables(&settings),
    }
}

fn init_logging(verbose: bool, debug: bool) {
    let default_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn resolve_load_dir(settings: &Settings, arg: Option<PathBuf>) -> Result<LoadDir, String> {
    if let Some(dir) = arg {
        return Ok(LoadDir::new(dir));
    }
    match settings.load_dir() {
        Ok(Some(dir)) => Ok(LoadDir::new(dir)),
        Ok(None) => Err("no load directory given (use --load-dir or staging.load_dir)".into()),
        Err(e) => Err(e.to_string()),
    }
}

fn cmd_stage(
    settings: &Settings,
    load_dir: Option<PathBuf>,
    tables: Vec<String>,
    dialect: Option<DialectArg>,
    output: Option<PathBuf>,
    abort_on_error: bool,
) -> ExitCode {
    let load_dir = match resolve_load_dir(settings, load_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut options = match settings.stage_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error in settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(d) = dialect {
        options.dialect = d.into();
    }

    let selected = match settings.catalog().select(&tables) {
        Ok(t) => t,
        Err(unknown) => {
            eprintln!("Unknown table(s): {}", unknown.join(", "));
            return ExitCode::FAILURE;
        }
    };

    let out: Box<dyn Write> = match &output {
        Some(path) => match File::create(path) {
            Ok(f) => Box::new(BufWriter::new(f)),
            Err(e) => {
                eprintln!("Error creating '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdout().lock()),
    };
    let mut exec = ScriptExecutor::new(out);

    let policy = if abort_on_error {
        ContinuePolicy::Abort
    } else {
        ContinuePolicy::Continue
    };
    let anonymizer = settings.anonymizer();
    let outcomes = stage_tables(selected, &load_dir, &options, &anonymizer, &mut exec, policy);

    if let Err(e) = exec.into_inner() {
        eprintln!("Error writing script: {}", e);
        return ExitCode::FAILURE;
    }

    let mut failed = 0;
    for outcome in &outcomes {
        match outcome {
            TableOutcome::Staged(report) => eprintln!(
                "staged   {}: {} rows, {} statements, {} warnings",
                report.table,
                report.rows_inserted,
                report.statements,
                report.warnings.len()
            ),
            TableOutcome::Skipped { table, reason } => eprintln!("skipped  {}: {}", table, reason),
            TableOutcome::Failed { table, error } => {
                failed += 1;
                eprintln!("FAILED   {}: {}", table, error);
            }
        }
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn cmd_analyze(settings: &Settings, load_dir: Option<PathBuf>, table: String) -> ExitCode {
    let load_dir = match resolve_load_dir(settings, load_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let options = match settings.stage_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error in settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let Some(schema) = settings.catalog().get(&table).cloned() else {
        eprintln!("Unknown table: {}", table);
        return ExitCode::FAILURE;
    };

    let anonymizer = settings.anonymizer();
    let mut stager = TableStager::new(schema, &load_dir, &options, &anonymizer);
    let analysis = match stager.analyze() {
        Ok(Some(a)) => a,
        Ok(None) => {
            println!("Table {} has no pages to analyze.", table);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Table: {}", table);
    println!("Files: {}", analysis.pages.len());
    println!("Records: {}", analysis.stats.records());
    println!();

    println!("Fields:");
    for (field, c) in analysis.stats.iter() {
        println!(
            "  {:<32} string={} datetime={} uuid={} bool={} number={} int={} float={} null={}",
            field, c.string, c.date_time, c.uuid, c.boolean, c.number, c.integer, c.floating, c.null
        );
    }
    println!();

    println!("Columns:");
    for column in &analysis.columns {
        println!(
            "  {:<32} {:<16} (from \"{}\")",
            column.name,
            column.column_type.sql_type(),
            column.source_name
        );
    }

    ExitCode::SUCCESS
}

fn cmd_tables(settings: &Settings) -> ExitCode {
    let catalog = settings.catalog();
    println!("Tables:");
    for table in catalog.tables() {
        println!(
            "  - {} (source: \"{}\", module: {})",
            table.name, table.source_path, table.module
        );
    }
    ExitCode::SUCCESS
}
