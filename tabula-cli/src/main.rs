use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};

mod backend;
mod commands;
mod records;

#[derive(Parser)]
#[command(
    name = "tabula",
    about = "Filter, sort, page and delete rows of a JSON record file",
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one page of a record file as a table
    Show(ShowArgs),
    /// Delete records from a record file, with confirmation
    Delete(DeleteArgs),
}

#[derive(Args)]
pub struct ShowArgs {
    /// JSON array of records, each with an `id`
    pub file: PathBuf,

    /// Table configuration (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Columns to show, comma separated (default: every field)
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Fuzzy filter across all columns
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Column filter as `column=value`; repeatable
    #[arg(long = "where")]
    pub column_filters: Vec<String>,

    /// Sort column; prefix with `-` for descending. Repeatable, first wins
    #[arg(short, long, allow_hyphen_values = true)]
    pub sort: Vec<String>,

    /// Page to show, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Mark a record as selected; repeatable
    #[arg(long)]
    pub select: Vec<String>,

    /// Print the table state as JSON after the table
    #[arg(long)]
    pub dump_state: bool,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// JSON array of records, each with an `id`
    pub file: PathBuf,

    /// Record to delete; repeat for a bulk delete
    #[arg(long = "id", required = true)]
    pub ids: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => {
            TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Show(args) => commands::show(args),
        Commands::Delete(args) => commands::delete(args).await,
    }
}
