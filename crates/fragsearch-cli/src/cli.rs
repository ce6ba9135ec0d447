use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "fragsearch - Replace the fragments of a core structure by searching fragment databases.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search every fragment of the core against every database and merge the hits.
    Run(SearchArgs),
    /// Decompose the core and list the jobs a run would execute, without running them.
    Plan(SearchArgs),
}

/// Arguments shared by `run` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    // --- Core Arguments ---
    /// Core structure as a SMILES string.
    #[arg(required = true, value_name = "CORE_SMILES")]
    pub core: String,

    /// Scaffold structure as a SMILES string; what is left of the core after removing it is searched.
    #[arg(required = true, value_name = "SCAFFOLD_SMILES")]
    pub scaffold: String,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Search Overrides ---
    /// Fragment databases to search, comma-separated. Replaces the configured list.
    #[arg(long = "db", value_name = "DB[,DB...]", value_delimiter = ',')]
    pub databases: Vec<String>,

    /// Processors per search (passed on as -mpi_np when greater than 1).
    #[arg(short = 'n', long, value_name = "INT")]
    pub nproc: Option<usize>,

    /// Extra parameters passed to every search, e.g. "-maxHits 100".
    #[arg(long, value_name = "PARAMS", allow_hyphen_values = true)]
    pub other_params: Option<String>,

    /// Path to the search executable.
    #[arg(long, value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// License file exported to every search process.
    #[arg(long, value_name = "PATH")]
    pub license: Option<PathBuf>,

    /// Decomposition helper program, called as `<PATH> <core> <scaffold>`.
    /// Defaults to the bundled RDKit helper.
    #[arg(long, value_name = "PATH")]
    pub decomposer: Option<PathBuf>,

    // --- Output Overrides ---
    /// Directory for transient inputs and per-job outputs.
    #[arg(short, long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Path of the combined table (default: <work-dir>/res.csv).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path of the run log (default: <work-dir>/log.dat).
    #[arg(long, value_name = "PATH")]
    pub run_log: Option<PathBuf>,

    /// Keep structure files, per-job tables and console logs after the run.
    #[arg(long)]
    pub keep_intermediates: bool,

    // --- Execution Overrides ---
    /// Number of searches run at the same time.
    #[arg(short = 'j', long, value_name = "NUM")]
    pub workers: Option<usize>,

    /// Kill any search that runs longer than this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S execution.workers=4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
