use crate::options::sub_command::Commands;
use clap::Parser;
use std::path::PathBuf;

/// program to resolve natural-language UI instructions into cached element locators.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Build main sub commands
    #[clap(subcommand)]
    pub command: Commands,
    /// Print diagnostics on standard error
    #[clap(short, long, global = true)]
    pub verbose: bool,
    /// Directory holding cache stores. Defaults to LOCATOR_CACHE_DIR or the current directory.
    #[clap(long, global = true)]
    pub cache_dir: Option<PathBuf>,
    /// Usage log file. Defaults to LOCATOR_USAGE_LOG or ./usageLog.json.
    #[clap(long, global = true)]
    pub usage_log: Option<PathBuf>,
}
