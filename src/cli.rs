use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for habitdash
#[derive(Parser, Debug)]
#[command(version, about = "habitdash")]
pub struct Args {
    /// Survey data file (csv, tsv, or Excel)
    pub path: PathBuf,

    /// Excel worksheet to read, by name or 0-based index
    #[arg(long = "sheet")]
    pub sheet: Option<String>,

    /// Specify the delimiter to use when reading a CSV file
    #[arg(long = "delimiter")]
    pub delimiter: Option<char>,

    /// Use a custom config directory instead of the platform default
    #[arg(long = "config-dir")]
    pub config_dir: Option<PathBuf>,

    /// Write the default config file and exit
    #[arg(long = "write-config", action)]
    pub write_config: bool,

    /// Overwrite an existing config file when writing it
    #[arg(long = "force", action)]
    pub force: bool,

    /// Read input events from a file instead of stdin
    #[arg(long = "events")]
    pub events: Option<PathBuf>,

    /// Skip the initial full emission of all outputs
    #[arg(long = "no-initial", action)]
    pub no_initial: bool,
}
