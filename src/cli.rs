use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "diffsel",
    version,
    about = "Terminal diff reviewer: select code, get a line/column comment range"
)]
pub struct Cli {
    /// Branch, commit or ref to compare the working tree against
    pub target: Option<String>,

    /// Ignore whitespace changes
    #[arg(short = 'w', long = "ignore-ws")]
    pub ignore_whitespace: bool,

    /// Start in unified view instead of split
    #[arg(long)]
    pub unified: bool,

    /// Color theme (one-dark, github-dark, dracula)
    #[arg(long)]
    pub theme: Option<String>,

    /// Write logs here instead of the default file in the temp directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Quiet period in milliseconds before a selection is resolved
    #[arg(long, value_name = "N")]
    pub debounce_ms: Option<u64>,
}
