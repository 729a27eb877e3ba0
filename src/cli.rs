use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "import-timeline",
    about = "Chart when your repositories adopted and last touched each library",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file [default: ./.import-timeline/config.toml, fallback ~/.config/import-timeline/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only print summary lines
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan an account's repositories and write the usage export and category skeleton
    Scan(ScanArgs),
    /// Build the timeline chart from the export and category files
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Account whose repositories are scanned (prompted for when omitted)
    #[arg(long)]
    pub user: Option<String>,

    /// Usage export to write
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Category file to create or extend
    #[arg(long, value_name = "FILE")]
    pub categories: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Usage export to read
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Category file to read
    #[arg(long, value_name = "FILE")]
    pub categories: Option<PathBuf>,

    /// Enabled categories file, one per line
    #[arg(long, value_name = "FILE")]
    pub enabled: Option<PathBuf>,

    /// Directory for the generated report
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also write a static PNG of the visible categories
    #[arg(long)]
    pub png: bool,

    /// Open the report in the default browser
    #[arg(long)]
    pub open: bool,
}
