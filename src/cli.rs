use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::dataset::Separator;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Append a call-log export onto an existing call dataset",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Repair, format, and append a new call-log export to the primary dataset
    Merge(MergeArgs),
    /// Repair and format a call-log export without merging it
    Format(FormatArgs),
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Existing dataset the new calls are appended to
    #[arg(short = 'p', long = "primary")]
    pub primary: PathBuf,
    /// Call-log export holding the new calls
    #[arg(short = 'n', long = "new-data")]
    pub new_data: PathBuf,
    /// Merged CSV destination (stdout if omitted or '-')
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Separator of the primary dataset ('comma' or 'semicolon')
    #[arg(long, value_enum, default_value = "semicolon")]
    pub delimiter: Separator,
    /// Separator of the call-log export
    #[arg(long = "new-data-delimiter", value_enum, default_value = "comma")]
    pub new_data_delimiter: Separator,
    /// Separator of the merged output (defaults to the primary separator)
    #[arg(long = "output-delimiter", value_enum)]
    pub output_delimiter: Option<Separator>,
    /// Character encoding of both inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Write a JSON summary of the merge to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Call-log export to format
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Formatted CSV destination (stdout if omitted or '-')
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Separator of the call-log export
    #[arg(long = "new-data-delimiter", value_enum, default_value = "comma")]
    pub new_data_delimiter: Separator,
    /// Separator of the formatted output
    #[arg(long, value_enum, default_value = "semicolon")]
    pub delimiter: Separator,
    /// Character encoding of the input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Render the formatted rows as a table on stdout instead of CSV
    #[arg(long)]
    pub table: bool,
    /// Maximum rows to render with --table
    #[arg(long)]
    pub limit: Option<usize>,
}
