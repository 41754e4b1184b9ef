use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore CSV data: filter, summarize, and chart", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Filter and sort rows, then print them as CSV or a table
    View(ViewArgs),
    /// Summarize row/column counts and numeric column statistics
    Stats(ReportArgs),
    /// Report IQR outliers for every numeric column
    Outliers(ReportArgs),
    /// Print the Pearson correlation matrix of numeric columns
    Correlate(ReportArgs),
    /// Fit a linear trend over the date column and forecast five days ahead
    Trend(TrendArgs),
    /// Check chart eligibility and emit aggregated chart rows as JSON
    Chart(ChartArgs),
    /// Append (or overwrite) a column computed from two others
    Derive(DeriveArgs),
    /// Fill missing values in a numeric column
    Impute(ImputeArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Saved filter state (YAML for .yml/.yaml, JSON otherwise)
    #[arg(long = "state")]
    pub state: Option<PathBuf>,
    /// Case-insensitive substring matched against every cell
    #[arg(short = 's', long = "search")]
    pub search: Option<String>,
    /// Per-column substring filters of the form `column=text`
    #[arg(long = "filter", action = clap::ArgAction::Append)]
    pub filters: Vec<String>,
    /// Keep rows whose column equals a value exactly (ignoring case): `column=value`
    #[arg(long = "cross-filter")]
    pub cross_filter: Option<String>,
    /// Sort directive of the form `column[:asc|desc]`
    #[arg(long = "sort")]
    pub sort: Option<String>,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Limit number of rows emitted
    #[arg(long)]
    pub limit: Option<usize>,
    /// Render output as a table with an outlier marker column
    #[arg(long = "table")]
    pub table: bool,
    /// Emit the working view as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Emit the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TrendArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Numeric column to fit against the detected date column
    #[arg(long = "value")]
    pub value: String,
    /// Emit the model as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Column for the x axis
    #[arg(short = 'x', long = "x")]
    pub x: String,
    /// Column for the y axis
    #[arg(short = 'y', long = "y")]
    pub y: String,
    /// Restrict output to one chart kind (bar, line, pie, scatter, box, area)
    #[arg(long)]
    pub kind: Option<String>,
    /// Zoom to an inclusive row range of the aggregated output: `start:end`
    #[arg(long)]
    pub brush: Option<String>,
    /// Write JSON to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Expression `left<op>right` (or `name=left<op>right`); op is one of + - * /
    #[arg(short = 'e', long = "expr")]
    pub expr: String,
    /// Name of the computed column (required unless `--expr` names it)
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImputeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Column whose missing cells are filled
    #[arg(short = 'c', long = "column")]
    pub column: String,
    /// Fill method: mean, median, or custom
    #[arg(short = 'm', long = "method", default_value = "mean")]
    pub method: String,
    /// Fill value used with `--method custom`
    #[arg(long = "value", default_value = "")]
    pub value: String,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value.to_ascii_lowercase().as_str() {
        "tab" | "\t" | "\\t" => return Ok(b'\t'),
        "comma" => return Ok(b','),
        "pipe" => return Ok(b'|'),
        "semicolon" => return Ok(b';'),
        _ => {}
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err("Delimiter cannot be empty".to_string()),
        (Some(_), Some(_)) => Err("Delimiter must be a single character".to_string()),
        (Some(ch), None) if !ch.is_ascii() => Err("Delimiter must be ASCII".to_string()),
        (Some(ch), None) => Ok(ch as u8),
    }
}
