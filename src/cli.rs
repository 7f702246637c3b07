use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Infer sales roles from any CSV and report basket and trend metrics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the feature record inferred for every column
    Features(InputArgs),
    /// Show which column was resolved for each sales role
    Roles(InputArgs),
    /// Compute average basket size and average basket value
    Metrics(InputArgs),
    /// Total sales per month with the peak month
    Trend(InputArgs),
    /// Monthly sales per product category with the top category of each month
    Category(InputArgs),
    /// Total sales per year and per month name across years
    Calendar(InputArgs),
    /// Month with the highest sales
    Peak(InputArgs),
    /// Leading entry per group (defaults to the top product per gender)
    Top(TopArgs),
    /// Run every metric and aggregation in one pass
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file to analyze ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// YAML file overriding the built-in role keywords or month names
    #[arg(long = "keywords")]
    pub keywords: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct TopArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Column to group by (defaults to the gender column)
    #[arg(long = "group")]
    pub group: Option<String>,
    /// Column whose leading entry is reported (defaults to the product column)
    #[arg(long = "value")]
    pub value: Option<String>,
    /// Column summed per entry; occurrences are counted when omitted and no
    /// quantity column was resolved
    #[arg(long = "measure")]
    pub measure: Option<String>,
    /// Count occurrences even when a quantity column exists
    #[arg(long = "count", conflicts_with = "measure")]
    pub count: bool,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Emit the report as JSON instead of text tables
    #[arg(long)]
    pub json: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
