use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::summary;

#[derive(Debug, Parser)]
#[command(author, version, about = "Diagnóstico de prazos para planilhas de tarefas contábeis", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Map spreadsheet columns onto the canonical task schema and print the report
    Map(MapArgs),
    /// Run the full pipeline: map columns, derive punctuality metrics, emit the annotated table
    Diagnose(DiagnoseArgs),
}

#[derive(Debug, Args)]
pub struct MapArgs {
    /// Input spreadsheet (.csv, .tsv or .xlsx; '-' reads CSV from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Worksheet name for XLSX input (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of CSV input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Emit the mapping report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DiagnoseArgs {
    /// Input spreadsheet (.csv, .tsv or .xlsx; '-' reads CSV from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output CSV file for the annotated table (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Worksheet name for XLSX input (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// CSV delimiter character for reading input
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to the input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of CSV input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Render the annotated table to stdout instead of writing CSV
    #[arg(long)]
    pub table: bool,
    /// Limit the number of rows rendered with --table
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
    /// Request a natural-language diagnostic summary after emitting the table
    #[arg(long)]
    pub summarize: bool,
    /// Credential for the summarization service (falls back to OPENAI_API_KEY)
    #[arg(long = "api-key")]
    pub api_key: Option<String>,
    /// Alternate OpenAI-compatible endpoint for the summarization service
    #[arg(long = "api-url")]
    pub api_url: Option<String>,
    /// Chat model used for the summary
    #[arg(long, default_value = summary::DEFAULT_MODEL)]
    pub model: String,
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
