pub mod cli;
pub mod data;
pub mod frame;
pub mod io_utils;
pub mod mapper;
pub mod metrics;
pub mod summary;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use crate::cli::{Cli, Commands, DiagnoseArgs, MapArgs};
use crate::frame::Frame;
use crate::mapper::{MapperConfig, MappingReport};
use crate::metrics::DeriveConfig;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("prazo_diag", log::LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Map(args) => handle_map(&args),
        Commands::Diagnose(args) => handle_diagnose(&args),
    }
}

fn load_frame(
    input: &std::path::Path,
    delimiter: Option<u8>,
    encoding_label: Option<&str>,
    sheet: Option<&str>,
) -> Result<Frame> {
    let encoding = io_utils::resolve_encoding(encoding_label)?;
    let frame = Frame::load(input, delimiter, encoding, sheet)
        .with_context(|| format!("Loading {input:?}"))?;
    info!(
        "Loaded {} row(s) across {} column(s) from '{}'",
        frame.rows.len(),
        frame.headers.len(),
        input.display()
    );
    Ok(frame)
}

fn report_mapping(report: &MappingReport, config: &MapperConfig) {
    if report.is_partial() {
        warn!(
            "Only {} of {} expected columns were identified; check the spreadsheet headers",
            report.resolved.len(),
            mapper::CANONICAL_FIELD_COUNT
        );
        warn!("Unresolved fields: {}", report.unresolved(config).join(", "));
    } else {
        info!("All canonical columns identified");
    }
}

fn handle_map(args: &MapArgs) -> Result<()> {
    let frame = load_frame(
        &args.input,
        args.delimiter,
        args.input_encoding.as_deref(),
        args.sheet.as_deref(),
    )?;
    let config = MapperConfig::default();
    let (_, report) = mapper::map_schema(frame, &config);
    report_mapping(&report, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Colunas originais: {}", report.original_columns.join(", "));
    let headers = vec!["campo".to_string(), "coluna de origem".to_string()];
    let rows: Vec<Vec<String>> = config
        .fields
        .iter()
        .map(|field| {
            let source = report
                .source_for(field.canonical)
                .map(|s| s.describe())
                .unwrap_or_else(|| "(não encontrada)".to_string());
            vec![field.canonical.to_string(), source]
        })
        .collect();
    table::print_table(&headers, &rows);
    Ok(())
}

fn handle_diagnose(args: &DiagnoseArgs) -> Result<()> {
    let frame = load_frame(
        &args.input,
        args.delimiter,
        args.input_encoding.as_deref(),
        args.sheet.as_deref(),
    )?;
    let mapper_config = MapperConfig::default();
    let (mapped, report) = mapper::map_schema(frame, &mapper_config);
    report_mapping(&report, &mapper_config);

    let annotated = metrics::derive_metrics(mapped, &DeriveConfig::default());

    if args.table {
        let rows: Vec<Vec<String>> = annotated.rows.iter().take(args.limit).cloned().collect();
        table::print_table(&annotated.headers, &rows);
    } else {
        let input_delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
        let delimiter = io_utils::resolve_output_delimiter(
            args.output.as_deref(),
            args.output_delimiter,
            input_delimiter,
        );
        annotated.write_csv(args.output.as_deref(), delimiter)?;
        if let Some(output) = &args.output {
            info!(
                "Annotated table with {} row(s) written to {:?}",
                annotated.rows.len(),
                output
            );
        }
    }

    if args.summarize {
        // Best effort from here on: the annotated table is already out.
        match request_summary(args, &annotated) {
            Ok(text) => println!("\n{text}"),
            Err(err) => warn!("Summarization failed: {err:#}"),
        }
    }
    Ok(())
}

fn request_summary(args: &DiagnoseArgs, annotated: &Frame) -> Result<String> {
    let api_key = args
        .api_key
        .clone()
        .or_else(|| env::var("OPENAI_API_KEY").ok())
        .context("No credential: pass --api-key or set OPENAI_API_KEY")?;
    let mut client = summary::SummaryClient::new(api_key, args.model.clone());
    if let Some(url) = &args.api_url {
        client = client.with_base_url(url.clone());
    }
    let prompt = summary::build_prompt(annotated);
    info!("Requesting diagnostic summary with model '{}'", args.model);
    client.summarize(&prompt)
}
