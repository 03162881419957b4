use log::{debug, info, warn};

use exit_destination::summaries::{summarize, Attribute};
use exit_destination::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod io_output;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Missing worksheet {sheet:?} in file {path}"))]
    MissingSheet { path: String, sheet: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error writing CSV file {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing Excel file {path}"))]
    WritingXlsx {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("The report could not be computed: {source}"))]
    Pipeline { source: ReportErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Reads all the sources and concatenates the entry and the exit records.
///
/// Relative paths are resolved from `root_path`.
fn read_sources(
    root_path: &Path,
    sources: &[FileSource],
    max_columns: usize,
) -> ReportResult<(RecordTable, RecordTable)> {
    let resolve = |p: &String| -> String {
        let pb: PathBuf = root_path.join(p);
        pb.as_path().display().to_string()
    };
    let mut entries: Vec<RecordTable> = Vec::new();
    let mut exits: Vec<RecordTable> = Vec::new();
    for cfs in sources.iter() {
        match cfs.provider.as_str() {
            "xlsx" => {
                let path = match &cfs.file_path {
                    Some(p) => resolve(p),
                    None => whatever!("Missing filePath for the xlsx source {:?}", cfs),
                };
                info!("Attempting to read workbook {:?}", path);
                let (entry, exit) = io_excel::read_workbook(
                    &path,
                    cfs.entry_sheet.as_deref().unwrap_or(DEFAULT_ENTRY_SHEET),
                    cfs.exit_sheet.as_deref().unwrap_or(DEFAULT_EXIT_SHEET),
                    max_columns,
                )?;
                entries.push(entry);
                exits.push(exit);
            }
            "csv" => {
                let (entry_path, exit_path) = match (&cfs.entry_path, &cfs.exit_path) {
                    (Some(e), Some(x)) => (resolve(e), resolve(x)),
                    _ => whatever!(
                        "The csv source needs both entryPath and exitPath: {:?}",
                        cfs
                    ),
                };
                info!("Attempting to read {:?} and {:?}", entry_path, exit_path);
                // The column limit only applies to workbooks.
                entries.push(io_csv::read_csv_table(&entry_path, None)?);
                exits.push(io_csv::read_csv_table(&exit_path, None)?);
            }
            x => whatever!("Provider not implemented {:?}", x),
        }
    }
    Ok((RecordTable::concat(&entries), RecordTable::concat(&exits)))
}

/// The configuration file, with the command line options applied on top of it.
/// Returns the configuration and the directory the relative paths start from.
fn resolve_config(args: &Args) -> ReportResult<(ReportConfig, PathBuf)> {
    let (mut config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (ReportConfig::default(), PathBuf::new()),
    };

    let mut cli_sources: Vec<FileSource> =
        args.input.iter().map(|p| FileSource::xlsx(p)).collect();
    match (&args.entry, &args.exit) {
        (Some(entry), Some(exit)) => cli_sources.push(FileSource::csv(entry, exit)),
        (None, None) => {}
        _ => whatever!("--entry and --exit must be used together"),
    }
    if !cli_sources.is_empty() {
        debug!("resolve_config: the command line sources replace {:?}", config.input_sources);
        config.input_sources = cli_sources;
        // Relative to the working directory.
        return finish_config(config, PathBuf::new(), args);
    }
    finish_config(config, root, args)
}

fn finish_config(
    mut config: ReportConfig,
    root: PathBuf,
    args: &Args,
) -> ReportResult<(ReportConfig, PathBuf)> {
    for source in config.input_sources.iter_mut() {
        if args.entry_sheet.is_some() {
            source.entry_sheet = args.entry_sheet.clone();
        }
        if args.exit_sheet.is_some() {
            source.exit_sheet = args.exit_sheet.clone();
        }
    }
    if args.max_columns.is_some() {
        config.max_columns = args.max_columns;
    }
    if config.input_sources.is_empty() {
        whatever!(
            "No input data: use --input, --entry and --exit, or a configuration file with inputSources"
        )
    }
    Ok((config, root))
}

/// Computes the report for a configuration and assembles the JSON summary.
pub fn compute_report(
    config: &ReportConfig,
    root_path: &Path,
) -> ReportResult<(PerformanceAnalysis, JSValue)> {
    info!("config: {:?}", config);
    let flow_attributes: Vec<Attribute> = config.flow_attributes()?;
    let max_columns = config.max_columns.unwrap_or(DEFAULT_MAX_COLUMNS);

    let (entry, exit) = read_sources(root_path, &config.input_sources, max_columns)?;
    let columns = config.column_names();

    let analysis = run_performance_report(&entry, &exit, &columns).context(PipelineSnafu {})?;
    let summaries =
        summarize(&analysis.records, &analysis.report, &flow_attributes).context(PipelineSnafu {})?;

    let js = io_output::build_summary_js(&config.output_config(), &analysis, &summaries);
    Ok((analysis, js))
}

/// Compares the summary with a reference summary. The differences are printed.
pub fn check_reference(summary_path: &str, pretty_js_stats: &str) -> ReportResult<()> {
    let summary_ref = read_summary(summary_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    info!("The report matches the reference {}", summary_path);
    Ok(())
}

pub fn run_report(args: &Args) -> ReportResult<()> {
    let (config, root) = resolve_config(args)?;
    let (analysis, result_js) = compute_report(&config, &root)?;

    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let default_out: Option<String> = config
        .output_settings
        .output_directory
        .as_ref()
        .map(|d| root.join(d).join("q23c_summary.json").display().to_string());
    match args.out.clone().or(default_out).as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_stats),
        Some("") => {}
        Some(out_path) => io_output::write_json(&result_js, out_path)?,
    }
    if let Some(csv_path) = &args.csv_out {
        io_csv::write_report_csv(&analysis.report, csv_path)?;
    }
    if let Some(xlsx_path) = &args.xlsx_out {
        io_output::write_report_xlsx(&analysis.report, xlsx_path)?;
    }

    if let Some(summary_p) = &args.reference {
        check_reference(summary_p, &pretty_js_stats)?;
    }
    Ok(())
}
