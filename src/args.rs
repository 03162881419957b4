use clap::Parser;

/// Computes the exit destination table (APR Q23c) from HMIS entry and exit exports.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the report and its input files.
    /// For more information about the file format, read the documentation of the
    /// exit_destination crate (manual).
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, repeatable) An Excel workbook with the 'Entry data' and 'Exit data' sheets.
    /// When several workbooks are given, their rows are concatenated. Setting this option
    /// overrides the input sources of the --config option.
    #[clap(short, long, value_parser)]
    pub input: Vec<String>,

    /// (file path) A CSV file with the entry data. Must be used together with --exit.
    #[clap(long, value_parser)]
    pub entry: Option<String>,

    /// (file path) A CSV file with the exit data. Must be used together with --entry.
    #[clap(long, value_parser)]
    pub exit: Option<String>,

    /// (default 'Entry data') The name of the worksheet with the entry data.
    #[clap(long, value_parser)]
    pub entry_sheet: Option<String>,

    /// (default 'Exit data') The name of the worksheet with the exit data.
    #[clap(long, value_parser)]
    pub exit_sheet: Option<String>,

    /// (default 10) Only the first columns of each worksheet are read.
    #[clap(long, value_parser)]
    pub max_columns: Option<usize>,

    /// (file path, 'stdout' or empty) If specified, the report will be written in JSON format
    /// to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) If specified, the report table will be written in CSV format.
    #[clap(long, value_parser)]
    pub csv_out: Option<String>,

    /// (file path) If specified, the report table will be written as an Excel worksheet.
    #[clap(long, value_parser)]
    pub xlsx_out: Option<String>,

    /// (file path) A reference file containing a report in JSON format. If provided,
    /// exitreport will check that the computed report matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
