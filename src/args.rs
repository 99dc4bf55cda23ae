use clap::Parser;

/// This is a satisfaction survey reporting program (CSI, CLI, CES, NPS).
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the data sources, the selection and the report settings.
    /// Relative paths in this file are resolved from its root directory ('rootDirectory', itself relative to the
    /// directory of the file), or from the directory of the file when no root directory is set.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The survey responses of the selected event. It may contain the placeholders {year}, {event}
    /// and {unit}. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv, default inferred from the input file name) The format of the input and archive files.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, optional) The archive of the previous periods. For an Excel archive, both the summary and the
    /// NPS breakdown sheets are read from this file. For a CSV archive, this is the summary table.
    #[clap(short, long, value_parser)]
    pub archive: Option<String>,

    /// (file path, optional) The NPS breakdown table of the archive, when the archive is in CSV format.
    #[clap(long, value_parser)]
    pub archive_breakdown: Option<String>,

    /// (default: the unit name) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// The year of the survey.
    #[clap(short, long, value_parser)]
    pub year: Option<i32>,

    /// The event (season) of the survey, for example 'Lebaran'.
    #[clap(short, long, value_parser)]
    pub event: Option<String>,

    /// The unit (venue) of the survey, for example 'Dufan'.
    #[clap(short, long, value_parser)]
    pub unit: Option<String>,

    /// (default 4) The number of archived periods shown before the selected one in the trends.
    #[clap(long, value_parser)]
    pub lookback: Option<usize>,

    /// (column name, may be repeated) The categorical columns to break down. Defaults to Domisili, Usia and
    /// Companions.
    #[clap(long, value_parser)]
    pub breakdown: Option<Vec<String>>,

    /// (file path, 'stdout' or empty) If specified, the report will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference report in JSON format. If provided, surveydash will check that the computed
    /// report matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
