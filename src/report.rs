use log::{debug, info, warn};

use survey_scores::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod config_reader;
pub mod fetch;
mod io_common;
mod io_csv;
mod io_excel;

use crate::report::config_reader::*;
use crate::report::fetch::*;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {sheet:?} not found in {path} (available: {available:?})"))]
    MissingSheet {
        sheet: String,
        path: String,
        available: Vec<String>,
    },
    #[snafu(display("Error reading file {path}"))]
    ReadingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error reading CSV data in {path}"))]
    CsvParse { source: csv::Error, path: String },
    #[snafu(display("The {field} must be selected"))]
    MissingSelection { field: String },
    #[snafu(display("{value:?} is not a valid {field}"))]
    InvalidSelection { field: String, value: String },
    #[snafu(display("No location configured for the {file_type} file"))]
    MissingSource { file_type: String },
    #[snafu(display("No data for year {year}, event {event:?} and unit {unit:?}"))]
    NoDataForSelection {
        year: i32,
        event: String,
        unit: String,
    },
    #[snafu(display("Error writing the report to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between the computed report and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// The historical tables. Both may be empty when no archive is available.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Archive {
    /// Tahun, Event, Unit, CSI, CLI, NPS
    pub summary: Table,
    /// Tahun, Event, Unit, Detractor, Passive, Promoter, NPS
    pub breakdown: Table,
}

/// Everything displayed for one selection.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub selection: Selection,
    #[serde(rename = "totalRespondents")]
    pub total_respondents: usize,
    pub scores: MetricResult,
    #[serde(rename = "previousYearDeltas")]
    pub deltas: ScoreDeltas,
    pub breakdowns: Vec<DistributionTable>,
    #[serde(rename = "scoreTrend")]
    pub score_trend: Vec<TrendPoint>,
    #[serde(rename = "npsTrend")]
    pub nps_trend: Vec<TrendPoint>,
    pub sentiment: SentimentTally,
    pub reasons: Option<Vec<String>>,
}

const SCORE_TREND_METRICS: [&str; 3] = ["CSI", "CLI", "NPS"];
const NPS_TREND_METRICS: [&str; 4] = ["Detractor", "Passive", "Promoter", "NPS"];

fn metric_names(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Assembles the report of a selection. The responses must be the ones of
/// the selection.
pub fn build_report(
    responses: &Table,
    archive: &Archive,
    settings: &ReportSettings,
) -> DashboardReport {
    let selection = &settings.selection;
    let scores = compute_scores(responses);
    let deltas = compare_with_previous(&scores, &archive.summary, selection);

    let breakdowns: Vec<DistributionTable> = settings
        .breakdown_columns
        .iter()
        .map(|c| summarize(responses, c))
        .collect();

    let summary_window = select_window(&archive.summary, selection, settings.lookback);
    let breakdown_window = select_window(&archive.breakdown, selection, settings.lookback);

    DashboardReport {
        selection: selection.clone(),
        total_respondents: respondent_count(responses, settings.respondent_column.as_deref()),
        scores,
        deltas,
        breakdowns,
        score_trend: trend_series(&summary_window, &metric_names(&SCORE_TREND_METRICS)),
        nps_trend: trend_series(&breakdown_window, &metric_names(&NPS_TREND_METRICS)),
        sentiment: sentiment_tally(responses, &settings.sentiment_column),
        reasons: reasons(responses, &settings.reason_column),
    }
}

/// Loads the responses of the selected unit.
///
/// Fails with `NoDataForSelection` when the source has no file for the
/// selection, so that nothing gets computed from an absent table.
pub fn load_responses(
    source: &mut dyn WorkbookSource,
    settings: &ReportSettings,
) -> ReportResult<Table> {
    let selection = &settings.selection;
    let fetched = source
        .fetch(&FetchKey::data(selection))?
        .context(NoDataForSelectionSnafu {
            year: selection.year,
            event: selection.event.clone(),
            unit: selection.unit.clone(),
        })?;
    match settings.input_format {
        InputFormat::Xlsx => {
            let sheet = settings
                .worksheet_name
                .clone()
                .unwrap_or_else(|| selection.unit.clone());
            io_excel::read_sheet(&fetched, &sheet)
        }
        InputFormat::Csv => io_csv::read_csv_table(&fetched),
    }
}

/// Loads the archive. A missing archive is not an error: the trends and
/// the deltas are simply empty.
pub fn load_archive(
    source: &mut dyn WorkbookSource,
    settings: &ReportSettings,
) -> ReportResult<Archive> {
    let archive = match settings.input_format {
        InputFormat::Xlsx => match source.fetch(&FetchKey::archive(FileType::Archive))? {
            Some(f) => {
                let sheets = [
                    settings.summary_sheet.as_str(),
                    settings.breakdown_sheet.as_str(),
                ];
                let mut tables = io_excel::read_sheets(&f, &sheets)?.into_iter();
                Archive {
                    summary: tables.next().unwrap_or_default(),
                    breakdown: tables.next().unwrap_or_default(),
                }
            }
            None => Archive::default(),
        },
        InputFormat::Csv => {
            let mut read = |file_type: FileType| -> ReportResult<Table> {
                match source.fetch(&FetchKey::archive(file_type))? {
                    Some(f) => io_csv::read_csv_table(&f),
                    None => Ok(Table::default()),
                }
            };
            Archive {
                summary: read(FileType::Archive)?,
                breakdown: read(FileType::ArchiveBreakdown)?,
            }
        }
    };
    if archive.summary.is_empty() {
        warn!("load_archive: no archived scores, trends and deltas will be empty");
    }
    Ok(archive)
}

fn build_summary_js(settings: &ReportSettings, report: &DashboardReport) -> ReportResult<JSValue> {
    let results = serde_json::to_value(report).context(ParsingJsonSnafu {})?;
    Ok(json!({
        "config": {
            "lookback": settings.lookback,
            "breakdownColumns": settings.breakdown_columns,
        },
        "results": results
    }))
}

/// Computes the report of the selection and returns it in JSON format.
pub fn run_report_with(
    source: &mut dyn WorkbookSource,
    settings: &ReportSettings,
) -> ReportResult<JSValue> {
    let responses = load_responses(source, settings)?;
    info!(
        "run_report: {} responses for {:?}",
        responses.num_rows(),
        settings.selection
    );
    let archive = load_archive(source, settings)?;
    let report = build_report(&responses, &archive, settings);
    debug!("run_report: report: {:?}", report);
    build_summary_js(settings, &report)
}

fn write_output(js: &JSValue, out: &Option<String>) -> ReportResult<String> {
    let pretty = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {})?;
    match out.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty);
        }
        Some("") => {}
        Some(path) => {
            info!("Writing the report to {:?}", path);
            fs::write(path, pretty.as_bytes()).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(pretty)
}

pub fn read_reference(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(ReadingFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Checks a computed report against a reference, printing the differences.
pub fn check_reference(js: &JSValue, reference_path: &str) -> ReportResult<()> {
    let reference = read_reference(reference_path)?;
    let pretty_js = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {})?;
    let pretty_ref = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    if pretty_ref != pretty_js {
        warn!("Found differences with the reference report");
        print_diff(pretty_ref.as_str(), pretty_js.as_str(), "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("The report matches the reference {:?}", reference_path);
    Ok(())
}

pub fn run_report(settings: &ReportSettings) -> ReportResult<()> {
    let mut source = CachedSource::new(DirectorySource::from_settings(settings));
    let js = run_report_with(&mut source, settings)?;
    write_output(&js, &settings.out)?;
    if let Some(reference) = settings.reference.as_ref() {
        check_reference(&js, reference)?;
    }
    Ok(())
}

/// Entry point of the command line program.
pub fn run(args: &Args) -> ReportResult<()> {
    let (config, config_dir) = match args.config.as_ref() {
        Some(p) => {
            info!("Reading config {:?}", p);
            let dir = Path::new(p).parent().map(|d| d.to_path_buf());
            (Some(read_config(p)?), dir)
        }
        None => (None, None),
    };
    let settings = resolve_settings(args, config, config_dir.as_deref())?;
    run_report(&settings)
}
