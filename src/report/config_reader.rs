use crate::args::Args;
use crate::report::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub year: Option<i32>,
    pub event: Option<String>,
    pub unit: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// "xlsx" or "csv"
    pub format: Option<String>,
    #[serde(rename = "rootDirectory")]
    pub root_directory: Option<String>,
    #[serde(rename = "dataPath")]
    pub data_path: Option<String>,
    #[serde(rename = "archivePath")]
    pub archive_path: Option<String>,
    #[serde(rename = "archiveBreakdownPath")]
    pub archive_breakdown_path: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "summarySheet")]
    pub summary_sheet: Option<String>,
    #[serde(rename = "breakdownSheet")]
    pub breakdown_sheet: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnsConfig {
    pub breakdowns: Option<Vec<String>>,
    pub respondent: Option<String>,
    pub sentiment: Option<String>,
    pub reason: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "referencePath")]
    pub reference_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub selection: Option<SelectionConfig>,
    #[serde(default)]
    pub source: SourceConfig,
    pub columns: Option<ColumnsConfig>,
    pub lookback: Option<usize>,
    /// The known events. When provided, the selection must be one of them.
    pub events: Option<Vec<String>>,
    /// The known units (venues). When provided, the selection must be one of them.
    pub units: Option<Vec<String>>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
}

pub fn read_config(path: &str) -> ReportResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(ReadingFileSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputFormat {
    Xlsx,
    Csv,
}

impl InputFormat {
    fn parse(s: &str) -> ReportResult<InputFormat> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(InputFormat::Xlsx),
            "csv" => Ok(InputFormat::Csv),
            x => whatever!("Unknown input type {:?}: expected xlsx or csv", x),
        }
    }

    fn infer(path: &str) -> InputFormat {
        if path.to_lowercase().ends_with(".csv") {
            InputFormat::Csv
        } else {
            InputFormat::Xlsx
        }
    }
}

/// The fully resolved settings of one report.
#[derive(PartialEq, Debug, Clone)]
pub struct ReportSettings {
    pub selection: Selection,
    pub lookback: usize,
    pub input_format: InputFormat,
    pub root_directory: PathBuf,
    pub data_path: String,
    pub archive_path: Option<String>,
    pub archive_breakdown_path: Option<String>,
    pub worksheet_name: Option<String>,
    pub summary_sheet: String,
    pub breakdown_sheet: String,
    pub breakdown_columns: Vec<String>,
    pub respondent_column: Option<String>,
    pub sentiment_column: String,
    pub reason_column: String,
    pub out: Option<String>,
    pub reference: Option<String>,
}

pub const DEFAULT_BREAKDOWNS: [&str; 3] = ["Domisili", "Usia", "Companions"];
pub const DEFAULT_RESPONDENT_COLUMN: &str = "Domisili";
pub const DEFAULT_SENTIMENT_COLUMN: &str = "Sentiment";
pub const DEFAULT_REASON_COLUMN: &str = "Alasan";
pub const DEFAULT_SUMMARY_SHEET: &str = "Sheet1";
pub const DEFAULT_BREAKDOWN_SHEET: &str = "Sheet2";

// Layout of a root directory when no explicit path is given.
const DEFAULT_XLSX_DATA_PATH: &str = "data/{year}/{event}.xlsx";
const DEFAULT_CSV_DATA_PATH: &str = "data/{year}/{event}/{unit}.csv";
const DEFAULT_XLSX_ARCHIVE_PATH: &str = "archive.xlsx";

/// Paths given on the command line are relative to the working directory,
/// while the ones of the config file are relative to the root directory.
fn from_working_dir(path: &str, has_config: bool) -> ReportResult<String> {
    let p = Path::new(path);
    if !has_config || p.is_absolute() {
        return Ok(path.to_string());
    }
    let cwd = std::env::current_dir().context(ReadingFileSnafu { path: "." })?;
    Ok(cwd.join(p).display().to_string())
}

/// Merges the config file and the command line arguments.
/// The command line arguments take precedence.
pub fn resolve_settings(
    args: &Args,
    config: Option<DashboardConfig>,
    config_dir: Option<&Path>,
) -> ReportResult<ReportSettings> {
    let has_config = config.is_some();
    let config = config.unwrap_or_default();
    let sel_config = config.selection.clone().unwrap_or_default();

    let year = args
        .year
        .or(sel_config.year)
        .context(MissingSelectionSnafu { field: "year" })?;
    let event = args
        .event
        .clone()
        .or(sel_config.event)
        .context(MissingSelectionSnafu { field: "event" })?;
    let unit = args
        .unit
        .clone()
        .or(sel_config.unit)
        .context(MissingSelectionSnafu { field: "unit" })?;

    if let Some(events) = config.events.as_ref() {
        ensure!(
            events.is_empty() || events.contains(&event),
            InvalidSelectionSnafu {
                field: "event",
                value: event.clone()
            }
        );
    }
    if let Some(units) = config.units.as_ref() {
        ensure!(
            units.is_empty() || units.contains(&unit),
            InvalidSelectionSnafu {
                field: "unit",
                value: unit.clone()
            }
        );
    }

    let base_dir: PathBuf = config_dir.map(|p| p.to_path_buf()).unwrap_or_default();
    let root_directory = match config.source.root_directory.as_ref() {
        Some(r) => base_dir.join(r),
        None => base_dir,
    };

    let explicit_format = match args.input_type.as_ref().or(config.source.format.as_ref()) {
        Some(s) => Some(InputFormat::parse(s)?),
        None => None,
    };

    let data_path = match (args.input.as_ref(), config.source.data_path.as_ref()) {
        (Some(p), _) => from_working_dir(p, has_config)?,
        (None, Some(p)) => p.clone(),
        (None, None) if config.source.root_directory.is_some() => {
            match explicit_format {
                Some(InputFormat::Csv) => DEFAULT_CSV_DATA_PATH.to_string(),
                _ => DEFAULT_XLSX_DATA_PATH.to_string(),
            }
        }
        (None, None) => {
            return MissingSourceSnafu { file_type: "data" }.fail();
        }
    };
    let input_format = explicit_format.unwrap_or_else(|| InputFormat::infer(&data_path));

    let archive_path = match (args.archive.as_ref(), config.source.archive_path.as_ref()) {
        (Some(p), _) => Some(from_working_dir(p, has_config)?),
        (None, Some(p)) => Some(p.clone()),
        (None, None)
            if config.source.root_directory.is_some() && input_format == InputFormat::Xlsx =>
        {
            Some(DEFAULT_XLSX_ARCHIVE_PATH.to_string())
        }
        (None, None) => None,
    };
    let archive_breakdown_path = match (
        args.archive_breakdown.as_ref(),
        config.source.archive_breakdown_path.as_ref(),
    ) {
        (Some(p), _) => Some(from_working_dir(p, has_config)?),
        (None, p) => p.cloned(),
    };

    let columns = config.columns.clone().unwrap_or_default();
    let breakdown_columns: Vec<String> = match (args.breakdown.as_ref(), columns.breakdowns) {
        (Some(b), _) => b.clone(),
        (None, Some(b)) => b,
        (None, None) => DEFAULT_BREAKDOWNS.iter().map(|s| s.to_string()).collect(),
    };

    let output_settings = config.output_settings.clone().unwrap_or_default();
    let out = match (args.out.as_ref(), output_settings.output_path) {
        (Some(p), _) => Some(p.clone()),
        (None, Some(p)) => Some(root_directory.join(p).display().to_string()),
        (None, None) => None,
    };
    let reference = match (args.reference.as_ref(), output_settings.reference_path) {
        (Some(p), _) => Some(p.clone()),
        (None, Some(p)) => Some(root_directory.join(p).display().to_string()),
        (None, None) => None,
    };

    let settings = ReportSettings {
        selection: Selection { year, event, unit },
        lookback: args
            .lookback
            .or(config.lookback)
            .unwrap_or(DEFAULT_LOOKBACK),
        input_format,
        root_directory,
        data_path,
        archive_path,
        archive_breakdown_path,
        worksheet_name: args
            .excel_worksheet_name
            .clone()
            .or(config.source.excel_worksheet_name),
        summary_sheet: config
            .source
            .summary_sheet
            .unwrap_or_else(|| DEFAULT_SUMMARY_SHEET.to_string()),
        breakdown_sheet: config
            .source
            .breakdown_sheet
            .unwrap_or_else(|| DEFAULT_BREAKDOWN_SHEET.to_string()),
        breakdown_columns,
        respondent_column: Some(
            columns
                .respondent
                .unwrap_or_else(|| DEFAULT_RESPONDENT_COLUMN.to_string()),
        ),
        sentiment_column: columns
            .sentiment
            .unwrap_or_else(|| DEFAULT_SENTIMENT_COLUMN.to_string()),
        reason_column: columns
            .reason
            .unwrap_or_else(|| DEFAULT_REASON_COLUMN.to_string()),
        out,
        reference,
    };
    info!("resolve_settings: {:?}", settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(xs: &[&str]) -> Args {
        let mut all = vec!["surveydash"];
        all.extend_from_slice(xs);
        Args::parse_from(all)
    }

    #[test]
    fn command_line_only() {
        let a = args(&[
            "-i", "lebaran.xlsx", "-y", "2025", "-e", "Lebaran", "-u", "Dufan",
        ]);
        let s = resolve_settings(&a, None, None).unwrap();
        assert_eq!(s.selection.year, 2025);
        assert_eq!(s.data_path, "lebaran.xlsx");
        assert_eq!(s.input_format, InputFormat::Xlsx);
        assert_eq!(s.lookback, DEFAULT_LOOKBACK);
        assert_eq!(s.archive_path, None);
        assert_eq!(s.breakdown_columns.len(), 3);
        assert_eq!(s.summary_sheet, "Sheet1");
    }

    #[test]
    fn csv_format_is_inferred() {
        let a = args(&["-i", "dufan.csv", "-y", "2025", "-e", "Lebaran", "-u", "Dufan"]);
        let s = resolve_settings(&a, None, None).unwrap();
        assert_eq!(s.input_format, InputFormat::Csv);
    }

    #[test]
    fn missing_selection_is_reported() {
        let a = args(&["-i", "lebaran.xlsx", "-y", "2025", "-e", "Lebaran"]);
        let err = resolve_settings(&a, None, None).unwrap_err();
        assert!(matches!(err, ReportError::MissingSelection { .. }));
    }

    #[test]
    fn missing_data_source_is_reported() {
        let a = args(&["-y", "2025", "-e", "Lebaran", "-u", "Dufan"]);
        let err = resolve_settings(&a, None, None).unwrap_err();
        assert!(matches!(err, ReportError::MissingSource { .. }));
    }

    #[test]
    fn config_values_are_overridden_by_arguments() {
        let config = DashboardConfig {
            selection: Some(SelectionConfig {
                year: Some(2024),
                event: Some("Nataru".to_string()),
                unit: Some("Ancol".to_string()),
            }),
            source: SourceConfig {
                root_directory: Some("surveys".to_string()),
                ..SourceConfig::default()
            },
            lookback: Some(2),
            units: Some(vec!["Ancol".to_string(), "Dufan".to_string()]),
            ..DashboardConfig::default()
        };
        let a = args(&["-u", "Dufan", "--lookback", "3"]);
        let s = resolve_settings(&a, Some(config), Some(Path::new("/srv"))).unwrap();
        assert_eq!(s.selection.year, 2024);
        assert_eq!(s.selection.unit, "Dufan");
        assert_eq!(s.lookback, 3);
        assert_eq!(s.root_directory, PathBuf::from("/srv/surveys"));
        assert_eq!(s.data_path, "data/{year}/{event}.xlsx");
        assert_eq!(s.archive_path, Some("archive.xlsx".to_string()));
    }

    #[test]
    fn unknown_units_are_rejected() {
        let config = DashboardConfig {
            units: Some(vec!["Ancol".to_string()]),
            ..DashboardConfig::default()
        };
        let a = args(&["-i", "x.xlsx", "-y", "2025", "-e", "Lebaran", "-u", "Dufan"]);
        let err = resolve_settings(&a, Some(config), None).unwrap_err();
        assert!(matches!(err, ReportError::InvalidSelection { .. }));
    }

    #[test]
    fn unknown_input_type_is_rejected() {
        let a = args(&[
            "-i", "x.xlsx", "-y", "2025", "-e", "Lebaran", "-u", "Dufan", "--input-type", "ods",
        ]);
        assert!(resolve_settings(&a, None, None).is_err());
    }

    #[test]
    fn parses_the_config_file() {
        let js = r#"{
            "selection": {"year": 2025, "event": "Lebaran", "unit": "Dufan"},
            "source": {"format": "csv", "dataPath": "{year}/{event}/{unit}.csv"},
            "columns": {"breakdowns": ["Usia"], "reason": "Reason"},
            "outputSettings": {"outputPath": "report.json"}
        }"#;
        let config: DashboardConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.source.format, Some("csv".to_string()));
        let s = resolve_settings(&args(&[]), Some(config), Some(Path::new("conf"))).unwrap();
        assert_eq!(s.input_format, InputFormat::Csv);
        assert_eq!(s.breakdown_columns, vec!["Usia".to_string()]);
        assert_eq!(s.reason_column, "Reason");
        assert_eq!(s.out, Some("conf/report.json".to_string()));
    }
}
