// ********* Input data structures ***********

use serde::Serialize;

/// A single value of a survey table.
///
/// Spreadsheet readers map empty cells, error cells and blank strings to
/// `Missing`. Everything else is kept as read, and numeric interpretation is
/// deferred to [`Cell::as_number`].
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Numeric coercion. Unparsable text and non-finite numbers become `None`,
    /// so that they are dropped before any aggregation.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(x) if x.is_finite() => Some(*x),
            Cell::Number(_) => None,
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
            Cell::Missing => None,
        }
    }

    /// The label of this cell when it is used as a category.
    /// Whole numbers are rendered without a decimal part (`5`, not `5.0`).
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Number(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 => {
                Some(format!("{}", *x as i64))
            }
            Cell::Number(x) => Some(x.to_string()),
            Cell::Text(s) => Some(s.clone()),
            Cell::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Cell {
        Cell::Number(x)
    }
}

impl From<i64> for Cell {
    fn from(x: i64) -> Cell {
        Cell::Number(x as f64)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }
}

impl<T> From<Option<T>> for Cell
where
    T: Into<Cell>,
{
    fn from(x: Option<T>) -> Cell {
        x.map(|v| v.into()).unwrap_or(Cell::Missing)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

impl Column {
    /// The values that survive numeric coercion, in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(|c| c.as_number()).collect()
    }
}

/// A column-oriented table that keeps the row order of its source.
///
/// Invariant: all the columns have the same number of values.
/// Both the survey responses of one venue and the historical archives are
/// represented with this structure. Use [`crate::builder::TableBuilder`] to
/// assemble one row by row.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub(crate) columns: Vec<Column>,
    pub(crate) num_rows: usize,
}

impl Table {
    /// A table with the given columns and no rows.
    pub fn empty(column_names: &[String]) -> Table {
        Table {
            columns: column_names
                .iter()
                .map(|name| Column {
                    name: name.clone(),
                    values: Vec::new(),
                })
                .collect(),
            num_rows: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Looks up a column by its exact name. The first column wins if the
    /// header contains duplicates.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn cell(&self, column: &str, row: usize) -> Option<&Cell> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    /// Copies the rows in `range` into a new table with the same columns.
    pub fn slice_rows(&self, range: std::ops::RangeInclusive<usize>) -> Table {
        let start = *range.start();
        let end = (*range.end()).min(self.num_rows.saturating_sub(1));
        if self.num_rows == 0 || start > end {
            return Table::empty(&self.column_names());
        }
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values[start..=end].to_vec(),
                })
                .collect(),
            num_rows: end - start + 1,
        }
    }
}

/// The year, event and venue currently being presented.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize)]
pub struct Selection {
    pub year: i32,
    pub event: String,
    pub unit: String,
}

// ******** Output data structures *********

/// The headline indices of a response table.
///
/// Every field is a percentage rounded to one decimal, or `None` when the
/// source column is absent or has no usable value.
#[derive(PartialEq, Debug, Clone, Default, Serialize)]
pub struct MetricResult {
    #[serde(rename = "CSI Score (%)")]
    pub csi: Option<f64>,
    #[serde(rename = "CLI Score (%)")]
    pub cli: Option<f64>,
    #[serde(rename = "CES Score (%)")]
    pub ces: Option<f64>,
    #[serde(rename = "NPS Score (%)")]
    pub nps: Option<f64>,
    #[serde(rename = "Detractor (%)")]
    pub detractor: Option<f64>,
    #[serde(rename = "Passive (%)")]
    pub passive: Option<f64>,
    #[serde(rename = "Promoter (%)")]
    pub promoter: Option<f64>,
}

/// Differences between the current scores and the archived scores of the
/// previous year.
#[derive(PartialEq, Debug, Clone, Default, Serialize)]
pub struct ScoreDeltas {
    #[serde(rename = "CSI")]
    pub csi: Option<f64>,
    #[serde(rename = "CLI")]
    pub cli: Option<f64>,
    #[serde(rename = "NPS")]
    pub nps: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct DistributionEntry {
    /// `None` for the bucket of missing values.
    pub value: Option<String>,
    pub missing: bool,
    pub count: usize,
    /// Share of the whole column, missing values included, 2 decimals.
    pub percentage: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct DistributionTable {
    pub column: String,
    pub total: usize,
    pub entries: Vec<DistributionEntry>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct SentimentShare {
    pub label: String,
    pub count: usize,
    /// Fraction in [0, 1], absent when no sentiment was recorded.
    pub share: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct SentimentTally {
    /// Number of non-missing sentiment values, labels outside of the
    /// standard three included.
    pub total: usize,
    pub positive: SentimentShare,
    pub neutral: SentimentShare,
    pub negative: SentimentShare,
}

/// One point of a trend chart, taken from an archive row.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct TrendPoint {
    /// `"<Event> <Tahun>"`
    pub label: String,
    pub year: Option<i32>,
    pub event: Option<String>,
    pub values: Vec<(String, Option<f64>)>,
}

impl TrendPoint {
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == metric)
            .and_then(|(_, v)| *v)
    }
}

// ********* Configuration **********

/// The names of the columns read by the score engine.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoreColumns {
    pub csi: String,
    pub cli: String,
    pub ces: String,
    pub nps: String,
}

impl ScoreColumns {
    pub const DEFAULT_CSI: &'static str = "CSI";
    pub const DEFAULT_CLI: &'static str = "CLI";
    pub const DEFAULT_CES: &'static str = "CES";
    pub const DEFAULT_NPS: &'static str = "NPS";
}

impl Default for ScoreColumns {
    fn default() -> Self {
        ScoreColumns {
            csi: ScoreColumns::DEFAULT_CSI.to_string(),
            cli: ScoreColumns::DEFAULT_CLI.to_string(),
            ces: ScoreColumns::DEFAULT_CES.to_string(),
            nps: ScoreColumns::DEFAULT_NPS.to_string(),
        }
    }
}

/// The key columns of an archive table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ArchiveKeys {
    pub year: String,
    pub event: String,
    pub unit: String,
}

impl Default for ArchiveKeys {
    fn default() -> Self {
        ArchiveKeys {
            year: "Tahun".to_string(),
            event: "Event".to_string(),
            unit: "Unit".to_string(),
        }
    }
}

/// Number of archive rows shown before the selected one in a trend.
pub const DEFAULT_LOOKBACK: usize = 4;
