use std::path::Path;

use survey_scores::Cell;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

// The spellings of a missing value produced by common spreadsheet exports.
const NA_TOKENS: [&str; 12] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

pub fn is_na_token(s: &str) -> bool {
    NA_TOKENS.contains(&s.trim())
}

/// Reads a textual cell. Missing-value tokens become `Cell::Missing`, anything else is kept
/// as text; numeric interpretation happens later.
pub fn text_cell(s: &str) -> Cell {
    if is_na_token(s) {
        Cell::Missing
    } else {
        Cell::Text(s.to_string())
    }
}

/// Names the columns of a header. Blank names are replaced by `Unnamed: <index>`.
pub fn header_names(header: &[Option<String>]) -> Vec<String> {
    header
        .iter()
        .enumerate()
        .map(|(idx, name)| match name {
            Some(s) if !s.trim().is_empty() => s.clone(),
            _ => format!("Unnamed: {}", idx),
        })
        .collect()
}
