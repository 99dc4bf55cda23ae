//! Distributions of categorical columns, sentiment counts and free-text
//! reasons.

use std::collections::HashMap;

use log::{debug, warn};

use crate::config::*;
use crate::round_to;

pub const POSITIVE: &str = "Positive";
pub const NEUTRAL: &str = "Neutral";
pub const NEGATIVE: &str = "Negative";

/// Counts each distinct value of a column, missing values included.
///
/// Percentages are relative to the whole column and rounded to 2 decimals.
/// Entries are sorted by decreasing count; ties keep the order in which the
/// values first appear. An absent column gives an empty table.
///
/// Values are grouped by their label, so a numeric `5` and a textual `"5"`
/// fall in the same entry.
pub fn summarize(table: &Table, column: &str) -> DistributionTable {
    let col = match table.column(column) {
        Some(c) => c,
        None => {
            debug!("summarize: column {:?} not present", column);
            return DistributionTable {
                column: column.to_string(),
                total: 0,
                entries: Vec::new(),
            };
        }
    };

    // Insertion order of the distinct values, and their counts.
    let mut order: Vec<Option<String>> = Vec::new();
    let mut counts: HashMap<Option<String>, usize> = HashMap::new();
    for cell in col.values.iter() {
        let key = cell.as_label();
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    let total = col.values.len();
    let mut entries: Vec<DistributionEntry> = order
        .into_iter()
        .map(|value| {
            let count = counts.get(&value).cloned().unwrap_or(0);
            DistributionEntry {
                missing: value.is_none(),
                value,
                count,
                percentage: round_to(count as f64 / total as f64 * 100.0, 2),
            }
        })
        .collect();
    // Stable sort: ties stay in first-appearance order.
    entries.sort_by(|a, b| b.count.cmp(&a.count));

    debug!(
        "summarize: column {:?}: {} distinct values over {} rows",
        column,
        entries.len(),
        total
    );
    DistributionTable {
        column: column.to_string(),
        total,
        entries,
    }
}

/// Counts the positive, neutral and negative sentiments.
///
/// The shares are relative to every recorded sentiment, so that labels
/// outside of the three standard ones lower the shares without being
/// reported.
pub fn sentiment_tally(table: &Table, column: &str) -> SentimentTally {
    let labels: Vec<String> = table
        .column(column)
        .map(|c| c.values.iter().filter_map(|v| v.as_label()).collect())
        .unwrap_or_default();
    let total = labels.len();
    let share = |label: &str| {
        let count = labels.iter().filter(|l| l.as_str() == label).count();
        SentimentShare {
            label: label.to_string(),
            count,
            share: if total == 0 {
                None
            } else {
                Some(count as f64 / total as f64)
            },
        }
    };
    let tally = SentimentTally {
        total,
        positive: share(POSITIVE),
        neutral: share(NEUTRAL),
        negative: share(NEGATIVE),
    };
    let others = total - tally.positive.count - tally.neutral.count - tally.negative.count;
    if others > 0 {
        debug!(
            "sentiment_tally: {} values with a non-standard label in {:?}",
            others, column
        );
    }
    tally
}

/// The free-text reasons, in row order, missing entries dropped.
/// Returns `None` when the column does not exist.
pub fn reasons(table: &Table, column: &str) -> Option<Vec<String>> {
    match table.column(column) {
        Some(c) => Some(c.values.iter().filter_map(|v| v.as_label()).collect()),
        None => {
            warn!("reasons: column {:?} not found in the data", column);
            None
        }
    }
}

/// Number of respondents: the non-missing values of `column` when it is
/// given and present, otherwise the number of rows.
pub fn respondent_count(table: &Table, column: Option<&str>) -> usize {
    match column.and_then(|name| table.column(name)) {
        Some(c) => c.values.iter().filter(|v| !v.is_missing()).count(),
        None => table.num_rows(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TableBuilder;

    fn texts(name: &str, xs: &[Option<&str>]) -> Table {
        TableBuilder::single_column(name, xs.iter().map(|x| Cell::from(*x)).collect())
    }

    #[test]
    fn numbers_and_texts_with_the_same_label_are_grouped() {
        let t = TableBuilder::single_column(
            "Usia",
            vec![Cell::from(5.0), Cell::from("5"), Cell::from(" 5"), Cell::Missing],
        );
        let d = summarize(&t, "Usia");
        assert_eq!(d.entries.len(), 3);
        assert_eq!(d.entries[0].value, Some("5".to_string()));
        assert_eq!(d.entries[0].count, 2);
        assert_eq!(d.entries[1].value, Some(" 5".to_string()));
    }

    #[test]
    fn counts_missing_values_as_a_bucket() {
        let t = texts(
            "Usia",
            &[Some("18-24"), None, Some("25-34"), Some("18-24"), None, Some("18-24")],
        );
        let d = summarize(&t, "Usia");
        assert_eq!(d.total, 6);
        assert_eq!(d.entries.len(), 3);
        assert_eq!(d.entries[0].value, Some("18-24".to_string()));
        assert_eq!(d.entries[0].count, 3);
        assert_eq!(d.entries[0].percentage, 50.0);
        assert!(d.entries[1].missing);
        assert_eq!(d.entries[1].count, 2);
        assert_eq!(d.entries[1].percentage, 33.33);
        assert_eq!(d.entries[2].percentage, 16.67);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let values: Vec<Option<&str>> = (0..37)
            .map(|i| match i % 7 {
                0 => None,
                1 | 2 => Some("Jakarta"),
                3 => Some("Bogor"),
                4 => Some("Depok"),
                5 => Some("Tangerang"),
                _ => Some("Bekasi"),
            })
            .collect();
        let d = summarize(&texts("Domisili", &values), "Domisili");
        let sum: f64 = d.entries.iter().map(|e| e.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.1);
        let count: usize = d.entries.iter().map(|e| e.count).sum();
        assert_eq!(count, 37);
    }

    #[test]
    fn numeric_categories_use_whole_labels() {
        let t = TableBuilder::single_column("CSI", vec![Cell::from(5.0), Cell::from(5.0)]);
        let d = summarize(&t, "CSI");
        assert_eq!(d.entries[0].value, Some("5".to_string()));
    }

    #[test]
    fn absent_column_gives_an_empty_distribution() {
        let d = summarize(&Table::default(), "Companions");
        assert_eq!(d.total, 0);
        assert!(d.entries.is_empty());
    }

    #[test]
    fn sentiment_shares_include_other_labels_in_the_total() {
        let t = texts(
            "Sentiment",
            &[
                Some("Positive"),
                Some("Positive"),
                Some("Negative"),
                Some("Mixed"),
                None,
            ],
        );
        let s = sentiment_tally(&t, "Sentiment");
        assert_eq!(s.total, 4);
        assert_eq!(s.positive.count, 2);
        assert_eq!(s.positive.share, Some(0.5));
        assert_eq!(s.neutral.count, 0);
        assert_eq!(s.neutral.share, Some(0.0));
        assert_eq!(s.negative.share, Some(0.25));
    }

    #[test]
    fn sentiment_without_data_has_no_share() {
        let s = sentiment_tally(&Table::default(), "Sentiment");
        assert_eq!(s.total, 0);
        assert_eq!(s.positive.share, None);
    }

    #[test]
    fn reasons_skip_missing_entries() {
        let t = texts("Alasan", &[Some("Antrian panjang"), None, Some("Bersih")]);
        assert_eq!(
            reasons(&t, "Alasan"),
            Some(vec!["Antrian panjang".to_string(), "Bersih".to_string()])
        );
        assert_eq!(reasons(&t, "Reason"), None);
    }

    #[test]
    fn respondents_follow_the_designated_column() {
        let t = texts("Domisili", &[Some("Jakarta"), None, Some("Bogor")]);
        assert_eq!(respondent_count(&t, Some("Domisili")), 2);
        assert_eq!(respondent_count(&t, Some("Usia")), 3);
        assert_eq!(respondent_count(&t, None), 3);
    }
}
