//! Windows over the historical archive and comparisons with the previous year.
//!
//! The archive is expected in chronological order, as stored by the pipeline
//! producing it. No sorting happens here: the position of a row in the table
//! is what defines "before" and "after".

use log::{debug, info};

use crate::config::*;
use crate::{delta, round_to};

fn matches_key(
    archive: &Table,
    keys: &ArchiveKeys,
    row: usize,
    year: i32,
    event: &str,
    unit: &str,
) -> bool {
    let year_ok = archive
        .cell(&keys.year, row)
        .and_then(|c| c.as_number())
        .map_or(false, |y| y == year as f64);
    let event_ok = archive
        .cell(&keys.event, row)
        .and_then(|c| c.as_label())
        .map_or(false, |e| e == event);
    let unit_ok = archive
        .cell(&keys.unit, row)
        .and_then(|c| c.as_label())
        .map_or(false, |u| u == unit);
    year_ok && event_ok && unit_ok
}

/// The index of the first row matching the year, event and unit.
pub fn find_row(
    archive: &Table,
    keys: &ArchiveKeys,
    year: i32,
    event: &str,
    unit: &str,
) -> Option<usize> {
    (0..archive.num_rows()).find(|row| matches_key(archive, keys, *row, year, event, unit))
}

/// Returns up to `lookback + 1` consecutive rows of the archive, ending with
/// the first row that matches the selection.
///
/// When nothing matches, the result has the columns of the archive and no
/// row.
pub fn select_window(archive: &Table, selection: &Selection, lookback: usize) -> Table {
    select_window_with(archive, &ArchiveKeys::default(), selection, lookback)
}

pub fn select_window_with(
    archive: &Table,
    keys: &ArchiveKeys,
    selection: &Selection,
    lookback: usize,
) -> Table {
    match find_row(archive, keys, selection.year, &selection.event, &selection.unit) {
        Some(idx) => {
            let start = idx.saturating_sub(lookback);
            debug!(
                "select_window: {:?} found at row {}, window {}..={}",
                selection, idx, start, idx
            );
            archive.slice_rows(start..=idx)
        }
        None => {
            info!("select_window: no archive row for {:?}", selection);
            Table::empty(&archive.column_names())
        }
    }
}

/// The first archive row of the same event and unit, exactly one year before
/// the selection. There is no fallback to other years.
pub fn previous_period(archive: &Table, selection: &Selection) -> Option<usize> {
    find_row(
        archive,
        &ArchiveKeys::default(),
        selection.year - 1,
        &selection.event,
        &selection.unit,
    )
}

/// Compares the current scores with the archived `CSI`, `CLI` and `NPS`
/// values of the previous year. Differences are rounded to 2 decimals.
pub fn compare_with_previous(
    current: &MetricResult,
    archive: &Table,
    selection: &Selection,
) -> ScoreDeltas {
    let row = match previous_period(archive, selection) {
        Some(r) => r,
        None => {
            info!(
                "compare_with_previous: no archive row for {} {} {}",
                selection.year - 1,
                selection.event,
                selection.unit
            );
            return ScoreDeltas::default();
        }
    };
    let previous = |name: &str| archive.cell(name, row).and_then(|c| c.as_number());
    // Displayed with 2 decimals.
    let rounded = |c: Option<f64>, name: &str| delta(c, previous(name)).map(|d| round_to(d, 2));
    ScoreDeltas {
        csi: rounded(current.csi, "CSI"),
        cli: rounded(current.cli, "CLI"),
        nps: rounded(current.nps, "NPS"),
    }
}

/// Turns an archive window into chart points, one per row, in order.
/// Metric values are coerced to numbers; anything else is absent.
pub fn trend_series(window: &Table, metrics: &[String]) -> Vec<TrendPoint> {
    let keys = ArchiveKeys::default();
    (0..window.num_rows())
        .map(|row| {
            let year = window
                .cell(&keys.year, row)
                .and_then(|c| c.as_number())
                .filter(|y| y.fract() == 0.0)
                .map(|y| y as i32);
            let event = window.cell(&keys.event, row).and_then(|c| c.as_label());
            let label = format!(
                "{} {}",
                event.clone().unwrap_or_default(),
                window
                    .cell(&keys.year, row)
                    .and_then(|c| c.as_label())
                    .unwrap_or_default()
            );
            let values = metrics
                .iter()
                .map(|m| (m.clone(), window.cell(m, row).and_then(|c| c.as_number())))
                .collect();
            TrendPoint {
                label,
                year,
                event,
                values,
            }
        })
        .collect()
}
