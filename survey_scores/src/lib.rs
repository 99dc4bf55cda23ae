mod config;
pub mod builder;
pub mod history;
pub mod manual;
pub mod summary;

use log::{debug, info};

pub use crate::config::*;
pub use crate::history::{compare_with_previous, previous_period, select_window, trend_series};
pub use crate::summary::{reasons, respondent_count, sentiment_tally, summarize};

// **** Private structures ****

// The rating bands, as closed intervals of whole values.
const SATISFIED: (f64, f64) = (4.0, 5.0);
const DETRACTOR: (f64, f64) = (0.0, 6.0);
const PASSIVE: (f64, f64) = (7.0, 8.0);
const PROMOTER: (f64, f64) = (9.0, 10.0);

// The usable values of one rating column.
// Invariant: never empty.
struct Ratings(Vec<f64>);

impl Ratings {
    fn from_table(table: &Table, column: &str) -> Option<Ratings> {
        let col = match table.column(column) {
            Some(c) => c,
            None => {
                debug!("ratings: column {:?} not present", column);
                return None;
            }
        };
        let values = col.numbers();
        debug!(
            "ratings: column {:?}: {} usable values out of {}",
            column,
            values.len(),
            col.values.len()
        );
        if values.is_empty() {
            None
        } else {
            Some(Ratings(values))
        }
    }

    /// Proportion in [0, 1] of the ratings that are whole values of the band.
    fn share_in(&self, band: (f64, f64)) -> f64 {
        let count = self
            .0
            .iter()
            .filter(|v| v.fract() == 0.0 && **v >= band.0 && **v <= band.1)
            .count();
        count as f64 / self.0.len() as f64
    }

    fn mean(&self) -> f64 {
        self.0.iter().sum::<f64>() / self.0.len() as f64
    }
}

/// Rounds half to even at the given number of decimals.
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round_ties_even() / factor
}

/// Computes the headline indices of a response table with the default
/// column names (`CSI`, `CLI`, `CES`, `NPS`).
///
/// Each metric is computed independently: a missing value only removes the
/// response from the denominator of its own metric. A metric whose column is
/// absent or has no usable value is left as `None`.
pub fn compute_scores(table: &Table) -> MetricResult {
    compute_scores_with(table, &ScoreColumns::default())
}

/// Same as [`compute_scores`], with explicit column names.
pub fn compute_scores_with(table: &Table, columns: &ScoreColumns) -> MetricResult {
    info!(
        "compute_scores: processing {} responses, columns: {:?}",
        table.num_rows(),
        columns
    );
    let mut result = MetricResult::default();

    if let Some(csi) = Ratings::from_table(table, &columns.csi) {
        result.csi = Some(round_to(csi.share_in(SATISFIED) * 100.0, 1));
    }

    if let Some(cli) = Ratings::from_table(table, &columns.cli) {
        // Maps the 1..10 scale linearly to 0..100.
        result.cli = Some(round_to((cli.mean() - 1.0) / 9.0 * 100.0, 1));
    }

    if let Some(ces) = Ratings::from_table(table, &columns.ces) {
        result.ces = Some(round_to(ces.share_in(SATISFIED) * 100.0, 1));
    }

    if let Some(nps) = Ratings::from_table(table, &columns.nps) {
        let detractor = nps.share_in(DETRACTOR) * 100.0;
        let passive = nps.share_in(PASSIVE) * 100.0;
        let promoter = nps.share_in(PROMOTER) * 100.0;
        result.detractor = Some(round_to(detractor, 1));
        result.passive = Some(round_to(passive, 1));
        result.promoter = Some(round_to(promoter, 1));
        // The subtraction happens before rounding.
        result.nps = Some(round_to(promoter - detractor, 1));
    }

    debug!("compute_scores: result: {:?}", result);
    result
}

/// The difference `current - previous`, only when both values are present.
pub fn delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(c), Some(p)) if c.is_finite() && p.is_finite() => Some(c - p),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::builder::TableBuilder;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ratings(name: &str, xs: &[Option<f64>]) -> Table {
        TableBuilder::single_column(name, xs.iter().map(|x| Cell::from(*x)).collect())
    }

    fn all(xs: &[f64]) -> Vec<Option<f64>> {
        xs.iter().map(|x| Some(*x)).collect()
    }

    #[test]
    fn csi_counts_four_and_five_as_satisfied() {
        init();
        let t = ratings("CSI", &all(&[5.0, 5.0, 4.0, 3.0, 2.0]));
        let res = compute_scores(&t);
        assert_eq!(res.csi, Some(60.0));
        assert_eq!(res.cli, None);
        assert_eq!(res.nps, None);
    }

    #[test]
    fn nps_bands() {
        init();
        let t = ratings("NPS", &all(&[9.0, 10.0, 7.0, 3.0, 0.0]));
        let res = compute_scores(&t);
        assert_eq!(res.detractor, Some(40.0));
        assert_eq!(res.passive, Some(20.0));
        assert_eq!(res.promoter, Some(40.0));
        assert_eq!(res.nps, Some(0.0));
    }

    #[test]
    fn nps_subtracts_before_rounding() {
        init();
        // 1 promoter, 2 detractors, 3 passives out of 6 responses:
        // promoter 16.666.., detractor 33.333.., difference -16.666.. -> -16.7
        let t = ratings("NPS", &all(&[10.0, 0.0, 6.0, 7.0, 8.0, 7.0]));
        let res = compute_scores(&t);
        assert_eq!(res.promoter, Some(16.7));
        assert_eq!(res.detractor, Some(33.3));
        assert_eq!(res.nps, Some(-16.7));
        let drift = (res.promoter.unwrap() - res.detractor.unwrap() - res.nps.unwrap()).abs();
        assert!(drift <= 0.1 + 1e-9);
    }

    #[test]
    fn cli_rescales_to_percentage() {
        init();
        assert_eq!(compute_scores(&ratings("CLI", &all(&[1.0]))).cli, Some(0.0));
        assert_eq!(compute_scores(&ratings("CLI", &all(&[10.0]))).cli, Some(100.0));
        // mean 8 -> 7/9 -> 77.8
        let t = ratings("CLI", &all(&[7.0, 9.0, 8.0]));
        assert_eq!(compute_scores(&t).cli, Some(77.8));
    }

    #[test]
    fn missing_values_only_affect_their_own_metric() {
        init();
        let mut b = TableBuilder::new(&["CSI".to_string(), "NPS".to_string()]);
        b.add_row(vec![Cell::from(5.0), Cell::from(10.0)]);
        b.add_row(vec![Cell::Missing, Cell::from(0.0)]);
        b.add_row(vec![Cell::from("not a number"), Cell::from(9.0)]);
        b.add_row(vec![Cell::from(" 2 "), Cell::Missing]);
        let res = compute_scores(&b.build());
        // CSI: 5 and 2 are usable.
        assert_eq!(res.csi, Some(50.0));
        // NPS: 10, 0, 9 are usable.
        assert_eq!(res.promoter, Some(66.7));
        assert_eq!(res.detractor, Some(33.3));
        assert_eq!(res.nps, Some(33.3));
    }

    #[test]
    fn empty_columns_are_not_applicable() {
        init();
        let t = ratings("CES", &[None, None]);
        assert_eq!(compute_scores(&t), MetricResult::default());
        assert_eq!(compute_scores(&Table::default()), MetricResult::default());
    }

    #[test]
    fn ces_uses_the_satisfaction_formula() {
        init();
        let t = ratings("CES", &all(&[4.0, 1.0, 4.5, 5.0]));
        // 4.5 is counted in the denominator but is in no band.
        assert_eq!(compute_scores(&t).ces, Some(50.0));
    }

    #[test]
    fn csi_stays_within_bounds() {
        init();
        for n in 1..30 {
            let xs: Vec<Option<f64>> = (0..n).map(|i| Some((i % 5 + 1) as f64)).collect();
            let csi = compute_scores(&ratings("CSI", &xs)).csi.unwrap();
            assert!((0.0..=100.0).contains(&csi));
            let satisfied = xs.iter().filter(|x| x.unwrap() >= 4.0).count();
            assert_eq!(csi, round_to(satisfied as f64 / n as f64 * 100.0, 1));
        }
    }

    #[test]
    fn custom_column_names() {
        init();
        let t = ratings("Kepuasan", &all(&[5.0, 1.0]));
        let cols = ScoreColumns {
            csi: "Kepuasan".to_string(),
            ..ScoreColumns::default()
        };
        assert_eq!(compute_scores_with(&t, &cols).csi, Some(50.0));
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_to(6.25, 1), 6.2);
        assert_eq!(round_to(6.75, 1), 6.8);
        assert_eq!(round_to(33.3333, 2), 33.33);
        assert_eq!(round_to(-16.666, 1), -16.7);
    }

    #[test]
    fn delta_requires_both_operands() {
        assert_eq!(delta(Some(80.0), Some(75.5)), Some(4.5));
        assert_eq!(delta(None, Some(75.5)), None);
        assert_eq!(delta(Some(80.0), None), None);
        assert_eq!(delta(Some(f64::NAN), Some(1.0)), None);
    }
}
