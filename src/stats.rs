use std::cmp::Ordering;

use itertools::Itertools;

use crate::game::RoundResult;
use crate::util::{mean, std_dev};

/// Mean signed error beyond which the session counts as fast/slow (ms).
const TENDENCY_THRESHOLD_MS: f64 = 500.0;
/// Consistency buckets, compared against the std deviation in seconds.
const VERY_CONSISTENT_MAX_SECS: f64 = 1.0;
const CONSISTENT_MAX_SECS: f64 = 2.0;

/// Whether time subjectively runs fast, slow, or about right for the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Tendency {
    #[strum(to_string = "fast")]
    Fast,
    #[strum(to_string = "slow")]
    Slow,
    #[strum(to_string = "accurate")]
    Accurate,
}

impl Tendency {
    pub fn classify(mean_error_ms: f64) -> Self {
        if mean_error_ms < -TENDENCY_THRESHOLD_MS {
            Tendency::Fast
        } else if mean_error_ms > TENDENCY_THRESHOLD_MS {
            Tendency::Slow
        } else {
            Tendency::Accurate
        }
    }
}

/// How stable the estimates are across rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Consistency {
    #[strum(to_string = "very consistent")]
    VeryConsistent,
    #[strum(to_string = "consistent")]
    Consistent,
    #[strum(to_string = "irregular")]
    Irregular,
}

impl Consistency {
    pub fn classify(std_dev_secs: f64) -> Self {
        if std_dev_secs < VERY_CONSISTENT_MAX_SECS {
            Consistency::VeryConsistent
        } else if std_dev_secs < CONSISTENT_MAX_SECS {
            Consistency::Consistent
        } else {
            Consistency::Irregular
        }
    }
}

/// Aggregate statistics over a completed session.
///
/// Derived on demand from the full result sequence; never cached.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub mean_error_ms: f64,
    pub mean_abs_error_ms: f64,
    pub std_dev_ms: f64,
    /// the round with the smallest absolute error; first such round on ties
    pub best: RoundResult,
    /// first-vs-last |error| change; None when the first round was exact
    /// (the quotient would be undefined)
    pub improvement_percent: Option<f64>,
    pub tendency: Tendency,
    pub consistency: Consistency,
}

impl SessionSummary {
    pub fn mean_error_secs(&self) -> f64 {
        self.mean_error_ms / 1000.0
    }

    pub fn mean_abs_error_secs(&self) -> f64 {
        self.mean_abs_error_ms / 1000.0
    }

    pub fn std_dev_secs(&self) -> f64 {
        self.std_dev_ms / 1000.0
    }
}

/// Summarize a non-empty result sequence. Returns None on an empty slice,
/// which callers treat as a precondition violation: the summary is only ever
/// requested once at least one round has been recorded.
pub fn summarize(results: &[RoundResult]) -> Option<SessionSummary> {
    let errors: Vec<f64> = results.iter().map(|r| r.error).collect();
    let abs_errors: Vec<f64> = errors.iter().map(|e| e.abs()).collect();

    let mean_error_ms = mean(&errors)?;
    let mean_abs_error_ms = mean(&abs_errors)?;
    let std_dev_ms = std_dev(&errors)?;

    // position_min_by keeps the first of equal minima, matching the
    // stable fold the report has always used
    let best_idx = results
        .iter()
        .position_min_by(|a, b| cmp_abs_error(a, b))?;
    let best = results[best_idx];

    let first = abs_errors[0];
    let last = abs_errors[abs_errors.len() - 1];
    let improvement_percent = (first != 0.0).then(|| (first - last) / first * 100.0);

    Some(SessionSummary {
        mean_error_ms,
        mean_abs_error_ms,
        std_dev_ms,
        best,
        improvement_percent,
        tendency: Tendency::classify(mean_error_ms),
        consistency: Consistency::classify(std_dev_ms / 1000.0),
    })
}

fn cmp_abs_error(a: &RoundResult, b: &RoundResult) -> Ordering {
    a.error
        .abs()
        .partial_cmp(&b.error.abs())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results_from_errors(errors: &[f64]) -> Vec<RoundResult> {
        errors
            .iter()
            .enumerate()
            .map(|(i, e)| RoundResult::new(i as u32 + 1, 10_000.0, 10_000.0 + e))
            .collect()
    }

    #[test]
    fn summarize_empty_is_none() {
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn worked_example() {
        let results = results_from_errors(&[-200.0, 1_200.0, -1_800.0, 400.0, 100.0]);
        let s = summarize(&results).unwrap();

        assert_eq!(s.mean_error_ms, -60.0);
        assert_eq!(s.mean_abs_error_ms, 740.0);
        assert_eq!(s.best.round, 5);
        assert!((s.std_dev_ms - 974_400.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(s.improvement_percent, Some(50.0));
        assert_eq!(s.tendency, Tendency::Accurate);
        // std dev ~0.987s, just under the very-consistent cutoff
        assert_eq!(s.consistency, Consistency::VeryConsistent);
    }

    #[test]
    fn best_round_ties_go_to_the_first() {
        let results = results_from_errors(&[300.0, -300.0, 300.0]);
        let s = summarize(&results).unwrap();
        assert_eq!(s.best.round, 1);
    }

    #[test]
    fn improvement_undefined_when_first_round_exact() {
        let results = results_from_errors(&[0.0, 500.0]);
        let s = summarize(&results).unwrap();
        assert_eq!(s.improvement_percent, None);
    }

    #[test]
    fn improvement_negative_when_worsening() {
        let results = results_from_errors(&[100.0, 400.0]);
        let s = summarize(&results).unwrap();
        assert_eq!(s.improvement_percent, Some(-300.0));
    }

    #[test]
    fn tendency_thresholds() {
        assert_eq!(Tendency::classify(-501.0), Tendency::Fast);
        assert_eq!(Tendency::classify(-500.0), Tendency::Accurate);
        assert_eq!(Tendency::classify(500.0), Tendency::Accurate);
        assert_eq!(Tendency::classify(501.0), Tendency::Slow);
    }

    #[test]
    fn consistency_thresholds() {
        assert_eq!(Consistency::classify(0.99), Consistency::VeryConsistent);
        assert_eq!(Consistency::classify(1.0), Consistency::Consistent);
        assert_eq!(Consistency::classify(1.99), Consistency::Consistent);
        assert_eq!(Consistency::classify(2.0), Consistency::Irregular);
    }

    #[test]
    fn single_round_summary() {
        let results = results_from_errors(&[250.0]);
        let s = summarize(&results).unwrap();
        assert_eq!(s.mean_error_ms, 250.0);
        assert_eq!(s.std_dev_ms, 0.0);
        assert_eq!(s.best.round, 1);
        assert_eq!(s.improvement_percent, Some(0.0));
        assert_eq!(s.consistency, Consistency::VeryConsistent);
    }

    #[test]
    fn seconds_accessors() {
        let results = results_from_errors(&[-200.0, 1_200.0, -1_800.0, 400.0, 100.0]);
        let s = summarize(&results).unwrap();
        assert!((s.mean_error_secs() - -0.06).abs() < 1e-12);
        assert!((s.mean_abs_error_secs() - 0.74).abs() < 1e-12);
    }

    #[test]
    fn qualitative_labels() {
        assert_eq!(Tendency::Fast.to_string(), "fast");
        assert_eq!(Consistency::VeryConsistent.to_string(), "very consistent");
    }
}
