use crate::game::RoundResult;

/// Compute X (round) and Y (seconds) bounds for the results chart
pub fn compute_chart_params(results: &[RoundResult], target_secs: f64) -> (f64, f64) {
    let mut highest_secs = target_secs;
    for r in results {
        let measured = r.measured_time / 1000.0;
        if measured > highest_secs {
            highest_secs = measured;
        }
    }

    let mut last_round = match results.last() {
        Some(r) => r.round as f64,
        None => 1.0,
    };
    if last_round < 2.0 {
        // a single point still needs a non-degenerate axis
        last_round = 2.0;
    }

    (last_round, (highest_secs * 1.2).ceil())
}

/// (round, measured seconds) points for the estimate line
pub fn measured_points(results: &[RoundResult]) -> Vec<(f64, f64)> {
    results
        .iter()
        .map(|r| (r.round as f64, r.measured_time / 1000.0))
        .collect()
}

/// Endpoints of the horizontal target reference line
pub fn target_points(last_round: f64, target_secs: f64) -> Vec<(f64, f64)> {
    vec![(1.0, target_secs), (last_round, target_secs)]
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
