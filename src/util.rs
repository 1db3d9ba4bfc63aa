pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation (divisor n, not n-1).
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let variance = data.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / data.len() as f64;
    Some(variance.sqrt())
}

/// "9.80s" from milliseconds.
pub fn format_secs(ms: f64) -> String {
    format!("{:.2}s", ms / 1000.0)
}

/// "+1.20s" / "-0.20s" from signed milliseconds.
pub fn format_signed_secs(ms: f64) -> String {
    if ms >= 0.0 {
        format!("+{:.2}s", ms / 1000.0)
    } else {
        format!("-{:.2}s", ms.abs() / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[-10.0, 0.0, 10.0]), Some(0.0));
        assert_eq!(mean(&[42.0]), Some(42.0));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev_is_population() {
        // variance over n, so two symmetric points give exactly their offset
        assert_eq!(std_dev(&[-5.0, 5.0]), Some(5.0));
        assert_eq!(std_dev(&[7.0, 7.0, 7.0]), Some(0.0));
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(
            std_dev(&[100., 120., 90., 102., 94.]),
            Some(10.322790320451151)
        );
    }

    #[test]
    fn test_std_dev_empty_slice() {
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_format_secs() {
        assert_eq!(format_secs(9_800.0), "9.80s");
        assert_eq!(format_secs(10_000.0), "10.00s");
    }

    #[test]
    fn test_format_signed_secs() {
        assert_eq!(format_signed_secs(-200.0), "-0.20s");
        assert_eq!(format_signed_secs(1_200.0), "+1.20s");
        assert_eq!(format_signed_secs(0.0), "+0.00s");
    }
}
