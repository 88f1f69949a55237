//! Running sums and trailing means over ordered count series.

/// Window length of the rolling averages, in points.
pub const ROLLING_WINDOW: usize = 7;

/// Running prefix sum.
pub fn cumulative(values: &[u64]) -> Vec<u64> {
    let mut total = 0u64;
    values
        .iter()
        .map(|&v| {
            total = total.saturating_add(v);
            total
        })
        .collect()
}

/// Unweighted trailing mean over exactly `window` points.
///
/// Positions with fewer than `window` points available (inclusive) get `None`.
/// The window sum is kept in integers so the result does not depend on
/// floating-point accumulation order.
pub fn trailing_mean(values: &[u64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum: u128 = 0;
    for (i, &v) in values.iter().enumerate() {
        sum += u128::from(v);
        if i >= window {
            sum -= u128::from(values[i - window]);
        }
        if i + 1 >= window {
            out.push(Some(sum as f64 / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cumulative_basic() {
        assert_eq!(cumulative(&[10, 20, 30]), vec![10, 30, 60]);
        assert!(cumulative(&[]).is_empty());
    }

    #[test]
    fn trailing_mean_matches_window_average() {
        let values: Vec<u64> = (0..20).map(|i| (i * 7 + 3) % 11).collect();
        let means = trailing_mean(&values, ROLLING_WINDOW);
        assert_eq!(means.len(), values.len());
        for (i, m) in means.iter().enumerate() {
            if i < 6 {
                assert_eq!(*m, None, "position {i}");
            } else {
                let window = &values[i - 6..=i];
                let expected = window.iter().sum::<u64>() as f64 / 7.0;
                let got = m.unwrap();
                assert!((got - expected).abs() < 1e-12, "position {i}: {got} vs {expected}");
            }
        }
    }

    #[test]
    fn trailing_mean_short_series_has_no_values() {
        assert_eq!(trailing_mean(&[1, 2, 3], ROLLING_WINDOW), vec![None, None, None]);
    }

    #[test]
    fn zero_window_yields_nothing() {
        assert_eq!(trailing_mean(&[1, 2], 0), vec![None, None]);
    }
}
