//! Even-stride trajectory sampling.
//!
//! External map matchers cap the number of coordinates per request. The
//! sampler reduces an ordered trail to that budget while always keeping the
//! first and last points so the matched route spans the whole journey.

/// Reduce `points` to at most `budget` entries using a uniform stride.
///
/// Input within budget is returned unchanged. Otherwise the indices
/// `round(i * step)` for `i` in `0..budget` are selected, where
/// `step = (n - 1) / (budget - 1)`. The result is deterministic for a given
/// input. A budget below two keeps only the endpoints the budget allows.
///
/// # Examples
/// ```
/// use backend::domain::sample_trajectory;
///
/// let points: Vec<u32> = (0..10).collect();
/// assert_eq!(sample_trajectory(&points, 4), vec![0, 3, 6, 9]);
/// assert_eq!(sample_trajectory(&points, 20), points);
/// ```
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "indices stay far below 2^52 and the rounded product lies in 0..=last"
)]
pub fn sample_trajectory<T: Clone>(points: &[T], budget: usize) -> Vec<T> {
    if points.len() <= budget {
        return points.to_vec();
    }
    match budget {
        0 => return Vec::new(),
        1 => return points.first().cloned().into_iter().collect(),
        _ => {}
    }

    let last = points.len() - 1;
    let step = last as f64 / (budget - 1) as f64;
    (0..budget)
        .map(|i| {
            let index = ((i as f64) * step).round() as usize;
            points[index.min(last)].clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 100)]
    #[case(1, 100)]
    #[case(57, 100)]
    #[case(100, 100)]
    fn input_within_budget_is_unchanged(#[case] len: usize, #[case] budget: usize) {
        let points: Vec<usize> = (0..len).collect();
        assert_eq!(sample_trajectory(&points, budget), points);
    }

    #[rstest]
    #[case(101, 100)]
    #[case(250, 100)]
    #[case(1_000, 100)]
    #[case(7, 2)]
    #[case(13, 5)]
    fn oversized_input_keeps_endpoints_and_budget(#[case] len: usize, #[case] budget: usize) {
        let points: Vec<usize> = (0..len).collect();

        let sampled = sample_trajectory(&points, budget);

        assert_eq!(sampled.len(), budget);
        assert_eq!(sampled.first(), points.first());
        assert_eq!(sampled.last(), points.last());
        assert!(sampled.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[rstest]
    fn sampling_is_deterministic() {
        let points: Vec<usize> = (0..333).collect();
        assert_eq!(sample_trajectory(&points, 100), sample_trajectory(&points, 100));
    }

    #[rstest]
    #[case(0, Vec::new())]
    #[case(1, vec![0])]
    fn degenerate_budgets_do_not_panic(#[case] budget: usize, #[case] expected: Vec<usize>) {
        let points: Vec<usize> = (0..10).collect();
        assert_eq!(sample_trajectory(&points, budget), expected);
    }
}
