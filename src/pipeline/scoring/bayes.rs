//! Odds-form Bayes helpers for likelihood-ratio based scoring.

/// Posterior probability after applying a likelihood ratio to a
/// pre-test probability, via odds.
pub fn post_test_probability(pre_test: f64, likelihood_ratio: f64) -> f64 {
    let pre = pre_test.clamp(f64::EPSILON, 1.0 - f64::EPSILON);
    let odds = pre / (1.0 - pre) * likelihood_ratio;
    odds / (1.0 + odds)
}

/// Likelihood ratio for a McIsaac-adjusted Centor score. Out-of-range
/// scores clamp to the nearest bucket.
pub fn centor_likelihood_ratio(score: i32) -> f64 {
    match score {
        i32::MIN..=0 => 0.16,
        1 => 0.3,
        2 => 0.75,
        3 => 2.1,
        _ => 6.3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lr_buckets() {
        assert_eq!(centor_likelihood_ratio(-1), 0.16);
        assert_eq!(centor_likelihood_ratio(0), 0.16);
        assert_eq!(centor_likelihood_ratio(1), 0.3);
        assert_eq!(centor_likelihood_ratio(2), 0.75);
        assert_eq!(centor_likelihood_ratio(3), 2.1);
        assert_eq!(centor_likelihood_ratio(4), 6.3);
        assert_eq!(centor_likelihood_ratio(5), 6.3);
    }

    #[test]
    fn out_of_range_scores_clamp() {
        assert_eq!(centor_likelihood_ratio(-3), 0.16);
        assert_eq!(centor_likelihood_ratio(9), 6.3);
    }

    #[test]
    fn neutral_lr_keeps_the_prior() {
        let p = post_test_probability(0.10, 1.0);
        assert!((p - 0.10).abs() < 1e-12);
    }

    #[test]
    fn lr_moves_probability_in_its_direction() {
        let up = post_test_probability(0.10, 6.3);
        let down = post_test_probability(0.10, 0.16);
        assert!(up > 0.10);
        assert!(down < 0.10);
        // 0.1 odds are 1/9; times 6.3 → 0.7 odds → 0.4118…
        assert!((up - 0.7 / 1.7).abs() < 1e-9);
    }

    #[test]
    fn degenerate_pre_test_does_not_divide_by_zero() {
        assert!(post_test_probability(1.0, 2.0).is_finite());
        assert!(post_test_probability(0.0, 2.0).is_finite());
    }
}
