//! American-odds conversion and model-vs-market edge.

/// Raw one-sided implied probability of an American-odds quote (no vig removal).
///
/// Quotes strictly between -100 and +100 are not representable and yield `None`,
/// same as a missing quote.
pub fn implied_probability(odds: Option<i32>) -> Option<f64> {
    let odds = f64::from(odds?);
    if odds >= 100.0 {
        Some(100.0 / (odds + 100.0))
    } else if odds <= -100.0 {
        Some(-odds / (-odds + 100.0))
    } else {
        None
    }
}

/// `model − implied` when both sides are known. Never defaults to zero.
pub fn edge(model_prob: Option<f64>, implied_prob: Option<f64>) -> Option<f64> {
    Some(model_prob? - implied_prob?)
}

/// Edge clamped to `[-cap, cap]`. Only the score uses this; displayed edge stays raw.
pub fn capped_edge(edge: f64, cap: f64) -> f64 {
    edge.clamp(-cap, cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn positive_odds() {
        assert!(approx(implied_probability(Some(100)).unwrap(), 0.5));
        assert!(approx(implied_probability(Some(120)).unwrap(), 100.0 / 220.0));
        assert!(approx(implied_probability(Some(150)).unwrap(), 0.4));
    }

    #[test]
    fn negative_odds() {
        assert!(approx(implied_probability(Some(-150)).unwrap(), 0.6));
        assert!(approx(implied_probability(Some(-100)).unwrap(), 0.5));
    }

    #[test]
    fn sub_hundred_quotes_are_unconvertible() {
        assert_eq!(implied_probability(Some(50)), None);
        assert_eq!(implied_probability(Some(-99)), None);
        assert_eq!(implied_probability(Some(99)), None);
        assert_eq!(implied_probability(Some(0)), None);
        assert_eq!(implied_probability(None), None);
    }

    #[test]
    fn implied_probability_ranges() {
        for odds in (100..=5000).step_by(37) {
            let p = implied_probability(Some(odds)).unwrap();
            assert!(p > 0.0 && p <= 0.5, "odds={odds} p={p}");
            let q = implied_probability(Some(-odds)).unwrap();
            assert!((0.5..1.0).contains(&q), "odds=-{odds} q={q}");
        }
    }

    #[test]
    fn edge_requires_both_operands() {
        let e = edge(Some(0.30), implied_probability(Some(150))).unwrap();
        assert!(approx(e, -0.10), "edge={e}");
        assert_eq!(edge(None, Some(0.4)), None);
        assert_eq!(edge(Some(0.3), None), None);
        assert_eq!(edge(Some(0.3), implied_probability(Some(50))), None);
    }

    #[test]
    fn capped_edge_clamps_both_sides() {
        assert_eq!(capped_edge(0.4, 0.25), 0.25);
        assert_eq!(capped_edge(-0.7, 0.25), -0.25);
        assert_eq!(capped_edge(0.1, 0.25), 0.1);
    }
}
