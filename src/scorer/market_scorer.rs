use crate::config::scoring::{
    CURVE_EXPONENT, EDGE_CAP, EDGE_SCALE, PROBABILITY_WEIGHT, SCORE_MAX, SCORE_MIN,
};
use crate::error::{AppError, Result};
use crate::pricing::{capped_edge, edge, implied_probability};
use crate::types::{DerivedMetrics, Market, MarketLine, PlayerMarketRow, RankedRow};

/// Tunable scoring constants. Defaults come from `config::scoring`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreParams {
    pub curve_exponent: f64,
    pub edge_scale: f64,
    pub edge_cap: f64,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            curve_exponent: CURVE_EXPONENT,
            edge_scale: EDGE_SCALE,
            edge_cap: EDGE_CAP,
        }
    }
}

impl ScoreParams {
    pub fn validate(&self) -> Result<()> {
        if !self.curve_exponent.is_finite() || self.curve_exponent <= 0.0 {
            return Err(AppError::Config(format!(
                "score curve exponent must be a positive number, got {}",
                self.curve_exponent
            )));
        }
        if !self.edge_scale.is_finite() {
            return Err(AppError::Config("score edge scale must be finite".to_string()));
        }
        if !self.edge_cap.is_finite() || self.edge_cap < 0.0 {
            return Err(AppError::Config(format!(
                "score edge cap must be >= 0, got {}",
                self.edge_cap
            )));
        }
        Ok(())
    }
}

/// Bounded 1–10 score for one market.
///
/// `1 + p^exponent * 8 + clamp(p − implied, ±cap) * scale`, clamped to [1, 10].
/// The market adjustment is zero when the odds are missing or unconvertible.
/// Unknown probability ranks lowest (1.0).
pub fn score(model_prob: Option<f64>, market_odds: Option<i32>, params: &ScoreParams) -> f64 {
    let Some(p) = model_prob else {
        return SCORE_MIN;
    };

    let base = p.powf(params.curve_exponent);
    let adjustment = implied_probability(market_odds)
        .map(|implied| capped_edge(p - implied, params.edge_cap) * params.edge_scale)
        .unwrap_or(0.0);

    let raw = 1.0 + base * PROBABILITY_WEIGHT + adjustment;
    if raw.is_nan() {
        return SCORE_MIN;
    }
    raw.clamp(SCORE_MIN, SCORE_MAX)
}

/// Implied probability, raw edge and score for one market line.
pub fn evaluate(line: &MarketLine, params: &ScoreParams) -> DerivedMetrics {
    let implied_prob = implied_probability(line.market_odds);
    DerivedMetrics {
        implied_prob,
        edge: edge(line.model_prob, implied_prob),
        score: score(line.model_prob, line.market_odds, params),
    }
}

pub fn evaluate_row(row: &PlayerMarketRow, params: &ScoreParams) -> RankedRow {
    RankedRow {
        home_run: evaluate(row.line(Market::HomeRun), params),
        one_plus_hits: evaluate(row.line(Market::OneOrMoreHits), params),
        two_plus_hits: evaluate(row.line(Market::TwoOrMoreHits), params),
        row: row.clone(),
    }
}
