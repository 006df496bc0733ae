use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "HR")]
    HomeRun,
    #[serde(rename = "H1")]
    OneOrMoreHits,
    #[serde(rename = "H2")]
    TwoOrMoreHits,
}

impl Market {
    pub const ALL: [Market; 3] = [Market::HomeRun, Market::OneOrMoreHits, Market::TwoOrMoreHits];

    pub fn code(self) -> &'static str {
        match self {
            Market::HomeRun => "HR",
            Market::OneOrMoreHits => "H1",
            Market::TwoOrMoreHits => "H2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Market::HomeRun => "HR Anytime",
            Market::OneOrMoreHits => "1+ Hit",
            Market::TwoOrMoreHits => "2+ Hits",
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Market {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hr" | "home_run" | "hr_anytime" => Ok(Market::HomeRun),
            "h1" | "hits_1plus" | "one_or_more_hits" => Ok(Market::OneOrMoreHits),
            "h2" | "hits_2plus" | "two_or_more_hits" => Ok(Market::TwoOrMoreHits),
            other => Err(AppError::InvalidParam(format!(
                "unknown market {other:?} (expected HR, H1 or H2)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema version: which generation of backend field names a row used
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    /// At least one market probability came from a current-schema field.
    Current,
    /// Market probabilities only came from fallback field names.
    Legacy,
    /// No market probability resolved at all.
    #[default]
    Unknown,
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SchemaVersion::Current => "current",
            SchemaVersion::Legacy => "legacy",
            SchemaVersion::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Player rows
// ---------------------------------------------------------------------------

/// One market's inputs for a player. Every field may legitimately be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketLine {
    /// Model probability for the game, in [0, 1].
    pub model_prob: Option<f64>,
    /// Sportsbook American odds.
    pub market_odds: Option<i32>,
    /// American odds equivalent to the model's own probability.
    pub fair_odds: Option<i32>,
    /// Edge as computed by the backend. Kept for comparison; never used for ranking.
    pub supplied_edge: Option<f64>,
    /// Score as computed by the backend. Kept for comparison; never used for ranking.
    pub supplied_score: Option<f64>,
}

/// Canonical per-(player, game date) record produced by the field resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerMarketRow {
    pub date: Option<String>,
    pub player_id: Option<i64>,
    pub player_name: String,
    pub team: String,
    /// Batting-order position; `None` means not starting.
    pub lineup_slot: Option<u32>,
    /// Plate appearances over the trailing 30 days.
    pub recent_pa: Option<f64>,
    /// Per-plate-appearance HR probability from the model.
    pub hr_prob_pa: Option<f64>,
    /// Per-plate-appearance hit probability from the model.
    pub hit_prob_pa: Option<f64>,
    pub home_run: MarketLine,
    pub one_plus_hits: MarketLine,
    pub two_plus_hits: MarketLine,
    pub schema: SchemaVersion,
}

impl PlayerMarketRow {
    pub fn line(&self, market: Market) -> &MarketLine {
        match market {
            Market::HomeRun => &self.home_run,
            Market::OneOrMoreHits => &self.one_plus_hits,
            Market::TwoOrMoreHits => &self.two_plus_hits,
        }
    }

    pub fn line_mut(&mut self, market: Market) -> &mut MarketLine {
        match market {
            Market::HomeRun => &mut self.home_run,
            Market::OneOrMoreHits => &mut self.one_plus_hits,
            Market::TwoOrMoreHits => &mut self.two_plus_hits,
        }
    }

    pub fn is_starter(&self) -> bool {
        self.lineup_slot.is_some_and(|slot| slot > 0)
    }
}

// ---------------------------------------------------------------------------
// Derived metrics
// ---------------------------------------------------------------------------

/// Computed per row per market; never stored on the row itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub implied_prob: Option<f64>,
    /// Raw signed `model − implied`. Not clamped.
    pub edge: Option<f64>,
    /// Always in [1.0, 10.0].
    pub score: f64,
}

/// A row together with the metrics derived for each of its markets.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub row: PlayerMarketRow,
    pub home_run: DerivedMetrics,
    pub one_plus_hits: DerivedMetrics,
    pub two_plus_hits: DerivedMetrics,
}

impl RankedRow {
    pub fn metrics(&self, market: Market) -> &DerivedMetrics {
        match market {
            Market::HomeRun => &self.home_run,
            Market::OneOrMoreHits => &self.one_plus_hits,
            Market::TwoOrMoreHits => &self.two_plus_hits,
        }
    }

    /// Highest score across the three markets.
    pub fn best_score(&self) -> f64 {
        Market::ALL
            .iter()
            .map(|&m| self.metrics(m).score)
            .fold(f64::MIN, f64::max)
    }
}
