use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TOP_PICK_THRESHOLD;
use crate::error::{AppError, Result};
use crate::types::Market;

/// Raw limit value meaning "show everything".
pub const UNBOUNDED_LIMIT: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "score")]
    Score,
    #[serde(rename = "model")]
    ModelProb,
    #[serde(rename = "edge")]
    Edge,
    /// Market-implied probability.
    #[serde(rename = "market")]
    MarketProb,
    #[serde(rename = "fair")]
    FairOdds,
    #[serde(rename = "pa")]
    RecentPa,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Score,
        SortKey::ModelProb,
        SortKey::Edge,
        SortKey::MarketProb,
        SortKey::FairOdds,
        SortKey::RecentPa,
    ];

    pub fn code(self) -> &'static str {
        match self {
            SortKey::Score => "score",
            SortKey::ModelProb => "model",
            SortKey::Edge => "edge",
            SortKey::MarketProb => "market",
            SortKey::FairOdds => "fair",
            SortKey::RecentPa => "pa",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "score" => Ok(SortKey::Score),
            "model" | "model_prob" => Ok(SortKey::ModelProb),
            "edge" => Ok(SortKey::Edge),
            "market" | "market_prob" | "implied" => Ok(SortKey::MarketProb),
            "fair" | "fair_odds" => Ok(SortKey::FairOdds),
            "pa" | "recent_pa" => Ok(SortKey::RecentPa),
            other => {
                let known: Vec<_> = SortKey::ALL.iter().map(|k| k.code()).collect();
                Err(AppError::InvalidParam(format!(
                    "unknown sort key {other:?}, expected one of {}",
                    known.join(", ")
                )))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    #[default]
    Desc,
    Asc,
}

impl std::fmt::Display for SortDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDir::Desc => write!(f, "desc"),
            SortDir::Asc => write!(f, "asc"),
        }
    }
}

impl FromStr for SortDir {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desc" | "descending" => Ok(SortDir::Desc),
            "asc" | "ascending" => Ok(SortDir::Asc),
            other => Err(AppError::InvalidParam(format!("unknown sort direction {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    Top(usize),
    #[default]
    Unbounded,
}

impl Limit {
    /// `-1` is unbounded, positive values are top-N; anything else is rejected.
    pub fn from_raw(raw: i64) -> Result<Self> {
        match raw {
            UNBOUNDED_LIMIT => Ok(Limit::Unbounded),
            n if n > 0 => usize::try_from(n)
                .map(Limit::Top)
                .map_err(|_| AppError::InvalidParam(format!("limit {n} is too large"))),
            n => Err(AppError::InvalidParam(format!(
                "limit must be a positive integer or {UNBOUNDED_LIMIT} for all, got {n}"
            ))),
        }
    }

    pub fn as_raw(self) -> i64 {
        match self {
            Limit::Top(n) => i64::try_from(n).unwrap_or(i64::MAX),
            Limit::Unbounded => UNBOUNDED_LIMIT,
        }
    }
}

/// Every user-selectable ranking parameter. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RankQuery {
    /// Case-insensitive substring of player name or team. Blank matches all.
    pub search: String,
    pub starters_only: bool,
    pub top_picks_only: bool,
    /// Minimum score in any market for the top-picks filter.
    pub threshold: f64,
    pub market: Market,
    pub sort_key: SortKey,
    pub sort_dir: SortDir,
    pub limit: Limit,
}

impl Default for RankQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            starters_only: false,
            top_picks_only: false,
            threshold: DEFAULT_TOP_PICK_THRESHOLD,
            market: Market::HomeRun,
            sort_key: SortKey::Score,
            sort_dir: SortDir::Desc,
            limit: Limit::Unbounded,
        }
    }
}

impl RankQuery {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(AppError::InvalidParam(format!(
                "threshold must be a finite number, got {}",
                self.threshold
            )));
        }
        if self.limit == Limit::Top(0) {
            return Err(AppError::InvalidParam("limit must be positive".to_string()));
        }
        Ok(())
    }
}
