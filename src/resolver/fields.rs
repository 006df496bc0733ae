//! Field-name fallback chains, one per canonical field.
//!
//! The first name in every chain is the current backend schema; the rest are
//! names seen in older payloads, tried in order. Add new names at the front
//! when the backend renames a field, and keep the old ones behind it.

use crate::types::Market;

pub type Chain = &'static [&'static str];

pub const DATE: Chain = &["date", "game_date"];
pub const PLAYER_ID: Chain = &["playerId", "player_id", "id"];
pub const PLAYER_NAME: Chain = &["playerName", "player_name", "name"];
pub const TEAM: Chain = &["team", "team_abbr", "teamAbbr"];
pub const LINEUP_SLOT: Chain = &["lineupSpot", "lineup_spot", "batting_order"];
pub const RECENT_PA: Chain = &["recent_pa", "recentPa", "pa_30d"];
pub const HR_PROB_PA: Chain = &["hr_prob_pa_model", "hr_prob_pa"];
pub const HIT_PROB_PA: Chain = &["hit_prob_pa_model", "hit_prob_pa"];

/// Field chains for one market.
#[derive(Debug)]
pub struct MarketFields {
    pub model_prob: Chain,
    pub market_odds: Chain,
    pub fair_odds: Chain,
    pub edge: Chain,
    pub score: Chain,
}

pub const HOME_RUN: MarketFields = MarketFields {
    model_prob: &["hr_anytime_prob", "hr_game_prob", "hr_prob"],
    market_odds: &["hr_market_odds", "hr_odds", "hr_american"],
    fair_odds: &["fair_hr_american", "hr_fair_american", "hr_fair_odds"],
    edge: &["hr_edge"],
    score: &["hr_score"],
};

pub const ONE_PLUS_HITS: MarketFields = MarketFields {
    model_prob: &["hits_1plus_prob", "h1_prob", "hit_1plus_prob"],
    market_odds: &["h1_market_odds", "h1_odds", "h1_american"],
    fair_odds: &["fair_h1_american", "h1_fair_american", "h1_fair_odds"],
    edge: &["h1_edge"],
    score: &["h1_score"],
};

pub const TWO_PLUS_HITS: MarketFields = MarketFields {
    model_prob: &["hits_2plus_prob", "h2_prob", "hit_2plus_prob"],
    market_odds: &["h2_market_odds", "h2_odds", "h2_american"],
    fair_odds: &["fair_h2_american", "h2_fair_american", "h2_fair_odds"],
    edge: &["h2_edge"],
    score: &["h2_score"],
};

pub fn market_fields(market: Market) -> &'static MarketFields {
    match market {
        Market::HomeRun => &HOME_RUN,
        Market::OneOrMoreHits => &ONE_PLUS_HITS,
        Market::TwoOrMoreHits => &TWO_PLUS_HITS,
    }
}
