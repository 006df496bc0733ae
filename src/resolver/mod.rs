//! Maps raw backend rows onto `PlayerMarketRow`.
//!
//! Resolution is total: a missing, null or malformed field only makes that
//! canonical field `None`. Nothing here returns an error.

pub mod fields;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::{Market, MarketLine, PlayerMarketRow, SchemaVersion};
use fields::Chain;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolveStats {
    /// Entries in the payload array.
    pub total: usize,
    pub current_schema: usize,
    pub legacy_schema: usize,
    pub unknown_schema: usize,
    /// Non-object entries dropped.
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedBatch {
    pub rows: Vec<PlayerMarketRow>,
    pub stats: ResolveStats,
}

/// Resolve a whole backend payload. Anything other than an array resolves to an empty batch.
pub fn resolve_batch(payload: &Value) -> ResolvedBatch {
    let Some(items) = payload.as_array() else {
        return ResolvedBatch::default();
    };

    let mut batch = ResolvedBatch {
        rows: Vec::with_capacity(items.len()),
        stats: ResolveStats { total: items.len(), ..Default::default() },
    };

    for item in items {
        let Some(obj) = item.as_object() else {
            batch.stats.skipped += 1;
            continue;
        };
        let row = resolve_row(obj);
        match row.schema {
            SchemaVersion::Current => batch.stats.current_schema += 1,
            SchemaVersion::Legacy => batch.stats.legacy_schema += 1,
            SchemaVersion::Unknown => batch.stats.unknown_schema += 1,
        }
        batch.rows.push(row);
    }

    batch
}

pub fn resolve_row(obj: &Map<String, Value>) -> PlayerMarketRow {
    let mut row = PlayerMarketRow {
        date: first(obj, fields::DATE, text),
        player_id: first(obj, fields::PLAYER_ID, player_id),
        player_name: first(obj, fields::PLAYER_NAME, text).unwrap_or_default(),
        team: first(obj, fields::TEAM, text).unwrap_or_default(),
        lineup_slot: first(obj, fields::LINEUP_SLOT, lineup_slot),
        recent_pa: first(obj, fields::RECENT_PA, non_negative),
        hr_prob_pa: first(obj, fields::HR_PROB_PA, probability),
        hit_prob_pa: first(obj, fields::HIT_PROB_PA, probability),
        ..Default::default()
    };

    let mut saw_current = false;
    let mut saw_legacy = false;
    for market in Market::ALL {
        let chains = fields::market_fields(market);
        let model = first_indexed(obj, chains.model_prob, probability);
        match model {
            Some((_, 0)) => saw_current = true,
            Some(_) => saw_legacy = true,
            None => {}
        }
        *row.line_mut(market) = MarketLine {
            model_prob: model.map(|(p, _)| p),
            market_odds: first(obj, chains.market_odds, american_odds),
            fair_odds: first(obj, chains.fair_odds, american_odds),
            supplied_edge: first(obj, chains.edge, number),
            supplied_score: first(obj, chains.score, number),
        };
    }

    row.schema = if saw_current {
        SchemaVersion::Current
    } else if saw_legacy {
        SchemaVersion::Legacy
    } else {
        SchemaVersion::Unknown
    };
    row
}

// ---------------------------------------------------------------------------
// Chain lookup
// ---------------------------------------------------------------------------

fn first<T>(obj: &Map<String, Value>, chain: Chain, coerce: fn(&Value) -> Option<T>) -> Option<T> {
    first_indexed(obj, chain, coerce).map(|(v, _)| v)
}

/// First usable value along the chain, with the chain position it came from.
/// A present but unusable field falls through to the next name.
fn first_indexed<T>(
    obj: &Map<String, Value>,
    chain: Chain,
    coerce: fn(&Value) -> Option<T>,
) -> Option<(T, usize)> {
    chain
        .iter()
        .enumerate()
        .find_map(|(i, key)| obj.get(*key).and_then(coerce).map(|v| (v, i)))
}

// ---------------------------------------------------------------------------
// Coercions
// ---------------------------------------------------------------------------

fn number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn probability(v: &Value) -> Option<f64> {
    number(v).filter(|p| (0.0..=1.0).contains(p))
}

fn non_negative(v: &Value) -> Option<f64> {
    number(v).filter(|n| *n >= 0.0)
}

fn whole(v: &Value) -> Option<f64> {
    number(v).filter(|n| n.fract() == 0.0)
}

fn american_odds(v: &Value) -> Option<i32> {
    let n = whole(v)?;
    if n == 0.0 || n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
        return None;
    }
    Some(n as i32)
}

fn lineup_slot(v: &Value) -> Option<u32> {
    let n = whole(v)?;
    (n >= 1.0 && n <= f64::from(u32::MAX)).then_some(n as u32)
}

fn player_id(v: &Value) -> Option<i64> {
    if let Value::Number(n) = v {
        if let Some(id) = n.as_i64() {
            return Some(id);
        }
    }
    // Floats like `660271.0` and numeric strings.
    let n = whole(v)?;
    (n.abs() < 2f64.powi(53)).then_some(n as i64)
}

fn text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
