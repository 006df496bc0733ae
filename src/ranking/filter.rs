use crate::types::{PlayerMarketRow, RankedRow};

/// Lower-cased, trimmed search needle. `None` when the query is blank.
pub fn normalize_query(query: &str) -> Option<String> {
    let q = query.trim();
    (!q.is_empty()).then(|| q.to_lowercase())
}

/// `needle` must already be lower-cased (see `normalize_query`).
pub fn matches_search(row: &PlayerMarketRow, needle: &str) -> bool {
    row.player_name.to_lowercase().contains(needle) || row.team.to_lowercase().contains(needle)
}

pub fn is_top_pick(row: &RankedRow, threshold: f64) -> bool {
    row.best_score() >= threshold
}
