//! Filter → sort → truncate pipeline over evaluated rows.
//!
//! Stages always run in that order. Filters never reorder, the sort never
//! drops rows and truncation never reorders.

pub mod filter;
pub mod query;
pub mod sort;

use crate::error::Result;
use crate::scorer::{evaluate_row, ScoreParams};
use crate::types::{PlayerMarketRow, RankedRow};

pub use query::{Limit, RankQuery, SortDir, SortKey};

#[derive(Debug, Clone, Default)]
pub struct Ranking {
    pub rows: Vec<RankedRow>,
    /// Rows in the input.
    pub total: usize,
    /// Rows that passed every filter, before truncation.
    pub matched: usize,
}

/// Evaluate, filter, sort and truncate `rows` for `query`.
///
/// Only an invalid `query` is an error; missing row data never is.
pub fn rank(rows: &[PlayerMarketRow], query: &RankQuery, params: &ScoreParams) -> Result<Ranking> {
    query.validate()?;

    let needle = filter::normalize_query(&query.search);

    let mut ranked: Vec<RankedRow> = rows
        .iter()
        .filter(|r| needle.as_deref().map_or(true, |n| filter::matches_search(r, n)))
        .filter(|r| !query.starters_only || r.is_starter())
        .map(|r| evaluate_row(r, params))
        .filter(|r| !query.top_picks_only || filter::is_top_pick(r, query.threshold))
        .collect();

    let matched = ranked.len();
    sort::sort_rows(&mut ranked, query.market, query.sort_key, query.sort_dir);

    if let Limit::Top(n) = query.limit {
        ranked.truncate(n);
    }

    Ok(Ranking {
        rows: ranked,
        total: rows.len(),
        matched,
    })
}
