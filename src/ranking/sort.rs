use std::cmp::Ordering;

use crate::ranking::query::{SortDir, SortKey};
use crate::types::{Market, RankedRow};

/// Numeric sort value of a row for the active market. `None` sorts last.
pub fn sort_value(row: &RankedRow, market: Market, key: SortKey) -> Option<f64> {
    let metrics = row.metrics(market);
    let line = row.row.line(market);
    match key {
        SortKey::Score => Some(metrics.score),
        SortKey::ModelProb => line.model_prob,
        SortKey::Edge => metrics.edge,
        SortKey::MarketProb => metrics.implied_prob,
        SortKey::FairOdds => line.fair_odds.map(f64::from),
        SortKey::RecentPa => row.row.recent_pa,
    }
}

/// Absent values go after present ones regardless of direction.
pub fn compare(a: Option<f64>, b: Option<f64>, dir: SortDir) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            match dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable in-place sort; equal keys keep their input order.
pub fn sort_rows(rows: &mut [RankedRow], market: Market, key: SortKey, dir: SortDir) {
    rows.sort_by(|a, b| compare(sort_value(a, market, key), sort_value(b, market, key), dir));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_sorts_last_in_both_directions() {
        for dir in [SortDir::Asc, SortDir::Desc] {
            assert_eq!(compare(Some(1.0), None, dir), Ordering::Less);
            assert_eq!(compare(None, Some(-5.0), dir), Ordering::Greater);
            assert_eq!(compare(None, None, dir), Ordering::Equal);
        }
    }

    #[test]
    fn direction_flips_present_values() {
        assert_eq!(compare(Some(1.0), Some(2.0), SortDir::Asc), Ordering::Less);
        assert_eq!(compare(Some(1.0), Some(2.0), SortDir::Desc), Ordering::Greater);
        assert_eq!(compare(Some(2.0), Some(2.0), SortDir::Desc), Ordering::Equal);
    }
}
