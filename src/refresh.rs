use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use futures_util::future::join_all;
use tokio::time::interval;
use tracing::{error, info};

use crate::api::health::HealthState;
use crate::error::Result;
use crate::fetcher::{today, RowFetcher};
use crate::state::{RowStore, Snapshot};

/// Fetch `date` from the backend and replace its snapshot in the store.
pub async fn load_snapshot(
    fetcher: &RowFetcher,
    store: &RowStore,
    health: &HealthState,
    date: NaiveDate,
) -> Result<Arc<Snapshot>> {
    match fetcher.fetch(date).await {
        Ok(batch) => {
            health.record_success(Utc::now().timestamp());
            Ok(store.insert(Snapshot::new(date, batch)))
        }
        Err(e) => {
            health.record_failure();
            Err(e)
        }
    }
}

/// Re-fetches today and every cached date on a fixed interval.
pub struct RowRefresher {
    fetcher: Arc<RowFetcher>,
    store: Arc<RowStore>,
    health: Arc<HealthState>,
    interval_secs: u64,
    max_cached_dates: usize,
}

impl RowRefresher {
    pub fn new(
        fetcher: Arc<RowFetcher>,
        store: Arc<RowStore>,
        health: Arc<HealthState>,
        interval_secs: u64,
        max_cached_dates: usize,
    ) -> Self {
        Self { fetcher, store, health, interval_secs, max_cached_dates }
    }

    pub async fn run(self) {
        let mut ticker = interval(Duration::from_secs(self.interval_secs));
        ticker.tick().await; // bootstrap already covered the first tick

        loop {
            ticker.tick().await;
            self.refresh().await;
        }
    }

    async fn refresh(&self) {
        let today = today();
        // Trim first so the fan-out below never exceeds the cap (plus today).
        let mut evicted = self.store.evict_to(self.max_cached_dates, today);
        let mut dates = self.store.dates();
        if !dates.contains(&today) {
            dates.push(today);
        }

        let results = join_all(dates.iter().map(|&date| {
            load_snapshot(&self.fetcher, &self.store, &self.health, date)
        }))
        .await;

        let mut refreshed = 0usize;
        for (date, result) in dates.iter().zip(results) {
            match result {
                Ok(_) => refreshed += 1,
                Err(e) => error!(%date, "Row refresh failed: {e}"),
            }
        }

        evicted.extend(self.store.evict_to(self.max_cached_dates, today));
        info!(
            refreshed,
            failed = dates.len() - refreshed,
            evicted = evicted.len(),
            cached = self.store.len(),
            "Refresh complete: {refreshed}/{} dates updated",
            dates.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolvedBatch;
    use crate::test_support::{config, spawn_backend};

    fn stale(day: u32) -> Snapshot {
        let date = NaiveDate::from_ymd_opt(2025, 5, day).expect("valid test date");
        Snapshot::new(date, ResolvedBatch::default())
    }

    fn refresher(base_url: &str, store: Arc<RowStore>, health: Arc<HealthState>, max: usize) -> RowRefresher {
        let fetcher = RowFetcher::new(&config(base_url, max)).expect("client builds");
        RowRefresher::new(Arc::new(fetcher), store, health, 300, max)
    }

    #[tokio::test]
    async fn refresh_trims_before_fetching() {
        let backend = spawn_backend().await;
        let store = RowStore::new();
        for day in 1..=10 {
            store.insert(stale(day));
        }
        let health = Arc::new(HealthState::new());

        refresher(&backend.base_url, Arc::clone(&store), Arc::clone(&health), 3)
            .refresh()
            .await;

        // Three survivors of the pre-fetch trim plus today.
        assert_eq!(backend.hits(), 4);
        assert_eq!(store.len(), 3);
        assert!(store.get(today()).is_some());
        assert_eq!(health.total_fetches(), 4);
        assert_eq!(health.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn load_snapshot_records_failure() {
        let store = RowStore::new();
        let health = HealthState::new();
        let fetcher = RowFetcher::new(&config("http://127.0.0.1:9", 7)).expect("client builds");
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid test date");

        assert!(load_snapshot(&fetcher, &store, &health, date).await.is_err());
        assert_eq!(health.consecutive_failures(), 1);
        assert_eq!(store.len(), 0);
    }
}
