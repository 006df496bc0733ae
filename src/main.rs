mod api;
mod config;
mod error;
mod fetcher;
mod pricing;
mod ranking;
mod refresh;
mod resolver;
mod scorer;
mod state;
#[cfg(test)]
mod test_support;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{today, RowFetcher};
use crate::refresh::{load_snapshot, RowRefresher};
use crate::state::RowStore;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    info!(
        backend = %cfg.data_api_base,
        auth = cfg.data_api_token.is_some(),
        curve_exponent = cfg.score.curve_exponent,
        edge_scale = cfg.score.edge_scale,
        edge_cap = cfg.score.edge_cap,
        "Starting picks service (refresh every {}s, keep {} dates)",
        cfg.refresh_interval_secs,
        cfg.max_cached_dates,
    );

    let fetcher = Arc::new(RowFetcher::new(&cfg)?);
    let store = RowStore::new();
    let health = Arc::new(HealthState::new());

    // --- Bootstrap: today's rows ---
    let date = today();
    match load_snapshot(&fetcher, &store, &health, date).await {
        Ok(snapshot) => info!(%date, rows = snapshot.rows.len(), "Bootstrap complete"),
        Err(e) => warn!(%date, "Bootstrap fetch failed, will retry on first request or next refresh: {e}"),
    }

    // --- Periodic refresh ---
    let refresher = RowRefresher::new(
        Arc::clone(&fetcher),
        Arc::clone(&store),
        Arc::clone(&health),
        cfg.refresh_interval_secs,
        cfg.max_cached_dates,
    );
    tokio::spawn(async move { refresher.run().await });

    // --- HTTP API ---
    let api_state = ApiState {
        store,
        health,
        fetcher,
        score: cfg.score,
        max_cached_dates: cfg.max_cached_dates,
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
