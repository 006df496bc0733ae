//! In-process stand-in for the data backend, bound to an ephemeral port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::config::Config;
use crate::scorer::ScoreParams;

pub struct MockBackend {
    pub base_url: String,
    /// `/markets` requests served so far.
    pub hits: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serves one row per requested date on `GET /markets?date=`.
pub async fn spawn_backend() -> MockBackend {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/markets", get(markets))
        .with_state(Arc::clone(&hits));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move { axum::serve(listener, app).await });

    MockBackend {
        base_url: format!("http://{addr}"),
        hits,
    }
}

async fn markets(
    State(hits): State<Arc<AtomicUsize>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let date = params.get("date").cloned().unwrap_or_default();
    Json(json!([
        { "date": date, "playerName": "Cal Raleigh", "team": "SEA", "lineupSpot": 3, "hr_anytime_prob": 0.22 }
    ]))
}

pub fn config(base_url: &str, max_cached_dates: usize) -> Config {
    Config {
        data_api_base: base_url.to_string(),
        data_api_token: None,
        log_level: "info".to_string(),
        api_port: 0,
        refresh_interval_secs: 300,
        max_cached_dates,
        score: ScoreParams::default(),
    }
}
