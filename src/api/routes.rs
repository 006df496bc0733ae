use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::health::HealthState;
use crate::error::{AppError, Result};
use crate::fetcher::{format_date, parse_date, today, RowFetcher};
use crate::ranking::{rank, Limit, RankQuery, SortDir, SortKey};
use crate::refresh::load_snapshot;
use crate::resolver::ResolveStats;
use crate::scorer::ScoreParams;
use crate::state::RowStore;
use crate::types::{DerivedMetrics, Market, MarketLine, RankedRow, SchemaVersion};

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<RowStore>,
    pub health: Arc<HealthState>,
    pub fetcher: Arc<RowFetcher>,
    pub score: ScoreParams,
    /// Cap applied after every on-demand fetch.
    pub max_cached_dates: usize,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/picks", get(get_picks))
        .route("/health", get(get_health))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PicksQuery {
    pub date: Option<String>,
    pub market: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub q: Option<String>,
    // Typed values are parsed in `to_rank_query` so bad input gets a JSON error body.
    pub starters: Option<String>,
    pub top_picks: Option<String>,
    pub threshold: Option<String>,
    pub limit: Option<String>,
}

impl PicksQuery {
    pub fn to_rank_query(&self) -> Result<RankQuery> {
        let defaults = RankQuery::default();
        Ok(RankQuery {
            search: self.q.clone().unwrap_or_default(),
            starters_only: parse_flag("starters", self.starters.as_deref())?,
            top_picks_only: parse_flag("top_picks", self.top_picks.as_deref())?,
            threshold: parse_number::<f64>("threshold", self.threshold.as_deref())?.unwrap_or(defaults.threshold),
            market: self.market.as_deref().map(str::parse::<Market>).transpose()?.unwrap_or(defaults.market),
            sort_key: self.sort.as_deref().map(str::parse::<SortKey>).transpose()?.unwrap_or(defaults.sort_key),
            sort_dir: self.dir.as_deref().map(str::parse::<SortDir>).transpose()?.unwrap_or(defaults.sort_dir),
            limit: parse_number::<i64>("limit", self.limit.as_deref())?
                .map(Limit::from_raw)
                .transpose()?
                .unwrap_or(defaults.limit),
        })
    }
}

fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(false),
        Some("true" | "1" | "yes" | "on") => Ok(true),
        Some("false" | "0" | "no" | "off") => Ok(false),
        Some(other) => Err(AppError::InvalidParam(format!(
            "{name} must be true or false, got {other:?}"
        ))),
    }
}

fn parse_number<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::InvalidParam(format!("{name} must be a number, got {s:?}"))),
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct MarketView {
    pub model_prob: Option<f64>,
    pub market_odds: Option<i32>,
    pub fair_odds: Option<i32>,
    pub implied_prob: Option<f64>,
    pub edge: Option<f64>,
    pub score: f64,
    pub supplied_edge: Option<f64>,
    pub supplied_score: Option<f64>,
}

impl MarketView {
    fn new(line: &MarketLine, metrics: &DerivedMetrics) -> Self {
        Self {
            model_prob: line.model_prob,
            market_odds: line.market_odds,
            fair_odds: line.fair_odds,
            implied_prob: metrics.implied_prob,
            edge: metrics.edge,
            score: metrics.score,
            supplied_edge: line.supplied_edge,
            supplied_score: line.supplied_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PickResponse {
    pub rank: usize,
    pub player_id: Option<i64>,
    pub player_name: String,
    pub team: String,
    pub lineup_slot: Option<u32>,
    pub recent_pa: Option<f64>,
    pub hr_prob_pa: Option<f64>,
    pub hit_prob_pa: Option<f64>,
    pub schema: SchemaVersion,
    /// The market the list is ranked by.
    pub active: MarketView,
    pub hr: MarketView,
    pub h1: MarketView,
    pub h2: MarketView,
}

impl PickResponse {
    fn new(rank: usize, r: &RankedRow, market: Market) -> Self {
        let view = |m: Market| MarketView::new(r.row.line(m), r.metrics(m));
        Self {
            rank,
            player_id: r.row.player_id,
            player_name: r.row.player_name.clone(),
            team: r.row.team.clone(),
            lineup_slot: r.row.lineup_slot,
            recent_pa: r.row.recent_pa,
            hr_prob_pa: r.row.hr_prob_pa,
            hit_prob_pa: r.row.hit_prob_pa,
            schema: r.row.schema,
            active: view(market),
            hr: view(Market::HomeRun),
            h1: view(Market::OneOrMoreHits),
            h2: view(Market::TwoOrMoreHits),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PicksResponse {
    pub date: String,
    pub fetched_at: DateTime<Utc>,
    pub market: Market,
    pub market_label: &'static str,
    pub sort: String,
    pub dir: String,
    pub limit: i64,
    pub total: usize,
    pub matched: usize,
    pub schema: ResolveStats,
    pub rows: Vec<PickResponse>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub last_fetch_ok_at: Option<i64>,
    pub consecutive_failures: u64,
    pub total_fetches: u64,
    pub total_failures: u64,
    pub cached_dates: Vec<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_picks(
    State(state): State<ApiState>,
    Query(params): Query<PicksQuery>,
) -> std::result::Result<Json<PicksResponse>, AppError> {
    let date = match params.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let query = params.to_rank_query()?;

    let snapshot = match state.store.get(date) {
        Some(s) => s,
        None => {
            let snapshot = load_snapshot(&state.fetcher, &state.store, &state.health, date).await?;
            let evicted = state.store.evict_to(state.max_cached_dates, today());
            if !evicted.is_empty() {
                debug!(?evicted, cached = state.store.len(), "Evicted snapshots after on-demand fetch");
            }
            snapshot
        }
    };

    let ranking = rank(&snapshot.rows, &query, &state.score)?;
    let rows = ranking
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| PickResponse::new(i + 1, r, query.market))
        .collect();

    Ok(Json(PicksResponse {
        date: format_date(date),
        fetched_at: snapshot.fetched_at,
        market: query.market,
        market_label: query.market.label(),
        sort: query.sort_key.to_string(),
        dir: query.sort_dir.to_string(),
        limit: query.limit.as_raw(),
        total: ranking.total,
        matched: ranking.matched,
        schema: snapshot.stats.clone(),
        rows,
    }))
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let h = &state.health;
    let status = if h.consecutive_failures() == 0 && !state.store.is_empty() {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse {
        status,
        last_fetch_ok_at: h.last_fetch_ok_at(),
        consecutive_failures: h.consecutive_failures(),
        total_fetches: h.total_fetches(),
        total_failures: h.total_failures(),
        cached_dates: state.store.dates().into_iter().map(format_date).collect(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::resolver::resolve_batch;
    use crate::state::Snapshot;
    use crate::test_support::{config, spawn_backend};

    const DATE: &str = "2025-06-01";

    fn test_state(base_url: &str) -> ApiState {
        let cfg = config(base_url, 7);
        let store = RowStore::new();
        let batch = resolve_batch(&json!([
            { "playerName": "B", "team": "SD", "hr_anytime_prob": 0.10 },
            { "playerName": "A", "team": "LAD", "lineupSpot": 2, "hr_anytime_prob": 0.30, "hr_market_odds": 150 },
            { "playerName": "C", "team": "LAD", "lineupSpot": 5, "hits_1plus_prob": 0.72 }
        ]));
        store.insert(Snapshot::new(parse_date(DATE).expect("valid date"), batch));

        ApiState {
            store,
            health: Arc::new(HealthState::new()),
            fetcher: Arc::new(RowFetcher::new(&cfg).expect("client builds")),
            score: ScoreParams::default(),
            max_cached_dates: cfg.max_cached_dates,
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request");
        let response = app.oneshot(request).await.expect("router request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn names(body: &Value) -> Vec<String> {
        body["rows"]
            .as_array()
            .expect("rows array")
            .iter()
            .map(|r| r["player_name"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test]
    async fn picks_ranked_by_hr_score() {
        let app = router(test_state("http://127.0.0.1:9"));
        let (status, body) = get_json(app, &format!("/picks?date={DATE}&market=HR")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body), ["A", "B", "C"]);
        assert_eq!(body["market"], "HR");
        assert_eq!(body["sort"], "score");
        assert_eq!(body["limit"], -1);
        assert_eq!(body["total"], 3);
        assert_eq!(body["rows"][0]["rank"], 1);
        let edge = body["rows"][0]["active"]["edge"].as_f64().expect("edge present");
        assert!((edge + 0.10).abs() < 1e-9, "edge={edge}");
        assert!(body["rows"][1]["active"]["edge"].is_null());
        assert_eq!(body["rows"][2]["active"]["score"], 1.0);
    }

    #[tokio::test]
    async fn picks_filters_and_limits() {
        let app = router(test_state("http://127.0.0.1:9"));
        let uri = format!("/picks?date={DATE}&q=lad&starters=true&market=H1&limit=1");
        let (status, body) = get_json(app, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body), ["C"]);
        assert_eq!(body["matched"], 2);
        assert_eq!(body["market_label"], "1+ Hit");
    }

    #[tokio::test]
    async fn high_threshold_returns_nothing() {
        let app = router(test_state("http://127.0.0.1:9"));
        let uri = format!("/picks?date={DATE}&top_picks=true&threshold=8");
        let (status, body) = get_json(app, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert!(names(&body).is_empty());
        assert_eq!(body["matched"], 0);
    }

    #[tokio::test]
    async fn bad_parameters_are_rejected() {
        for uri in [
            format!("/picks?date={DATE}&limit=0"),
            format!("/picks?date={DATE}&limit=-3"),
            format!("/picks?date={DATE}&market=H9"),
            format!("/picks?date={DATE}&sort=vibes"),
            format!("/picks?date={DATE}&dir=sideways"),
            format!("/picks?date={DATE}&limit=abc"),
            format!("/picks?date={DATE}&threshold=x"),
            format!("/picks?date={DATE}&starters=maybe"),
            format!("/picks?date={DATE}&top_picks=2"),
            "/picks?date=06-01-2025".to_string(),
        ] {
            let app = router(test_state("http://127.0.0.1:9"));
            let (status, body) = get_json(app, &uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "uri={uri}");
            assert!(body["error"].is_string(), "uri={uri}");
        }
    }

    #[tokio::test]
    async fn uncached_date_with_unreachable_backend_is_bad_gateway() {
        let state = test_state("http://127.0.0.1:9");
        let health = Arc::clone(&state.health);
        let app = router(state);
        let (status, _) = get_json(app, "/picks?date=2025-06-02").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(health.consecutive_failures(), 1);
    }

    #[tokio::test]
    async fn flag_spellings_are_accepted() {
        let app = router(test_state("http://127.0.0.1:9"));
        let uri = format!("/picks?date={DATE}&starters=1&top_picks=no&threshold=&limit=");
        let (status, body) = get_json(app, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body), ["A", "C"]);
        assert_eq!(body["limit"], -1);
    }

    #[tokio::test]
    async fn on_demand_fetches_stay_within_cache_cap() {
        let backend = spawn_backend().await;
        let mut state = test_state(&backend.base_url);
        state.max_cached_dates = 3;
        let store = Arc::clone(&state.store);
        let app = router(state);

        for day in 1..=10 {
            let (status, body) = get_json(app.clone(), &format!("/picks?date=2025-02-{day:02}")).await;
            assert_eq!(status, StatusCode::OK, "day={day}");
            assert_eq!(names(&body), ["Cal Raleigh"]);
            assert!(store.len() <= 3, "day={day} cached={}", store.len());
        }
        assert_eq!(backend.hits(), 10);
        let newest = parse_date("2025-02-10").expect("valid date");
        assert!(store.get(newest).is_some());
    }

    #[tokio::test]
    async fn cached_date_is_not_refetched() {
        let backend = spawn_backend().await;
        let app = router(test_state(&backend.base_url));

        for _ in 0..3 {
            let (status, _) = get_json(app.clone(), "/picks?date=2025-02-01").await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(backend.hits(), 1);
    }

    #[tokio::test]
    async fn health_is_degraded_without_data() {
        let mut state = test_state("http://127.0.0.1:9");
        state.store = RowStore::new();
        let (status, body) = get_json(router(state), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["cached_dates"], json!([]));
    }

    #[tokio::test]
    async fn health_lists_cached_dates() {
        let app = router(test_state("http://127.0.0.1:9"));
        let (status, body) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cached_dates"], json!([DATE]));
        assert!(body["last_fetch_ok_at"].is_null());
    }
}
