use chrono::{Duration, NaiveDate};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// API response types (mirror api/routes.rs shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(dead_code)]
pub struct PicksResponse {
    pub date: String,
    pub fetched_at: String,
    pub market: String,
    pub market_label: String,
    pub sort: String,
    pub dir: String,
    pub limit: i64,
    pub total: usize,
    pub matched: usize,
    pub rows: Vec<PickRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct PickRow {
    pub rank: usize,
    pub player_id: Option<i64>,
    pub player_name: String,
    pub team: String,
    pub lineup_slot: Option<u32>,
    pub recent_pa: Option<f64>,
    pub active: MarketView,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct MarketView {
    pub model_prob: Option<f64>,
    pub market_odds: Option<i32>,
    pub fair_odds: Option<i32>,
    pub implied_prob: Option<f64>,
    pub edge: Option<f64>,
    pub score: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    error: String,
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

pub const MARKETS: [(&str, &str); 3] = [("HR", "HR Anytime"), ("H1", "1+ Hit"), ("H2", "2+ Hits")];

pub const SORT_KEYS: [(&str, &str); 6] = [
    ("score", "Score (1–10)"),
    ("model", "Model %"),
    ("edge", "Edge % (vs Market)"),
    ("market", "Market % (implied)"),
    ("fair", "Fair Odds (model)"),
    ("pa", "Recent PA (30d)"),
];

/// `-1` shows everything.
pub const LIMITS: [i64; 6] = [-1, 50, 100, 200, 500, 1000];

pub const THRESHOLD_STEP: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub date: NaiveDate,
    pub market: usize,
    pub sort_key: usize,
    pub descending: bool,
    pub search: String,
    pub starters_only: bool,
    pub top_picks_only: bool,
    pub threshold: f64,
    pub limit: usize,
}

impl Controls {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            market: 0,
            sort_key: 0,
            descending: true,
            search: String::new(),
            starters_only: false,
            top_picks_only: false,
            threshold: 7.0,
            limit: 0,
        }
    }

    pub fn market_code(&self) -> &'static str {
        MARKETS[self.market].0
    }

    pub fn market_label(&self) -> &'static str {
        MARKETS[self.market].1
    }

    pub fn sort_code(&self) -> &'static str {
        SORT_KEYS[self.sort_key].0
    }

    pub fn sort_label(&self) -> &'static str {
        SORT_KEYS[self.sort_key].1
    }

    pub fn limit_value(&self) -> i64 {
        LIMITS[self.limit]
    }

    pub fn cycle_market(&mut self) {
        self.market = (self.market + 1) % MARKETS.len();
    }

    pub fn cycle_sort(&mut self) {
        self.sort_key = (self.sort_key + 1) % SORT_KEYS.len();
    }

    pub fn cycle_limit(&mut self) {
        self.limit = (self.limit + 1) % LIMITS.len();
    }

    pub fn bump_threshold(&mut self, delta: f64) {
        self.threshold = (self.threshold + delta).clamp(1.0, 10.0);
    }

    pub fn shift_date(&mut self, days: i64) {
        self.date += Duration::days(days);
    }

    /// Query string pairs for `GET /picks`.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("date", self.date.format("%Y-%m-%d").to_string()),
            ("market", self.market_code().to_string()),
            ("sort", self.sort_code().to_string()),
            ("dir", if self.descending { "desc" } else { "asc" }.to_string()),
            ("limit", self.limit_value().to_string()),
        ];
        let q = self.search.trim();
        if !q.is_empty() {
            params.push(("q", q.to_string()));
        }
        if self.starters_only {
            params.push(("starters", "true".to_string()));
        }
        if self.top_picks_only {
            params.push(("top_picks", "true".to_string()));
            params.push(("threshold", format!("{:.1}", self.threshold)));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: ConnectionStatus,
    pub controls: Controls,
    pub picks: PicksResponse,
    /// True while the user is typing into the search box.
    pub editing_search: bool,
    pub last_refresh: std::time::Instant,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String, date: NaiveDate) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            controls: Controls::new(date),
            picks: PicksResponse::default(),
            editing_search: false,
            last_refresh: std::time::Instant::now(),
            base_url,
        }
    }

    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let url = format!("{}/picks", self.base_url);
        let resp = match client.get(&url).query(&self.controls.query_params()).send().await {
            Ok(r) => r,
            Err(e) => {
                self.status = ConnectionStatus::Error(format!("{e}"));
                return;
            }
        };

        if !resp.status().is_success() {
            let status = resp.status();
            let msg = match resp.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("HTTP {status}"),
            };
            self.status = ConnectionStatus::Error(msg);
            return;
        }

        match resp.json::<PicksResponse>().await {
            Ok(picks) => {
                self.picks = picks;
                self.status = ConnectionStatus::Connected;
                self.last_refresh = std::time::Instant::now();
            }
            Err(e) => {
                self.status = ConnectionStatus::Error(format!("parse error: {e}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Probability as a percentage with one decimal.
pub fn pct(v: Option<f64>) -> String {
    match v {
        Some(p) => format!("{:.1}%", p * 100.0),
        None => "—".to_string(),
    }
}

/// American odds with an explicit sign on positive prices.
pub fn odds(v: Option<i32>) -> String {
    match v {
        Some(o) if o > 0 => format!("+{o}"),
        Some(o) => o.to_string(),
        None => "—".to_string(),
    }
}

pub fn edge_pct(v: Option<f64>) -> String {
    match v {
        Some(e) => format!("{:.1}%", e * 100.0),
        None => "—".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Value,
    Fade,
}

/// Badge for edges of at least one point either way.
pub fn value_badge(edge: Option<f64>) -> Option<(Badge, String)> {
    let edge_pct = edge? * 100.0;
    if edge_pct >= 1.0 {
        Some((Badge::Value, format!("Value +{edge_pct:.1}%")))
    } else if edge_pct <= -1.0 {
        Some((Badge::Fade, format!("-{:.1}%", edge_pct.abs())))
    } else {
        None
    }
}

pub fn lineup(slot: Option<u32>) -> String {
    slot.map_or("—".to_string(), |s| s.to_string())
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> Controls {
        Controls::new(NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"))
    }

    #[test]
    fn formats_missing_values_as_dash() {
        assert_eq!(pct(None), "—");
        assert_eq!(odds(None), "—");
        assert_eq!(edge_pct(None), "—");
        assert_eq!(lineup(None), "—");
    }

    #[test]
    fn formats_numbers() {
        assert_eq!(pct(Some(0.2137)), "21.4%");
        assert_eq!(odds(Some(150)), "+150");
        assert_eq!(odds(Some(-120)), "-120");
        assert_eq!(edge_pct(Some(-0.1)), "-10.0%");
        assert_eq!(lineup(Some(3)), "3");
    }

    #[test]
    fn badges_need_one_point_of_edge() {
        assert_eq!(value_badge(Some(0.025)), Some((Badge::Value, "Value +2.5%".to_string())));
        assert_eq!(value_badge(Some(-0.04)), Some((Badge::Fade, "-4.0%".to_string())));
        assert_eq!(value_badge(Some(0.005)), None);
        assert_eq!(value_badge(None), None);
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("Ronald Acuña Jr.", 8), "Ronald …");
        assert_eq!(truncate("Soto", 8), "Soto");
    }

    #[test]
    fn default_query_params() {
        let params = controls().query_params();
        assert_eq!(
            params,
            vec![
                ("date", "2025-06-01".to_string()),
                ("market", "HR".to_string()),
                ("sort", "score".to_string()),
                ("dir", "desc".to_string()),
                ("limit", "-1".to_string()),
            ]
        );
    }

    #[test]
    fn query_params_follow_controls() {
        let mut c = controls();
        c.cycle_market();
        c.cycle_sort();
        c.cycle_limit();
        c.descending = false;
        c.search = " judge ".to_string();
        c.starters_only = true;
        c.top_picks_only = true;
        c.bump_threshold(THRESHOLD_STEP);
        c.shift_date(1);

        let params = c.query_params();
        assert!(params.contains(&("date", "2025-06-02".to_string())));
        assert!(params.contains(&("market", "H1".to_string())));
        assert!(params.contains(&("sort", "model".to_string())));
        assert!(params.contains(&("dir", "asc".to_string())));
        assert!(params.contains(&("limit", "50".to_string())));
        assert!(params.contains(&("q", "judge".to_string())));
        assert!(params.contains(&("starters", "true".to_string())));
        assert!(params.contains(&("threshold", "7.5".to_string())));
    }

    #[test]
    fn threshold_stays_on_scale() {
        let mut c = controls();
        for _ in 0..20 {
            c.bump_threshold(THRESHOLD_STEP);
        }
        assert_eq!(c.threshold, 10.0);
        for _ in 0..40 {
            c.bump_threshold(-THRESHOLD_STEP);
        }
        assert_eq!(c.threshold, 1.0);
    }
}
