use crate::error::{AppError, Result};
use crate::scorer::ScoreParams;

pub const DATA_API_BASE: &str = "http://localhost:8000";

/// Backend refresh interval (seconds). The dashboard re-pulls rows every 5 minutes.
pub const REFRESH_INTERVAL_SECS: u64 = 300;

/// Timeout for a single backend fetch (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Maximum number of game dates kept in the snapshot store.
pub const MAX_CACHED_DATES: usize = 7;

/// Default minimum score for the top-picks filter.
pub const DEFAULT_TOP_PICK_THRESHOLD: f64 = 7.0;

/// Scoring constants. Empirical; kept as-is and overridable through `Config`.
pub mod scoring {
    /// `base = p^CURVE_EXPONENT`
    pub const CURVE_EXPONENT: f64 = 0.6;
    /// Weight of the probability curve on the 1–10 scale.
    pub const PROBABILITY_WEIGHT: f64 = 8.0;
    /// Points per unit of capped edge. With `EDGE_CAP` this bounds the market swing to ±1.5.
    pub const EDGE_SCALE: f64 = 6.0;
    /// Edge is clamped to ±EDGE_CAP before scaling (scoring only, never for display).
    pub const EDGE_CAP: f64 = 0.25;
    pub const SCORE_MIN: f64 = 1.0;
    pub const SCORE_MAX: f64 = 10.0;
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL; rows come from `{base}/markets?date=YYYY-MM-DD` (DATA_API_BASE)
    pub data_api_base: String,
    /// Bearer token forwarded to the backend, if any (DATA_API_TOKEN)
    pub data_api_token: Option<String>,
    pub log_level: String,
    pub api_port: u16,
    pub refresh_interval_secs: u64,
    pub max_cached_dates: usize,
    /// Scoring constants (SCORE_CURVE_EXPONENT, SCORE_EDGE_SCALE, SCORE_EDGE_CAP)
    pub score: ScoreParams,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let score = ScoreParams {
            curve_exponent: env_f64("SCORE_CURVE_EXPONENT", scoring::CURVE_EXPONENT)?,
            edge_scale: env_f64("SCORE_EDGE_SCALE", scoring::EDGE_SCALE)?,
            edge_cap: env_f64("SCORE_EDGE_CAP", scoring::EDGE_CAP)?,
        };
        score.validate()?;

        Ok(Self {
            data_api_base: std::env::var("DATA_API_BASE")
                .unwrap_or_else(|_| DATA_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            data_api_token: std::env::var("DATA_API_TOKEN")
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            refresh_interval_secs: std::env::var("REFRESH_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or(REFRESH_INTERVAL_SECS),
            max_cached_dates: std::env::var("MAX_CACHED_DATES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(MAX_CACHED_DATES),
            score,
        })
    }
}

fn env_f64(key: &str, default: f64) -> Result<f64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::Config(format!("{key} must be a number, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}
