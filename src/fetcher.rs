use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::{Config, HTTP_TIMEOUT_SECS};
use crate::error::{AppError, Result};
use crate::resolver::{resolve_batch, ResolvedBatch};

/// Pulls the per-player row array for one game date from the backend.
pub struct RowFetcher {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RowFetcher {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.data_api_base.clone(),
            token: cfg.data_api_token.clone(),
        })
    }

    pub fn markets_url(&self, date: NaiveDate) -> String {
        format!("{}/markets?date={}", self.base_url, format_date(date))
    }

    /// GET `{base}/markets?date=YYYY-MM-DD` and resolve the payload.
    ///
    /// Transport errors and non-2xx responses are errors. A payload that is not
    /// a JSON array resolves to zero rows.
    pub async fn fetch(&self, date: NaiveDate) -> Result<ResolvedBatch> {
        let url = self.markets_url(date);
        debug!(%url, "fetching rows");

        let mut req = self.client.get(&url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "GET /markets for {date} returned HTTP {status}"
            )));
        }

        let payload: serde_json::Value = resp.json().await?;
        if !payload.is_array() {
            warn!(%date, "backend /markets response was not an array; treating as empty");
        }

        let batch = resolve_batch(&payload);
        let s = &batch.stats;
        info!(
            %date,
            rows = batch.rows.len(),
            current = s.current_schema,
            legacy = s.legacy_schema,
            unknown = s.unknown_schema,
            skipped = s.skipped,
            "Fetched {} rows for {date} ({} current, {} legacy, {} unknown schema, {} skipped)",
            batch.rows.len(),
            s.current_schema,
            s.legacy_schema,
            s.unknown_schema,
            s.skipped,
        );
        Ok(batch)
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse a `YYYY-MM-DD` game date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidParam(format!("date must be YYYY-MM-DD, got {s:?}")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today's game date in local time.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
