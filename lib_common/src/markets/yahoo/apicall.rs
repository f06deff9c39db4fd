//! # Yahoo Chart API Client
//!
//! Wraps the generic `ApiClient` with the Yahoo base URL and turns every
//! failure mode of the chart endpoint into a `FetchError`:
//!
//! - transport failures and undecodable bodies (`Network` / `Malformed`),
//! - `404` answers, which Yahoo uses for unknown tickers (`SymbolNotFound`),
//! - other non-2xx statuses (`Http`),
//! - the in-body `chart.error` object and empty `chart.result` arrays.
//!
//! There is no retry loop: a failed call is reported once and the run moves
//! on to the next instrument.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::chart::{ChartEnvelope, ChartResult};
use crate::markets::gaps::provider::FetchError;
use crate::retrieve::ky_http::ApiClient;

/// Production base URL of the chart API.
pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com/";

/// Candle resolution requested from the chart API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// One candle per trading day.
    Day,
    /// One candle per minute (only the last few weeks are served).
    Minute,
}

impl Interval {
    /// Query-string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Day => "1d",
            Interval::Minute => "1m",
        }
    }
}

/// # Yahoo API Call Client
///
/// One instance per run, shared by the daily and minute providers.
#[derive(Debug, Clone)]
pub struct ApiCallYahoo {
    client: ApiClient,
}

impl ApiCallYahoo {
    /// Client against the production endpoint.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_url(YAHOO_BASE_URL, timeout)
    }

    /// Client against an arbitrary base URL (tests, proxies).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: ApiClient::new(base_url, None, timeout)?,
        })
    }

    /// Fetches the chart of `symbol` between `from` and `to`.
    ///
    /// # Errors
    /// See the module documentation for the mapping of each failure.
    pub async fn fetch_chart(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        interval: Interval,
    ) -> Result<ChartResult, FetchError> {
        let path = format!("v8/finance/chart/{}", symbol);
        let query = [
            ("period1", from.timestamp().to_string()),
            ("period2", to.timestamp().to_string()),
            ("interval", interval.as_str().to_string()),
        ];

        log::debug!(
            "Yahoo chart {} [{} -> {}] interval={}",
            symbol,
            from,
            to,
            interval.as_str()
        );

        let response = self
            .client
            .get::<ChartEnvelope>(&path, &query, None)
            .await
            .map_err(FetchError::from_client_error)?;

        if response.status == 404 {
            return Err(FetchError::SymbolNotFound(symbol.to_string()));
        }
        if !response.success {
            log::warn!(
                "Yahoo chart {} answered HTTP {}: {}",
                symbol,
                response.status,
                response.error_body.as_deref().unwrap_or("").chars().take(150).collect::<String>()
            );
            return Err(FetchError::Http {
                status: response.status,
            });
        }

        let envelope = response
            .data
            .ok_or_else(|| FetchError::Malformed("empty chart body".to_string()))?;

        if let Some(error) = envelope.chart.error {
            if error.code.eq_ignore_ascii_case("Not Found") {
                return Err(FetchError::SymbolNotFound(symbol.to_string()));
            }
            return Err(FetchError::Malformed(format!(
                "{}: {}",
                error.code,
                error.description.unwrap_or_default()
            )));
        }

        envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or(FetchError::NoData)
    }
}
