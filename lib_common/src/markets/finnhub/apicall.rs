//! # Finnhub API Client
//!
//! Token-authenticated access to the `stock/candle` and `forex/candle`
//! endpoints. The payload uses parallel arrays (`o`, `c`, `t`) and a status
//! field `s` which is `"ok"` or `"no_data"`.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::markets::gaps::provider::FetchError;
use crate::retrieve::ky_http::ApiClient;

/// Production base URL.
pub const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1/";

/// Raw candle payload.
#[derive(Debug, Deserialize)]
pub struct CandlePayload {
    /// `"ok"` when candles are present.
    pub s: String,
    /// Opening prices.
    #[serde(default)]
    pub o: Vec<f64>,
    /// Closing prices.
    #[serde(default)]
    pub c: Vec<f64>,
    /// Candle timestamps, Unix seconds.
    #[serde(default)]
    pub t: Vec<i64>,
}

/// One daily candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyCandle {
    /// Candle time, UTC.
    pub time: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Closing price.
    pub close: f64,
}

impl CandlePayload {
    /// Zips the parallel arrays, truncating to the shortest one.
    pub fn candles(&self) -> Vec<DailyCandle> {
        self.t
            .iter()
            .zip(self.o.iter().zip(self.c.iter()))
            .filter_map(|(ts, (open, close))| {
                Some(DailyCandle {
                    time: Utc.timestamp_opt(*ts, 0).single()?,
                    open: *open,
                    close: *close,
                })
            })
            .collect()
    }
}

/// Candle endpoint for `symbol`.
pub fn candle_path(symbol: &str) -> &'static str {
    if symbol.contains(':') {
        "forex/candle"
    } else {
        "stock/candle"
    }
}

/// # Finnhub API Call Client
#[derive(Debug, Clone)]
pub struct ApiCallFinnhub {
    client: ApiClient,
    token: String,
}

impl ApiCallFinnhub {
    /// Client against the production endpoint.
    pub fn new(token: &str, timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_url(FINNHUB_BASE_URL, token, timeout)
    }

    /// Client against an arbitrary base URL.
    pub fn with_base_url(base_url: &str, token: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: ApiClient::new(base_url, None, timeout)?,
            token: token.to_string(),
        })
    }

    /// Daily candles of `symbol` between `from` and `to`.
    pub async fn fetch_daily(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailyCandle>, FetchError> {
        let query = [
            ("symbol", symbol.to_string()),
            ("resolution", "D".to_string()),
            ("from", from.timestamp().to_string()),
            ("to", to.timestamp().to_string()),
            ("token", self.token.clone()),
        ];

        let response = self
            .client
            .get::<CandlePayload>(candle_path(symbol), &query, None)
            .await
            .map_err(FetchError::from_client_error)?;

        if !response.success {
            log::warn!("Finnhub {} answered HTTP {}", symbol, response.status);
            return Err(FetchError::Http {
                status: response.status,
            });
        }

        let payload = response
            .data
            .ok_or_else(|| FetchError::Malformed("empty candle body".to_string()))?;
        if payload.s != "ok" {
            log::warn!("Finnhub {} status '{}'", symbol, payload.s);
            return Err(FetchError::NoData);
        }

        Ok(payload.candles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_http::{MockResponse, MockServer};

    #[test]
    fn test_candle_path_routing() {
        assert_eq!(candle_path("OANDA:XAU_USD"), "forex/candle");
        assert_eq!(candle_path("^GDAXI"), "stock/candle");
    }

    #[test]
    fn test_candles_truncate_to_shortest_series() {
        let payload: CandlePayload =
            serde_json::from_str(r#"{"s":"ok","o":[1.0,2.0],"c":[1.5],"t":[1704412800,1704672000]}"#)
                .unwrap();
        let candles = payload.candles();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].close, 1.5);
    }

    #[tokio::test]
    async fn test_no_data_status() {
        let server = MockServer::start(vec![
            MockResponse::json(200, r#"{"s":"no_data"}"#),
            MockResponse::json(403, r#"{"error":"You don't have access to this resource."}"#),
        ]);
        let timeout = Duration::from_secs(5);
        let api = ApiCallFinnhub::with_base_url(&server.base_url(), "secret", timeout).unwrap();
        let from = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap();

        assert_eq!(api.fetch_daily("^NDX", from, to).await.unwrap_err(), FetchError::NoData);
        assert_eq!(
            api.fetch_daily("OANDA:XAU_USD", from, to).await.unwrap_err(),
            FetchError::Http { status: 403 }
        );

        let requests = server.finish();
        assert!(requests[0].starts_with("GET /stock/candle?symbol=%5ENDX&resolution=D&"));
        assert!(requests[0].contains("token=secret"));
        assert!(requests[1].starts_with("GET /forex/candle?symbol=OANDA%3AXAU_USD&"));
    }
}
