//! IG historical prices as a `PriceProvider`.
//!
//! `GET prices/{epic}?resolution=DAY&from=..&to=..` (`Version: 3`). Each
//! entry of `prices[]` carries bid/ask/lastTraded for open and close; the
//! bid side is used, matching what the IG charts show.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use super::session::IgSession;
use crate::markets::gaps::provider::{FetchError, PriceProvider, SessionPrices};
use crate::markets::gaps::session::{ReopenRule, SessionPair};

const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Deserialize)]
struct PricesPayload {
    #[serde(default)]
    prices: Vec<PricePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricePoint {
    #[serde(rename = "snapshotTimeUTC")]
    snapshot_time_utc: NaiveDateTime,
    open_price: PriceSide,
    close_price: PriceSide,
}

#[derive(Debug, Deserialize)]
struct PriceSide {
    bid: Option<f64>,
}

/// Daily candles of IG EPICs, bid side.
#[derive(Debug, Clone)]
pub struct IgPrices {
    session: IgSession,
}

impl IgPrices {
    /// Prices are read through an already opened session.
    pub fn new(session: IgSession) -> Self {
        Self { session }
    }
}

impl PriceProvider for IgPrices {
    fn name(&self) -> &'static str {
        "ig"
    }

    fn default_rule(&self) -> ReopenRule {
        ReopenRule::daily_candle()
    }

    async fn session_prices(
        &self,
        symbol: &str,
        pair: &SessionPair,
    ) -> Result<SessionPrices, FetchError> {
        let from = (pair.prior_close - Duration::days(3)).and_time(NaiveTime::MIN);
        let to = (pair.next_open + Duration::days(1)).and_time(NaiveTime::MIN);
        let query = [
            ("resolution", "DAY".to_string()),
            ("from", from.format(QUERY_TIME_FORMAT).to_string()),
            ("to", to.format(QUERY_TIME_FORMAT).to_string()),
        ];
        let headers = self
            .session
            .headers(3)
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        let response = self
            .session
            .client()
            .get::<PricesPayload>(&format!("prices/{}", symbol), &query, Some(headers))
            .await
            .map_err(FetchError::from_client_error)?;

        if !response.success {
            let body = response.error_body.unwrap_or_default();
            if response.status == 404 || body.contains("epic.unavailable") {
                return Err(FetchError::SymbolNotFound(symbol.to_string()));
            }
            log::warn!("IG prices {} answered HTTP {}: {}", symbol, response.status, body);
            return Err(FetchError::Http {
                status: response.status,
            });
        }

        let payload = response.data.ok_or(FetchError::NoData)?;
        if payload.prices.is_empty() {
            return Err(FetchError::NoData);
        }

        let on = |date: NaiveDate| {
            payload
                .prices
                .iter()
                .find(|p| p.snapshot_time_utc.date() == date)
        };

        Ok(SessionPrices {
            symbol: symbol.to_string(),
            close: on(pair.prior_close).and_then(|p| p.close_price.bid),
            open: on(pair.next_open).and_then(|p| p.open_price.bid),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::ig::session::IgCredentials;
    use crate::mock_http::{MockResponse, MockServer};
    use crate::retrieve::ky_http::ApiClient;

    fn pair() -> SessionPair {
        use chrono::{TimeZone, Utc};
        SessionPair {
            prior_close: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            next_open: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            cutoff: Utc.with_ymd_and_hms(2024, 1, 8, 0, 30, 0).unwrap(),
            rolled_back: false,
        }
    }

    async fn provider(server: &MockServer) -> IgPrices {
        let timeout = std::time::Duration::from_secs(5);
        let client = ApiClient::new(&server.base_url(), None, timeout).unwrap();
        let credentials =
            IgCredentials::from_settings(Some("app-key"), Some("trader"), Some("pw")).unwrap();
        let session = IgSession::login(client, &credentials, false).await.unwrap();
        IgPrices::new(session)
    }

    fn login_ok() -> MockResponse {
        MockResponse::json(200, "{}")
            .with_header("CST", "cst-token")
            .with_header("X-SECURITY-TOKEN", "xst-token")
    }

    #[tokio::test]
    async fn test_bid_prices_of_friday_and_monday() {
        let server = MockServer::start(vec![
            login_ok(),
            MockResponse::json(
                200,
                r#"{"prices":[
                    {"snapshotTime":"2024/01/05 00:00:00","snapshotTimeUTC":"2024-01-05T00:00:00",
                     "openPrice":{"bid":2043.1,"ask":2043.6,"lastTraded":null},
                     "closePrice":{"bid":2045.2,"ask":2045.7,"lastTraded":null}},
                    {"snapshotTime":"2024/01/08 00:00:00","snapshotTimeUTC":"2024-01-08T00:00:00",
                     "openPrice":{"bid":2047.9,"ask":2048.4,"lastTraded":null},
                     "closePrice":{"bid":2030.0,"ask":2030.5,"lastTraded":null}}
                ],"instrumentType":"COMMODITIES"}"#,
            ),
        ]);
        let provider = provider(&server).await;

        let prices = provider
            .session_prices("CS.D.CFDGOLD.CFDGC.IP", &pair())
            .await
            .unwrap();
        assert_eq!(prices.close, Some(2045.2));
        assert_eq!(prices.open, Some(2047.9));

        let requests = server.finish();
        let call = requests[1].to_lowercase();
        assert!(call.starts_with(
            "get /prices/cs.d.cfdgold.cfdgc.ip?resolution=day&from=2024-01-02t00%3a00%3a00&to=2024-01-09t00%3a00%3a00 "
        ));
        assert!(call.contains("cst: cst-token"));
        assert!(call.contains("x-security-token: xst-token"));
        assert!(call.contains("version: 3"));
    }

    #[tokio::test]
    async fn test_unknown_epic_and_empty_prices() {
        let server = MockServer::start(vec![
            login_ok(),
            MockResponse::json(
                404,
                r#"{"errorCode":"error.service.marketdata.instrument.epic.unavailable"}"#,
            ),
            MockResponse::json(200, r#"{"prices":[]}"#),
        ]);
        let provider = provider(&server).await;

        assert_eq!(
            provider.session_prices("IX.D.NOPE.IP", &pair()).await.unwrap_err(),
            FetchError::SymbolNotFound("IX.D.NOPE.IP".into())
        );
        assert_eq!(
            provider.session_prices("IX.D.DAX.IFD.IP", &pair()).await.unwrap_err(),
            FetchError::NoData
        );
        server.finish();
    }
}
