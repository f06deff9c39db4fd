//! Finnhub `PriceProvider`: daily candles matched by their UTC date.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use super::apicall::{ApiCallFinnhub, DailyCandle};
use crate::markets::gaps::provider::{FetchError, PriceProvider, SessionPrices};
use crate::markets::gaps::session::{ReopenRule, SessionPair};

/// Daily-candle strategy on Finnhub.
#[derive(Debug, Clone)]
pub struct FinnhubDaily {
    api: ApiCallFinnhub,
}

impl FinnhubDaily {
    /// Wraps an authenticated candle client.
    pub fn new(api: ApiCallFinnhub) -> Self {
        Self { api }
    }
}

impl PriceProvider for FinnhubDaily {
    fn name(&self) -> &'static str {
        "finnhub"
    }

    fn default_rule(&self) -> ReopenRule {
        ReopenRule::daily_candle()
    }

    async fn session_prices(
        &self,
        symbol: &str,
        pair: &SessionPair,
    ) -> Result<SessionPrices, FetchError> {
        let from = midnight(pair.prior_close - Duration::days(3));
        let to = midnight(pair.next_open + Duration::days(1));
        let candles = self.api.fetch_daily(symbol, from, to).await?;

        Ok(SessionPrices {
            symbol: symbol.to_string(),
            close: on_date(&candles, pair.prior_close).map(|c| c.close),
            open: on_date(&candles, pair.next_open).map(|c| c.open),
        })
    }
}

fn on_date(candles: &[DailyCandle], date: NaiveDate) -> Option<&DailyCandle> {
    candles
        .iter()
        .find(|c| c.time.date_naive() == date && c.open.is_finite() && c.close.is_finite())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
