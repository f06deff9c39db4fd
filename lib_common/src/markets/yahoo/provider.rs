//! Yahoo-backed `PriceProvider` strategies.
//!
//! - `YahooDaily`: daily candles, Friday close vs. Monday open, Globex
//!   reopening rule.
//! - `YahooMinute`: one-minute bars around the Friday close (20:00-22:30
//!   UTC) and the Sunday reopening (21:55-22:15 UTC).

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use super::apicall::{ApiCallYahoo, Interval};
use super::chart::{first_open_between, last_close_between};
use crate::markets::gaps::provider::{FetchError, PriceProvider, SessionPrices};
use crate::markets::gaps::session::{ReopenRule, SessionPair};

/// Daily-candle strategy.
#[derive(Debug, Clone)]
pub struct YahooDaily {
    api: ApiCallYahoo,
}

impl YahooDaily {
    /// Wraps a chart client.
    pub fn new(api: ApiCallYahoo) -> Self {
        Self { api }
    }
}

impl PriceProvider for YahooDaily {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn default_rule(&self) -> ReopenRule {
        ReopenRule::globex()
    }

    async fn session_prices(
        &self,
        symbol: &str,
        pair: &SessionPair,
    ) -> Result<SessionPrices, FetchError> {
        // Generous window: three days before the Friday, one after the open.
        let from = midnight(pair.prior_close - Duration::days(3));
        let to = midnight(pair.next_open + Duration::days(1));

        let chart = self.api.fetch_chart(symbol, from, to, Interval::Day).await?;
        let (close, open) = chart.daily_prices(pair.prior_close, pair.next_open);

        Ok(SessionPrices {
            symbol: symbol.to_string(),
            close,
            open,
        })
    }
}

/// Minute-window strategy.
#[derive(Debug, Clone)]
pub struct YahooMinute {
    api: ApiCallYahoo,
}

impl YahooMinute {
    /// Wraps a chart client.
    pub fn new(api: ApiCallYahoo) -> Self {
        Self { api }
    }
}

impl PriceProvider for YahooMinute {
    fn name(&self) -> &'static str {
        "yahoo-minute"
    }

    fn default_rule(&self) -> ReopenRule {
        ReopenRule::minute_sunday()
    }

    async fn session_prices(
        &self,
        symbol: &str,
        pair: &SessionPair,
    ) -> Result<SessionPrices, FetchError> {
        let (close_from, close_to) = (at(pair.prior_close, 20, 0), at(pair.prior_close, 22, 30));
        let (open_from, open_to) = (at(pair.next_open, 21, 55), at(pair.next_open, 22, 15));

        let friday = self
            .api
            .fetch_chart(symbol, close_from, close_to, Interval::Minute)
            .await?;
        let close = last_close_between(&friday.candles(), close_from, close_to);

        let reopen = self
            .api
            .fetch_chart(symbol, open_from, open_to, Interval::Minute)
            .await?;
        let open = first_open_between(&reopen.candles(), open_from, open_to);

        Ok(SessionPrices {
            symbol: symbol.to_string(),
            close,
            open,
        })
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&date.and_time(time))
}
