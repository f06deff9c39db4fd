//! # Yahoo Chart Model
//!
//! Strongly-typed view of the `v8/finance/chart` payload and the pure
//! functions that pick the two reference prices out of it.
//!
//! Yahoo returns parallel arrays: `timestamp[i]` belongs to
//! `indicators.quote[0].open[i]` / `close[i]`, and any value may be `null`
//! when no trade printed in that bar.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

/// Top-level object: `{"chart": {...}}`.
#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    /// The chart section.
    pub chart: Chart,
}

/// Either a result list or an error object.
#[derive(Debug, Deserialize)]
pub struct Chart {
    /// Usually a single-element list.
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    /// Present when Yahoo rejected the query.
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// In-body error, e.g. `{"code": "Not Found", "description": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ChartError {
    /// Short error code.
    pub code: String,
    /// Human readable explanation.
    #[serde(default)]
    pub description: Option<String>,
}

/// Chart of one symbol.
#[derive(Debug, Deserialize)]
pub struct ChartResult {
    /// Symbol metadata.
    pub meta: ChartMeta,
    /// Bar start times, Unix seconds. Absent when there is no bar at all.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    /// Price series.
    pub indicators: Indicators,
}

/// Subset of `meta` used here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    /// Symbol echoed by Yahoo.
    #[serde(default)]
    pub symbol: Option<String>,
    /// IANA name of the exchange timezone, e.g. `America/New_York`.
    #[serde(default)]
    pub exchange_timezone_name: Option<String>,
}

/// Indicator block.
#[derive(Debug, Deserialize)]
pub struct Indicators {
    /// OHLC series; only the first entry is meaningful.
    #[serde(default)]
    pub quote: Vec<Quote>,
}

/// Open and close series, aligned with `timestamp`.
#[derive(Debug, Default, Deserialize)]
pub struct Quote {
    /// Opening prices.
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    /// Closing prices.
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

/// One bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    /// Bar start, UTC.
    pub time: DateTime<Utc>,
    /// Opening price, if any trade printed.
    pub open: Option<f64>,
    /// Closing price, if any trade printed.
    pub close: Option<f64>,
}

impl ChartResult {
    /// Exchange timezone, UTC when absent or unknown to chrono-tz.
    pub fn exchange_tz(&self) -> Tz {
        self.meta
            .exchange_timezone_name
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(Tz::UTC)
    }

    /// Zips timestamps with the first quote series. Bars whose timestamp
    /// is out of range are dropped.
    pub fn candles(&self) -> Vec<Candle> {
        let empty = Quote::default();
        let quote = self.indicators.quote.first().unwrap_or(&empty);

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, ts)| {
                let time = Utc.timestamp_opt(*ts, 0).single()?;
                Some(Candle {
                    time,
                    open: quote.open.get(i).copied().flatten(),
                    close: quote.close.get(i).copied().flatten(),
                })
            })
            .collect()
    }

    /// Close of the `prior_close` daily bar and open of the `next_open`
    /// daily bar, bars being dated in the exchange timezone.
    pub fn daily_prices(
        &self,
        prior_close: NaiveDate,
        next_open: NaiveDate,
    ) -> (Option<f64>, Option<f64>) {
        let tz = self.exchange_tz();
        let candles = self.candles();
        let on = |date: NaiveDate| {
            candles
                .iter()
                .find(|c| c.time.with_timezone(&tz).date_naive() == date)
        };

        (
            on(prior_close).and_then(|c| c.close),
            on(next_open).and_then(|c| c.open),
        )
    }
}

/// Last non-null close with `from <= time <= to`.
pub fn last_close_between(
    candles: &[Candle],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Option<f64> {
    candles
        .iter()
        .rev()
        .filter(|c| c.time >= from && c.time <= to)
        .find_map(|c| c.close)
}

/// First non-null open with `from <= time <= to`.
pub fn first_open_between(
    candles: &[Candle],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Option<f64> {
    candles
        .iter()
        .filter(|c| c.time >= from && c.time <= to)
        .find_map(|c| c.open)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Thu 4, Fri 5 and Mon 8 January 2024, 00:00 New York time.
    const DAILY: &str = r#"{"chart":{"result":[{
        "meta":{"symbol":"GC=F","exchangeTimezoneName":"America/New_York"},
        "timestamp":[1704344400,1704430800,1704690000],
        "indicators":{"quote":[{
            "open":[2043.0,2049.1,2047.5],
            "close":[2049.4,2052.3,null]
        }]}
    }],"error":null}}"#;

    fn parse(raw: &str) -> ChartResult {
        let envelope: ChartEnvelope = serde_json::from_str(raw).unwrap();
        envelope.chart.result.unwrap().into_iter().next().unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_daily_prices_match_exchange_dates() {
        let chart = parse(DAILY);
        assert_eq!(chart.exchange_tz(), chrono_tz::America::New_York);
        assert_eq!(chart.daily_prices(date(5), date(8)), (Some(2052.3), Some(2047.5)));
    }

    #[test]
    fn test_daily_prices_missing_days() {
        let chart = parse(DAILY);
        // No bar on the 1st, null close on the 8th.
        assert_eq!(chart.daily_prices(date(8), date(1)), (None, None));
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc() {
        let chart = parse(
            r#"{"chart":{"result":[{"meta":{"exchangeTimezoneName":"Mars/Olympus"},
            "timestamp":[1704495600],"indicators":{"quote":[{"open":[1.0],"close":[2.0]}]}}]}}"#,
        );
        assert_eq!(chart.exchange_tz(), Tz::UTC);
        // 23:00 UTC on the 5th stays on the 5th.
        assert_eq!(chart.daily_prices(date(5), date(5)), (Some(2.0), Some(1.0)));
    }

    #[test]
    fn test_missing_series_yield_empty_candles() {
        let chart = parse(r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[]}}]}}"#);
        assert!(chart.candles().is_empty());
        assert_eq!(chart.daily_prices(date(5), date(8)), (None, None));
    }

    #[test]
    fn test_minute_windows() {
        let chart = parse(
            r#"{"chart":{"result":[{"meta":{"exchangeTimezoneName":"America/New_York"},
            "timestamp":[1704491940,1704492000,1704495600,1704664800,1704664860,1704668400],
            "indicators":{"quote":[{
                "open":[2050.0,2051.0,2052.0,null,2060.5,2061.0],
                "close":[2050.8,null,2052.5,2060.0,2060.9,2061.2]
            }]}}]}}"#,
        );
        let candles = chart.candles();

        let fri_from = Utc.with_ymd_and_hms(2024, 1, 5, 20, 0, 0).unwrap();
        let fri_to = Utc.with_ymd_and_hms(2024, 1, 5, 22, 30, 0).unwrap();
        // 22:00 has a null close, 23:00 is out of the window.
        assert_eq!(last_close_between(&candles, fri_from, fri_to), Some(2050.8));

        let sun_from = Utc.with_ymd_and_hms(2024, 1, 7, 21, 55, 0).unwrap();
        let sun_to = Utc.with_ymd_and_hms(2024, 1, 7, 22, 15, 0).unwrap();
        // 22:00 has a null open.
        assert_eq!(first_open_between(&candles, sun_from, sun_to), Some(2060.5));

        let empty_from = Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap();
        let empty_to = Utc.with_ymd_and_hms(2024, 1, 6, 23, 0, 0).unwrap();
        assert_eq!(first_open_between(&candles, empty_from, empty_to), None);
    }
}
