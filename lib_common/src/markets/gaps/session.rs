//! # Session-Boundary Resolver
//!
//! Maps the current UTC timestamp to the pair of sessions a weekend gap is
//! measured between: the Friday close and the next session's open.
//!
//! A market "reopens" at a cutoff instant attached to each session date. As
//! long as the cutoff of the upcoming session has not been reached, the
//! resolver points at the previous week's pair, so the "next open" reference
//! always designates a session that has already printed.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// When a market is considered open again for a given session date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReopenRule {
    /// The market reopens on `weekday` at `time` (UTC) for the session dated
    /// `session_day`. `weekday` is taken on or before `session_day`.
    ///
    /// Globex futures: the Monday session reopens Sunday 22:00 UTC.
    WeeklyCutoff {
        /// Weekday of the session the gap opens into.
        session_day: Weekday,
        /// Weekday on which the market reopens.
        weekday: Weekday,
        /// Reopening time, UTC.
        time: NaiveTime,
    },
    /// The daily candle dated `session_day` is available from `time` (UTC)
    /// on that same day.
    CandleOffset {
        /// Weekday of the session the gap opens into.
        session_day: Weekday,
        /// Time of day from which the candle is published, UTC.
        time: NaiveTime,
    },
}

/// The two reference sessions of a weekend gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPair {
    /// Most recent Friday strictly before `next_open`.
    pub prior_close: NaiveDate,
    /// Session whose opening price closes the gap.
    pub next_open: NaiveDate,
    /// Instant from which `next_open` counts as opened.
    pub cutoff: DateTime<Utc>,
    /// True when the upcoming session had not reopened yet and the previous
    /// week's pair was selected instead.
    pub rolled_back: bool,
}

impl ReopenRule {
    /// Globex: Monday session, reopening Sunday 22:00 UTC.
    pub fn globex() -> Self {
        Self::WeeklyCutoff {
            session_day: Weekday::Mon,
            weekday: Weekday::Sun,
            time: hm(22, 0),
        }
    }

    /// Minute-candle windows: Sunday session, considered printed once the
    /// 21:55-22:15 UTC opening window is over.
    pub fn minute_sunday() -> Self {
        Self::WeeklyCutoff {
            session_day: Weekday::Sun,
            weekday: Weekday::Sun,
            time: hm(22, 15),
        }
    }

    /// Daily candle providers: Monday candle available from 00:30 UTC.
    pub fn daily_candle() -> Self {
        Self::CandleOffset {
            session_day: Weekday::Mon,
            time: hm(0, 30),
        }
    }

    /// Weekday of the session the gap opens into.
    pub fn session_day(&self) -> Weekday {
        match *self {
            Self::WeeklyCutoff { session_day, .. } | Self::CandleOffset { session_day, .. } => {
                session_day
            }
        }
    }

    /// Instant from which the session dated `session_date` counts as opened.
    pub fn cutoff_for(&self, session_date: NaiveDate) -> DateTime<Utc> {
        let (date, time) = match *self {
            Self::WeeklyCutoff {
                session_day,
                weekday,
                time,
            } => (session_date - Duration::days(days_between(weekday, session_day)), time),
            Self::CandleOffset { time, .. } => (session_date, time),
        };
        Utc.from_utc_datetime(&date.and_time(time))
    }

    /// First session date on or after `now`'s UTC date.
    fn upcoming_session(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = now.date_naive();
        today + Duration::days(days_between(today.weekday(), self.session_day()))
    }
}

/// Resolves the (prior Friday, next session) pair for `now`.
///
/// The boundary is inclusive: at the cutoff instant the upcoming session is
/// selected, one second earlier the previous week's pair is.
pub fn resolve(now: DateTime<Utc>, rule: &ReopenRule) -> SessionPair {
    let upcoming = rule.upcoming_session(now);
    let cutoff = rule.cutoff_for(upcoming);

    let (next_open, rolled_back) = if now >= cutoff {
        (upcoming, false)
    } else {
        (upcoming - Duration::days(7), true)
    };

    SessionPair {
        prior_close: friday_before(next_open),
        next_open,
        cutoff: rule.cutoff_for(next_open),
        rolled_back,
    }
}

/// Returns the reopening instant when `now` falls inside the weekend closure
/// that precedes it: from 00:00 UTC the day after the Friday close up to the
/// cutoff (exclusive). `None` on any other day.
pub fn pre_open(now: DateTime<Utc>, rule: &ReopenRule) -> Option<DateTime<Utc>> {
    let upcoming = rule.upcoming_session(now);
    let cutoff = rule.cutoff_for(upcoming);
    let closure_start = friday_before(upcoming) + Duration::days(1);
    let closure_start = Utc.from_utc_datetime(&closure_start.and_time(NaiveTime::MIN));

    (now >= closure_start && now < cutoff).then_some(cutoff)
}

/// Most recent Friday strictly before `date`.
pub fn friday_before(date: NaiveDate) -> NaiveDate {
    let back = match days_between(Weekday::Fri, date.weekday()) {
        0 => 7,
        n => n,
    };
    date - Duration::days(back)
}

/// Days to walk forward from `from` to reach `to` (0..=6).
fn days_between(from: Weekday, to: Weekday) -> i64 {
    i64::from((to.num_days_from_monday() + 7 - from.num_days_from_monday()) % 7)
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-01-07 is a Sunday, 2024-01-08 a Monday.

    #[test]
    fn test_cutoff_is_inclusive() {
        let pair = resolve(utc(2024, 1, 7, 22, 0, 0), &ReopenRule::globex());
        assert_eq!(pair.prior_close, date(2024, 1, 5));
        assert_eq!(pair.next_open, date(2024, 1, 8));
        assert!(!pair.rolled_back);
    }

    #[test]
    fn test_one_second_before_cutoff_selects_previous_week() {
        let pair = resolve(utc(2024, 1, 7, 21, 59, 59), &ReopenRule::globex());
        assert_eq!(pair.prior_close, date(2023, 12, 29));
        assert_eq!(pair.next_open, date(2024, 1, 1));
        assert!(pair.rolled_back);
    }

    #[test]
    fn test_sunday_2159_selects_previous_week() {
        let pair = resolve(utc(2024, 1, 7, 21, 59, 0), &ReopenRule::globex());
        assert_eq!(pair.next_open, date(2024, 1, 1));
        assert_eq!(pair.prior_close, date(2023, 12, 29));
    }

    #[test]
    fn test_midweek_points_at_this_weeks_monday() {
        let pair = resolve(utc(2024, 1, 10, 12, 0, 0), &ReopenRule::globex());
        assert_eq!(pair.prior_close, date(2024, 1, 5));
        assert_eq!(pair.next_open, date(2024, 1, 8));
        assert_eq!(pair.cutoff, utc(2024, 1, 7, 22, 0, 0));
    }

    #[test]
    fn test_candle_offset_rule() {
        let rule = ReopenRule::daily_candle();
        let early = resolve(utc(2024, 1, 8, 0, 29, 59), &rule);
        assert_eq!(early.next_open, date(2024, 1, 1));

        let ready = resolve(utc(2024, 1, 8, 0, 30, 0), &rule);
        assert_eq!(ready.next_open, date(2024, 1, 8));
        assert_eq!(ready.prior_close, date(2024, 1, 5));
    }

    #[test]
    fn test_sunday_session_rule() {
        let rule = ReopenRule::minute_sunday();
        let pair = resolve(utc(2024, 1, 7, 22, 15, 0), &rule);
        assert_eq!(pair.next_open, date(2024, 1, 7));
        assert_eq!(pair.prior_close, date(2024, 1, 5));

        let before = resolve(utc(2024, 1, 7, 22, 14, 0), &rule);
        assert_eq!(before.next_open, date(2023, 12, 31));
        assert_eq!(before.prior_close, date(2023, 12, 29));
    }

    #[test]
    fn test_pair_invariants_over_two_weeks() {
        let rules = [
            ReopenRule::globex(),
            ReopenRule::minute_sunday(),
            ReopenRule::daily_candle(),
        ];
        let start = utc(2024, 1, 1, 0, 0, 0);
        for rule in rules {
            for step in 0..(14 * 24 * 4) {
                let now = start + Duration::minutes(15 * step);
                let pair = resolve(now, &rule);

                assert_eq!(pair.prior_close.weekday(), Weekday::Fri);
                assert_eq!(pair.next_open.weekday(), rule.session_day());
                assert!(pair.prior_close < pair.next_open);
                assert!((pair.next_open - pair.prior_close).num_days() < 7);
                assert!(rule.cutoff_for(pair.next_open) <= now, "{now}");
                assert!(now < rule.cutoff_for(pair.next_open + Duration::days(7)), "{now}");
            }
        }
    }

    #[test]
    fn test_pre_open_window() {
        let rule = ReopenRule::globex();
        let reopen = utc(2024, 1, 7, 22, 0, 0);

        assert_eq!(pre_open(utc(2024, 1, 6, 0, 0, 0), &rule), Some(reopen));
        assert_eq!(pre_open(utc(2024, 1, 7, 21, 59, 59), &rule), Some(reopen));
        assert_eq!(pre_open(utc(2024, 1, 7, 22, 0, 0), &rule), None);
        assert_eq!(pre_open(utc(2024, 1, 5, 23, 0, 0), &rule), None);
        assert_eq!(pre_open(utc(2024, 1, 10, 9, 0, 0), &rule), None);
    }

    #[test]
    fn test_friday_before() {
        assert_eq!(friday_before(date(2024, 1, 8)), date(2024, 1, 5));
        assert_eq!(friday_before(date(2024, 1, 7)), date(2024, 1, 5));
        assert_eq!(friday_before(date(2024, 1, 5)), date(2023, 12, 29));
    }

    #[test]
    fn test_rule_deserializes_from_json() {
        let rule: ReopenRule = serde_json::from_str(
            r#"{"kind":"weekly-cutoff","session_day":"Mon","weekday":"Sun","time":"22:00:00"}"#,
        )
        .unwrap();
        assert_eq!(rule, ReopenRule::globex());
    }
}
