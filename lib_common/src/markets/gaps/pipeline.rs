//! # Gap Pipeline
//!
//! Sequential run over the configured instruments: resolve the session pair,
//! ask the provider for both prices (walking aliases on unknown symbols),
//! compute the gap. A failure on one instrument becomes a value in the result
//! list and never stops the others.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::calculator::{compute_gap, GapOutcome};
use super::instruments::Instrument;
use super::provider::{FetchError, PriceProvider};
use super::report::InstrumentReport;
use super::session::{self, ReopenRule};

/// What to do when the job fires while the market is still closed for the
/// weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreOpenPolicy {
    /// Post a "not open yet" note and stop.
    #[default]
    Notify,
    /// Log and stop silently.
    Skip,
    /// Report the previous week's gap.
    PreviousWeek,
}

impl FromStr for PreOpenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "notify" => Ok(Self::Notify),
            "skip" => Ok(Self::Skip),
            "previous-week" | "previous_week" => Ok(Self::PreviousWeek),
            other => Err(format!(
                "unknown pre-open policy '{}' (expected notify, skip or previous-week)",
                other
            )),
        }
    }
}

impl fmt::Display for PreOpenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Notify => "notify",
            Self::Skip => "skip",
            Self::PreviousWeek => "previous-week",
        };
        f.write_str(name)
    }
}

/// Outcome of the pre-open check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStep {
    /// Compute and send the report.
    Proceed,
    /// Market closed: send the pre-open note.
    Notify {
        /// Latest reopening instant among the instruments.
        reopens_at: DateTime<Utc>,
    },
    /// Market closed: do nothing.
    Skip {
        /// Latest reopening instant among the instruments.
        reopens_at: DateTime<Utc>,
    },
}

/// Applies `policy` to `now`. The market counts as closed while any of
/// `rules` has not reached its cutoff, and reopens at the latest one.
/// `force` bypasses the check entirely.
pub fn pre_open_step(
    now: DateTime<Utc>,
    rules: &[ReopenRule],
    policy: PreOpenPolicy,
    force: bool,
) -> RunStep {
    if force {
        return RunStep::Proceed;
    }
    let reopening = rules
        .iter()
        .filter_map(|rule| session::pre_open(now, rule))
        .max();
    match (reopening, policy) {
        (None, _) | (Some(_), PreOpenPolicy::PreviousWeek) => RunStep::Proceed,
        (Some(reopens_at), PreOpenPolicy::Notify) => RunStep::Notify { reopens_at },
        (Some(reopens_at), PreOpenPolicy::Skip) => RunStep::Skip { reopens_at },
    }
}

/// Effective reopening rule of every instrument.
pub fn instrument_rules(instruments: &[Instrument], fallback: ReopenRule) -> Vec<ReopenRule> {
    instruments.iter().map(|i| i.rule_or(fallback)).collect()
}

/// Prices every instrument in order and computes its gap.
pub async fn collect_gaps<P: PriceProvider>(
    provider: &P,
    instruments: &[Instrument],
    now: DateTime<Utc>,
) -> Vec<InstrumentReport> {
    let mut reports = Vec::with_capacity(instruments.len());

    for instrument in instruments {
        let rule = instrument.rule_or(provider.default_rule());
        let pair = session::resolve(now, &rule);
        log::debug!(
            "{}: prior close {} / next open {} (rolled back: {})",
            instrument.label,
            pair.prior_close,
            pair.next_open,
            pair.rolled_back
        );

        let (answered_by, result) = match price_instrument(provider, instrument, &pair).await {
            Ok((symbol, outcome)) => (Some(symbol), Ok(outcome)),
            Err(err) => (None, Err(err)),
        };
        reports.push(InstrumentReport {
            label: instrument.label.clone(),
            symbols: instrument.symbols.clone(),
            answered_by,
            result,
        });
    }

    reports
}

async fn price_instrument<P: PriceProvider>(
    provider: &P,
    instrument: &Instrument,
    pair: &session::SessionPair,
) -> Result<(String, GapOutcome), FetchError> {
    let mut last_error = FetchError::SymbolNotFound(instrument.symbols.join("/"));

    for symbol in &instrument.symbols {
        match provider.session_prices(symbol, pair).await {
            Ok(prices) => {
                log::info!(
                    "{} [{}]: close {:?} / open {:?}",
                    instrument.label,
                    prices.symbol,
                    prices.close,
                    prices.open
                );
                let outcome = compute_gap(prices.close, prices.open);
                return Ok((prices.symbol, outcome));
            }
            Err(FetchError::SymbolNotFound(unknown)) => {
                log::warn!(
                    "{}: {} unknown to {}, trying next alias",
                    instrument.label,
                    unknown,
                    provider.name()
                );
                last_error = FetchError::SymbolNotFound(unknown);
            }
            Err(err) => {
                log::warn!("{} [{}]: {}", instrument.label, symbol, err);
                return Err(err);
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::gaps::calculator::Missing;
    use crate::markets::gaps::provider::SessionPrices;
    use crate::markets::gaps::session::SessionPair;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned prices per symbol; records the calls it receives.
    struct StubProvider {
        answers: HashMap<&'static str, Result<SessionPrices, FetchError>>,
        calls: RefCell<Vec<(String, SessionPair)>>,
    }

    impl StubProvider {
        fn new(answers: Vec<(&'static str, Result<SessionPrices, FetchError>)>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PriceProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn default_rule(&self) -> ReopenRule {
            ReopenRule::globex()
        }

        async fn session_prices(
            &self,
            symbol: &str,
            pair: &SessionPair,
        ) -> Result<SessionPrices, FetchError> {
            self.calls.borrow_mut().push((symbol.to_string(), *pair));
            self.answers
                .get(symbol)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::SymbolNotFound(symbol.to_string())))
        }
    }

    fn prices(
        symbol: &str,
        close: Option<f64>,
        open: Option<f64>,
    ) -> Result<SessionPrices, FetchError> {
        Ok(SessionPrices {
            symbol: symbol.to_string(),
            close,
            open,
        })
    }

    fn wednesday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_failure_on_one_instrument_does_not_stop_the_rest() {
        let provider = StubProvider::new(vec![
            ("GC=F", Err(FetchError::Http { status: 500 })),
            ("CL=F", prices("CL=F", Some(70.0), Some(71.4))),
        ]);
        let instruments = vec![
            Instrument::new("Gold", &["GC=F"]),
            Instrument::new("Oil", &["CL=F"]),
        ];

        let reports = collect_gaps(&provider, &instruments, wednesday()).await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].result, Err(FetchError::Http { status: 500 }));
        assert_eq!(reports[0].answered_by, None);
        assert!(matches!(reports[1].result, Ok(GapOutcome::Available(_))));
        assert_eq!(reports[1].answered_by.as_deref(), Some("CL=F"));
    }

    #[tokio::test]
    async fn test_aliases_are_walked_on_unknown_symbol() {
        let provider =
            StubProvider::new(vec![("XAUUSD", prices("XAUUSD", None, Some(2050.0)))]);
        let instruments = vec![Instrument::new("Gold", &["XAU/USD", "XAUUSD"])];

        let reports = collect_gaps(&provider, &instruments, wednesday()).await;

        assert_eq!(
            reports[0].result,
            Ok(GapOutcome::Unavailable(Missing::PriorClose))
        );
        assert_eq!(reports[0].answered_by.as_deref(), Some("XAUUSD"));
        let calls = provider.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "XAU/USD");
        assert_eq!(calls[1].0, "XAUUSD");
    }

    #[tokio::test]
    async fn test_all_aliases_unknown() {
        let provider = StubProvider::new(vec![]);
        let instruments = vec![Instrument::new("GER40", &["GER30", "DE40"])];

        let reports = collect_gaps(&provider, &instruments, wednesday()).await;

        assert!(matches!(reports[0].result, Err(FetchError::SymbolNotFound(_))));
    }

    #[tokio::test]
    async fn test_instrument_rule_overrides_provider_rule() {
        let provider =
            StubProvider::new(vec![("^GDAXI", prices("^GDAXI", Some(1.0), Some(1.0)))]);
        // Monday 06:00: Globex already reopened, the DAX candle rule (08:00) not yet.
        let now = Utc.with_ymd_and_hms(2024, 1, 8, 6, 0, 0).unwrap();
        let dax_rule = ReopenRule::CandleOffset {
            session_day: chrono::Weekday::Mon,
            time: chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        };
        let instruments = vec![Instrument::new("GER40", &["^GDAXI"]).with_rule(dax_rule)];

        collect_gaps(&provider, &instruments, now).await;

        let calls = provider.calls.borrow();
        assert_eq!(
            calls[0].1.next_open,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_pre_open_policies() {
        let rule = ReopenRule::globex();
        let saturday = Utc.with_ymd_and_hms(2024, 1, 6, 15, 0, 0).unwrap();
        let reopens_at = Utc.with_ymd_and_hms(2024, 1, 7, 22, 0, 0).unwrap();

        assert_eq!(
            pre_open_step(saturday, &[rule], PreOpenPolicy::Notify, false),
            RunStep::Notify { reopens_at }
        );
        assert_eq!(
            pre_open_step(saturday, &[rule], PreOpenPolicy::Skip, false),
            RunStep::Skip { reopens_at }
        );
        assert_eq!(
            pre_open_step(saturday, &[rule], PreOpenPolicy::PreviousWeek, false),
            RunStep::Proceed
        );
        assert_eq!(
            pre_open_step(saturday, &[rule], PreOpenPolicy::Notify, true),
            RunStep::Proceed
        );
        assert_eq!(
            pre_open_step(wednesday(), &[rule], PreOpenPolicy::Skip, false),
            RunStep::Proceed
        );
    }

    #[test]
    fn test_pre_open_waits_for_the_latest_instrument_rule() {
        let dax_rule = ReopenRule::CandleOffset {
            session_day: chrono::Weekday::Mon,
            time: chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        };
        let instruments = vec![
            Instrument::new("Gold", &["GC=F"]),
            Instrument::new("GER40", &["^GDAXI"]).with_rule(dax_rule),
        ];
        let rules = instrument_rules(&instruments, ReopenRule::globex());
        assert_eq!(rules, vec![ReopenRule::globex(), dax_rule]);

        // Monday 06:00: Globex reopened on Sunday, the DAX candle is still pending.
        let monday = Utc.with_ymd_and_hms(2024, 1, 8, 6, 0, 0).unwrap();
        let dax_open = Utc.with_ymd_and_hms(2024, 1, 8, 8, 0, 0).unwrap();
        assert_eq!(
            pre_open_step(monday, &rules, PreOpenPolicy::Notify, false),
            RunStep::Notify { reopens_at: dax_open }
        );
        assert_eq!(
            pre_open_step(monday, &rules[..1], PreOpenPolicy::Notify, false),
            RunStep::Proceed
        );

        // Saturday: both closed, the later cutoff wins.
        let saturday = Utc.with_ymd_and_hms(2024, 1, 6, 15, 0, 0).unwrap();
        assert_eq!(
            pre_open_step(saturday, &rules, PreOpenPolicy::Skip, false),
            RunStep::Skip { reopens_at: dax_open }
        );
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("notify".parse::<PreOpenPolicy>(), Ok(PreOpenPolicy::Notify));
        assert_eq!(
            "Previous-Week".parse::<PreOpenPolicy>(),
            Ok(PreOpenPolicy::PreviousWeek)
        );
        assert!("later".parse::<PreOpenPolicy>().is_err());
        assert_eq!(PreOpenPolicy::PreviousWeek.to_string(), "previous-week");
    }
}
