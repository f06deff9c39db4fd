//! # Weekend Gap Core
//!
//! Everything needed to turn "now" and a price provider into a report:
//!
//! - **`session`**: maps a UTC timestamp and a market's reopening rule to the
//!   (prior Friday, next session) date pair.
//! - **`calculator`**: null-safe gap arithmetic.
//! - **`report`**: report header and per-instrument lines.
//! - **`instruments`**: instrument definitions and per-provider defaults.
//! - **`provider`**: the `PriceProvider` trait and its error type.
//! - **`pipeline`**: the sequential run over all instruments.

pub mod calculator;
pub mod instruments;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod session;

pub use calculator::{compute_gap, Direction, Gap, GapOutcome, Missing};
pub use instruments::Instrument;
pub use pipeline::{collect_gaps, instrument_rules, pre_open_step, PreOpenPolicy, RunStep};
pub use provider::{AuthError, FetchError, PriceProvider, SessionPrices};
pub use report::{auth_failure_note, pre_open_note, InstrumentReport, Report};
pub use session::{ReopenRule, SessionPair};
