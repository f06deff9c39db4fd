//! # Yahoo Finance Chart Integration
//!
//! Everything needed to price a weekend gap from the public Yahoo Finance
//! chart endpoint (`v8/finance/chart`).
//!
//! ## Contained Modules:
//!
//! - **`apicall`**: thin client over `ApiClient`, with the browser user
//!   agent and the mapping of Yahoo's HTTP and in-body errors to
//!   `FetchError`.
//!
//! - **`chart`**: strongly-typed chart payload plus the pure extraction of
//!   the Friday close / next open from daily candles or minute windows.
//!
//! - **`provider`**: the two `PriceProvider` strategies built on top of it,
//!   daily candles (`yahoo`) and Sunday-evening minute windows
//!   (`yahoo-minute`).

/// Low-level client for the chart endpoint.
pub mod apicall;
/// Chart payload model and candle extraction.
pub mod chart;
/// Daily and minute-window price providers.
pub mod provider;

pub use provider::{YahooDaily, YahooMinute};
