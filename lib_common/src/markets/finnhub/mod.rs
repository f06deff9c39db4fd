//! # Finnhub Candle Integration
//!
//! Daily candles from `finnhub.io/api/v1`. Symbols of the form
//! `EXCHANGE:PAIR` (e.g. `OANDA:XAU_USD`) are routed to the forex candle
//! endpoint, everything else to the stock candle endpoint.
//!
//! - **`apicall`**: authenticated client and the candle payload model.
//! - **`provider`**: the `finnhub` `PriceProvider` strategy.

/// Low-level candle client.
pub mod apicall;
/// Daily candle price provider.
pub mod provider;

pub use apicall::ApiCallFinnhub;
pub use provider::FinnhubDaily;
