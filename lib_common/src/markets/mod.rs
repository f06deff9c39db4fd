//! # Financial Market APIs Module
//!
//! This module groups together all logic and client implementations related to
//! market data providers, plus the weekend gap core that consumes them.
//!
//! ## Contained Modules:
//!
//! - **`gaps`**: Provider-agnostic core: session-boundary resolver, gap
//!   calculator, report formatter, instrument sets and the run pipeline.
//!
//! - **`yahoo`**: Yahoo Finance chart API client (daily candles and
//!   minute windows).
//!
//! - **`finnhub`**: Finnhub daily candle client.
//!
//! - **`ig`**: IG Markets brokerage session (plain or RSA-encrypted login)
//!   and historical price client.
//!
//! Each provider module exposes a type implementing
//! [`gaps::provider::PriceProvider`], so the pipeline never needs to know
//! which upstream it is talking to.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Weekend gap core: sessions, gap arithmetic, report lines, pipeline.
pub mod gaps;
/// Client for the Yahoo Finance chart API.
pub mod yahoo;
/// Client for the Finnhub candle API.
pub mod finnhub;
/// Client for the IG Markets REST API.
pub mod ig;
