//! # Data Retrieval Module
//!
//! This module provides a centralized location for the HTTP client shared by
//! every market data provider and by the webhook notifier.
//!
//! ## Purpose:
//! The `retrieve` module offers a consistent way to talk to external
//! services: base URL joining, default headers, per-request timeouts and
//! JSON decoding. Requests are sent exactly once; the notifiers run from a
//! scheduler and a failed call is reported, not repeated.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: A generic asynchronous `ApiClient` built on `reqwest`. It
//!   serves as the foundation for the Yahoo, Finnhub and IG clients as well
//!   as the Discord webhook.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Generic HTTP API client with standardized JSON response handling.
pub mod ky_http;
