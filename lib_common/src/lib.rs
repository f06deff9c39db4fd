//! # lib_common
//!
//! Shared building blocks for the weekend gap notifier and the gold news
//! digest. Every top-level folder is gated behind a cargo feature of the
//! same name; `full` (the default) enables all of them.

#![forbid(unsafe_code)]

#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "markets")]
pub mod markets;
#[cfg(feature = "news")]
pub mod news;
#[cfg(feature = "notify")]
pub mod notify;
#[cfg(feature = "retrieve")]
pub mod retrieve;

#[cfg(test)]
pub(crate) mod mock_http;
