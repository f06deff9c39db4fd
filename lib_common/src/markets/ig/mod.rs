//! # IG Markets Integration
//!
//! Brokerage session and historical prices from the IG REST gateway.
//!
//! ## Contained Modules:
//!
//! - **`session`**: login (RSA-encrypted password first, plaintext as a
//!   fallback) and the `CST` / `X-SECURITY-TOKEN` pair every later call
//!   carries.
//! - **`prices`**: the `ig` `PriceProvider`, reading bid open/close of the
//!   daily candles of an EPIC.

/// Historical price provider.
pub mod prices;
/// Gateway login and session headers.
pub mod session;

pub use prices::IgPrices;
pub use session::{IgCredentials, IgEnvironment, IgSession};
