//! # Price Provider Seam
//!
//! A provider turns one symbol and one resolved `SessionPair` into the two
//! reference prices of the gap. Daily-candle, minute-candle and brokerage
//! providers all implement the same trait so the pipeline can be driven by
//! whichever one the configuration selects.

use thiserror::Error;

use super::session::{ReopenRule, SessionPair};

/// Why a provider could not deliver prices for a symbol.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, TLS or timeout failure.
    #[error("network error: {0}")]
    Network(String),

    /// The upstream answered with a non-success status.
    #[error("upstream answered HTTP {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },

    /// The body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The request succeeded but carried no candles.
    #[error("no data returned")]
    NoData,

    /// The upstream does not know this symbol.
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),
}

impl FetchError {
    /// Compact tag appended to "data unavailable" report lines.
    pub fn short_reason(&self) -> String {
        match self {
            FetchError::Network(_) => "network".to_string(),
            FetchError::Http { status } => format!("http {}", status),
            FetchError::Malformed(_) => "malformed response".to_string(),
            FetchError::NoData => "no data".to_string(),
            FetchError::SymbolNotFound(_) => "symbol not found".to_string(),
        }
    }

    /// Classifies an error coming out of `ApiClient::request`.
    pub fn from_client_error(err: anyhow::Error) -> Self {
        match err.downcast_ref::<serde_json::Error>() {
            Some(json_err) => FetchError::Malformed(json_err.to_string()),
            None => FetchError::Network(err.to_string()),
        }
    }
}

/// Why a provider session could not be opened. Always fatal for the run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// A required setting is absent or empty (name of the variable).
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// A credential cannot be sent as an HTTP header value.
    #[error("credential {0} is not a valid header value")]
    InvalidHeader(&'static str),

    /// The upstream refused the login.
    #[error("login rejected (HTTP {status}): {body}")]
    Rejected {
        /// HTTP status code of the login call.
        status: u16,
        /// Error body, usually an IG `errorCode`.
        body: String,
    },

    /// The login succeeded but a session token header was absent.
    #[error("login response lacks the {0} header")]
    MissingToken(&'static str),

    /// Connection, TLS or timeout failure during login.
    #[error("network error during login: {0}")]
    Network(String),
}

/// Returns the trimmed value, or `MissingCredential(name)` when absent or blank.
pub fn require_credential(value: Option<&str>, name: &'static str) -> Result<String, AuthError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AuthError::MissingCredential(name)),
    }
}

/// Reference prices for one instrument. Either side may be missing when the
/// provider answered but had no candle for that session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPrices {
    /// Symbol that actually answered (may be an alias).
    pub symbol: String,
    /// Close of the prior Friday session.
    pub close: Option<f64>,
    /// Open of the next session.
    pub open: Option<f64>,
}

/// A market data source able to price both sides of a weekend gap.
#[allow(async_fn_in_trait)]
pub trait PriceProvider {
    /// Short name shown in the report header.
    fn name(&self) -> &'static str;

    /// Reopening rule used when an instrument does not define its own.
    fn default_rule(&self) -> ReopenRule;

    /// Fetches the Friday close and next-session open for `symbol`.
    async fn session_prices(
        &self,
        symbol: &str,
        pair: &SessionPair,
    ) -> Result<SessionPrices, FetchError>;
}
