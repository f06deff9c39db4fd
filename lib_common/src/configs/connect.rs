//! # Provider Connection
//!
//! Turns the `GAP_PROVIDER` selection of a [`GapConfig`] into a ready price
//! provider. Credential checks and the IG login happen here, so a failure
//! surfaces as one [`ConnectError`] carrying the diagnostic to post before
//! the run is aborted.

use thiserror::Error;

use super::config_gap::{GapConfig, ProviderKind};
use crate::markets::finnhub::{ApiCallFinnhub, FinnhubDaily};
use crate::markets::gaps::provider::{
    require_credential, AuthError, FetchError, PriceProvider, SessionPrices,
};
use crate::markets::gaps::report::auth_failure_note;
use crate::markets::gaps::session::{ReopenRule, SessionPair};
use crate::markets::ig::{IgCredentials, IgPrices, IgSession};
use crate::markets::yahoo::apicall::ApiCallYahoo;
use crate::markets::yahoo::{YahooDaily, YahooMinute};
use crate::retrieve::ky_http::ApiClient;

/// The provider picked by `GAP_PROVIDER`.
#[derive(Debug, Clone)]
pub enum ConfiguredProvider {
    Yahoo(YahooDaily),
    YahooMinute(YahooMinute),
    Finnhub(FinnhubDaily),
    Ig(IgPrices),
}

impl PriceProvider for ConfiguredProvider {
    fn name(&self) -> &'static str {
        match self {
            Self::Yahoo(p) => p.name(),
            Self::YahooMinute(p) => p.name(),
            Self::Finnhub(p) => p.name(),
            Self::Ig(p) => p.name(),
        }
    }

    fn default_rule(&self) -> ReopenRule {
        match self {
            Self::Yahoo(p) => p.default_rule(),
            Self::YahooMinute(p) => p.default_rule(),
            Self::Finnhub(p) => p.default_rule(),
            Self::Ig(p) => p.default_rule(),
        }
    }

    async fn session_prices(
        &self,
        symbol: &str,
        pair: &SessionPair,
    ) -> Result<SessionPrices, FetchError> {
        match self {
            Self::Yahoo(p) => p.session_prices(symbol, pair).await,
            Self::YahooMinute(p) => p.session_prices(symbol, pair).await,
            Self::Finnhub(p) => p.session_prices(symbol, pair).await,
            Self::Ig(p) => p.session_prices(symbol, pair).await,
        }
    }
}

/// The provider could not be set up. Fatal for the run.
#[derive(Debug, Error)]
#[error("{provider} authentication failed: {source}")]
pub struct ConnectError {
    pub provider: ProviderKind,
    #[source]
    pub source: AuthError,
}

impl ConnectError {
    /// Message to post to Discord before exiting.
    pub fn diagnostic(&self) -> String {
        auth_failure_note(self.provider.as_str(), &self.source)
    }
}

/// Builds the configured provider, logging into IG when selected.
pub async fn connect_provider(config: &GapConfig) -> Result<ConfiguredProvider, ConnectError> {
    connect_through(config, config.ig.environment.base_url()).await
}

async fn connect_through(
    config: &GapConfig,
    ig_gateway: &str,
) -> Result<ConfiguredProvider, ConnectError> {
    let provider = config.provider;
    let fail = |source: AuthError| ConnectError { provider, source };
    let timeout = config.http_timeout;

    let connected = match provider {
        ProviderKind::Yahoo => {
            let api = ApiCallYahoo::new(timeout).map_err(network).map_err(fail)?;
            ConfiguredProvider::Yahoo(YahooDaily::new(api))
        }
        ProviderKind::YahooMinute => {
            let api = ApiCallYahoo::new(timeout).map_err(network).map_err(fail)?;
            ConfiguredProvider::YahooMinute(YahooMinute::new(api))
        }
        ProviderKind::Finnhub => {
            let token = require_credential(config.finnhub_api_key.as_deref(), "FINNHUB_API_KEY")
                .map_err(fail)?;
            let api = ApiCallFinnhub::new(&token, timeout)
                .map_err(network)
                .map_err(fail)?;
            ConfiguredProvider::Finnhub(FinnhubDaily::new(api))
        }
        ProviderKind::Ig => {
            let session = open_ig_session(config, ig_gateway).await.map_err(fail)?;
            ConfiguredProvider::Ig(IgPrices::new(session))
        }
    };

    log::info!("Price provider {} ready", connected.name());
    Ok(connected)
}

async fn open_ig_session(config: &GapConfig, gateway: &str) -> Result<IgSession, AuthError> {
    let ig = &config.ig;
    let credentials = IgCredentials::from_settings(
        ig.api_key.as_deref(),
        ig.identifier.as_deref(),
        ig.password.as_deref(),
    )?;
    let client = ApiClient::new(gateway, None, config.http_timeout).map_err(network)?;

    log::info!("Opening IG session on the {} gateway", ig.environment);
    IgSession::login(client, &credentials, ig.encrypted_login).await
}

fn network(err: anyhow::Error) -> AuthError {
    AuthError::Network(err.to_string())
}
