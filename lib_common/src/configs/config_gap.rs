//! # Gap Notifier Configuration
//!
//! Every setting comes from the environment (after loading `.env` with
//! `dotenvy`) and can be overridden on the command line. `GapArgs` is the raw
//! clap view; `GapConfig` is the validated value the binary passes around.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use thiserror::Error;

use crate::markets::gaps::instruments::{self, Instrument};
use crate::markets::gaps::pipeline::PreOpenPolicy;
use crate::markets::ig::session::IgEnvironment;

/// Which market data source prices the gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Yahoo daily candles.
    Yahoo,
    /// Yahoo one-minute windows around the Friday close and Sunday reopen.
    YahooMinute,
    /// Finnhub daily candles.
    Finnhub,
    /// IG Markets brokerage session.
    Ig,
}

impl ProviderKind {
    /// Built-in instrument list of this provider.
    pub fn default_instruments(&self) -> Vec<Instrument> {
        match self {
            ProviderKind::Yahoo => instruments::yahoo_defaults(),
            ProviderKind::YahooMinute => instruments::yahoo_minute_defaults(),
            ProviderKind::Finnhub => instruments::finnhub_defaults(),
            ProviderKind::Ig => instruments::ig_defaults(),
        }
    }

    /// Name as written in `GAP_PROVIDER`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Yahoo => "yahoo",
            ProviderKind::YahooMinute => "yahoo-minute",
            ProviderKind::Finnhub => "finnhub",
            ProviderKind::Ig => "ig",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration errors. All of them end the run with exit code 1.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("invalid REPORT_TZ '{0}'")]
    InvalidTimezone(String),

    #[error("invalid AS_OF '{value}': {reason}")]
    InvalidAsOf { value: String, reason: String },

    #[error("cannot read instruments file {}: {source}", .path.display())]
    InstrumentsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid instruments file {}: {reason}", .path.display())]
    InvalidInstruments { path: PathBuf, reason: String },
}

#[derive(Parser, Debug, Clone)]
#[clap(about = "Weekend opening gap notifier", version)]
pub struct GapArgs {
    #[clap(long, env = "DRY_RUN", default_value = "1", action = ArgAction::Set, value_parser = BoolishValueParser::new(), help = "1: compute and log only, 0: post to Discord.")]
    pub dry_run: bool,

    #[clap(long, env = "OUTPUT_LOG", default_value = "gap_output.txt", help = "Log file, truncated at start.")]
    pub output_log: PathBuf,

    #[clap(long, env = "LOG_LEVEL", default_value = "info", help = "Logging level (debug, info, warn, error).")]
    pub log_level: String,

    #[clap(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true, help = "Discord webhook URL.")]
    pub discord_webhook_url: Option<String>,

    #[clap(long, env = "DISCORD_WEBHOOK", hide_env_values = true, help = "Alias of DISCORD_WEBHOOK_URL.")]
    pub discord_webhook: Option<String>,

    #[clap(long, env = "GAP_PROVIDER", value_enum, default_value = "yahoo", help = "Market data provider.")]
    pub provider: ProviderKind,

    #[clap(long, env = "GAP_INSTRUMENTS", help = "JSON file replacing the provider's default instruments.")]
    pub instruments: Option<PathBuf>,

    #[clap(long, env = "PRE_OPEN_POLICY", default_value = "notify", help = "Weekend behaviour: notify, skip or previous-week.")]
    pub pre_open_policy: PreOpenPolicy,

    #[clap(long, env = "FORCE_RUN", default_value = "0", action = ArgAction::Set, value_parser = BoolishValueParser::new(), help = "Bypass the pre-open check.")]
    pub force_run: bool,

    #[clap(long, env = "AS_OF", help = "RFC 3339 timestamp used instead of the current time.")]
    pub as_of: Option<String>,

    #[clap(long, env = "REPORT_TZ", default_value = "Europe/Paris", help = "Timezone of the report date.")]
    pub report_tz: String,

    #[clap(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30, help = "Per-request timeout in seconds.")]
    pub http_timeout_secs: u64,

    #[clap(long, env = "FINNHUB_API_KEY", hide_env_values = true)]
    pub finnhub_api_key: Option<String>,

    #[clap(long, env = "IG_API_KEY", hide_env_values = true)]
    pub ig_api_key: Option<String>,

    #[clap(long, env = "IG_IDENTIFIER")]
    pub ig_identifier: Option<String>,

    #[clap(long, env = "IG_PASSWORD", hide_env_values = true)]
    pub ig_password: Option<String>,

    #[clap(long, env = "IG_ENVIRONMENT", default_value = "live", help = "IG gateway: live or demo.")]
    pub ig_environment: IgEnvironment,

    #[clap(long, env = "IG_ENCRYPTED_LOGIN", default_value = "1", action = ArgAction::Set, value_parser = BoolishValueParser::new(), help = "Try the RSA-encrypted IG login first.")]
    pub ig_encrypted_login: bool,
}

/// IG login settings, still unvalidated: missing values surface as
/// `AuthError::MissingCredential` when the session is opened.
#[derive(Debug, Clone)]
pub struct IgSettings {
    pub api_key: Option<String>,
    pub identifier: Option<String>,
    pub password: Option<String>,
    pub environment: IgEnvironment,
    pub encrypted_login: bool,
}

/// Validated configuration of one gap notifier run.
#[derive(Debug, Clone)]
pub struct GapConfig {
    pub dry_run: bool,
    pub output_log: PathBuf,
    pub log_level: String,
    pub webhook_url: Option<String>,
    pub provider: ProviderKind,
    pub instruments: Vec<Instrument>,
    pub pre_open_policy: PreOpenPolicy,
    pub force_run: bool,
    pub as_of: Option<DateTime<Utc>>,
    pub report_tz: Tz,
    pub http_timeout: Duration,
    pub finnhub_api_key: Option<String>,
    pub ig: IgSettings,
}

impl GapConfig {
    /// Validates raw arguments.
    pub fn from_args(args: GapArgs) -> Result<Self, ConfigError> {
        let report_tz = parse_timezone(&args.report_tz)?;
        let as_of = args.as_of.as_deref().map(parse_as_of).transpose()?;
        let instruments = match &args.instruments {
            Some(path) => load_instruments(path)?,
            None => args.provider.default_instruments(),
        };

        Ok(Self {
            dry_run: args.dry_run,
            output_log: args.output_log,
            log_level: args.log_level,
            webhook_url: pick_webhook(args.discord_webhook_url, args.discord_webhook),
            provider: args.provider,
            instruments,
            pre_open_policy: args.pre_open_policy,
            force_run: args.force_run,
            as_of,
            report_tz,
            http_timeout: Duration::from_secs(args.http_timeout_secs.max(1)),
            finnhub_api_key: args.finnhub_api_key,
            ig: IgSettings {
                api_key: args.ig_api_key,
                identifier: args.ig_identifier,
                password: args.ig_password,
                environment: args.ig_environment,
                encrypted_login: args.ig_encrypted_login,
            },
        })
    }

    /// The instant the run is computed for.
    pub fn now(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}

/// Loads `.env`, then parses the process arguments and environment.
pub fn load_gap_config() -> Result<GapConfig, ConfigError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {}", e);
        }
    }
    GapConfig::from_args(GapArgs::try_parse()?)
}

/// First non-blank value of the primary variable, then of its alias.
pub fn pick_webhook(primary: Option<String>, alias: Option<String>) -> Option<String> {
    [primary, alias]
        .into_iter()
        .flatten()
        .map(|url| url.trim().to_string())
        .find(|url| !url.is_empty())
}

pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))
}

fn parse_as_of(value: &str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ConfigError::InvalidAsOf {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Reads a JSON array of instruments. The list and every symbol list must be
/// non-empty.
pub fn load_instruments(path: &Path) -> Result<Vec<Instrument>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::InstrumentsIo {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| ConfigError::InvalidInstruments {
        path: path.to_path_buf(),
        reason,
    };

    let instruments: Vec<Instrument> =
        serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))?;

    if instruments.is_empty() {
        return Err(invalid("no instrument defined".to_string()));
    }
    if let Some(bad) = instruments
        .iter()
        .find(|i| i.symbols.iter().all(|s| s.trim().is_empty()))
    {
        return Err(invalid(format!("instrument '{}' has no symbol", bad.label)));
    }

    Ok(instruments)
}
