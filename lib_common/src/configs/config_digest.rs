//! Gold digest configuration.

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

use super::config_gap::{parse_timezone, pick_webhook, ConfigError};

/// Articles summarized when `GOLD_ARTICLES` is not set.
pub const DEFAULT_GOLD_ARTICLES: [&str; 2] = [
    "https://www.reuters.com/world/china/gold-gains-softer-dollar-investors-await-us-trade-updates-2025-07-21/",
    "https://www.reuters.com/world/china/gold-heads-weekly-dip-firm-dollar-platinum-highest-since-2014-2025-07-18/",
];

#[derive(Parser, Debug, Clone)]
#[clap(about = "Weekly gold news digest", version)]
pub struct DigestArgs {
    #[clap(long, env = "DRY_RUN", default_value = "1", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub dry_run: bool,

    #[clap(long, env = "OUTPUT_LOG", default_value = "gold_output.txt")]
    pub output_log: PathBuf,

    #[clap(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[clap(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub discord_webhook_url: Option<String>,

    #[clap(long, env = "DISCORD_WEBHOOK", hide_env_values = true)]
    pub discord_webhook: Option<String>,

    #[clap(long, env = "GOLD_ARTICLES", value_delimiter = ',', default_values = DEFAULT_GOLD_ARTICLES, help = "Comma-separated article URLs.")]
    pub articles: Vec<String>,

    #[clap(long, env = "GOLD_SENTENCES", default_value_t = 4, help = "Sentences kept per article.")]
    pub sentences: usize,

    #[clap(long, env = "REPORT_TZ", default_value = "Europe/Paris")]
    pub report_tz: String,

    #[clap(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,
}

/// Validated digest configuration.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub dry_run: bool,
    pub output_log: PathBuf,
    pub log_level: String,
    pub webhook_url: Option<String>,
    pub articles: Vec<String>,
    pub sentences: usize,
    pub report_tz: Tz,
    pub http_timeout: Duration,
}

impl DigestConfig {
    pub fn from_args(args: DigestArgs) -> Result<Self, ConfigError> {
        Ok(Self {
            dry_run: args.dry_run,
            output_log: args.output_log,
            log_level: args.log_level,
            webhook_url: pick_webhook(args.discord_webhook_url, args.discord_webhook),
            articles: args
                .articles
                .into_iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
            sentences: args.sentences,
            report_tz: parse_timezone(&args.report_tz)?,
            http_timeout: Duration::from_secs(args.http_timeout_secs.max(1)),
        })
    }
}

/// Loads `.env`, then parses the process arguments and environment.
pub fn load_digest_config() -> Result<DigestConfig, ConfigError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {}", e);
        }
    }
    DigestConfig::from_args(DigestArgs::try_parse()?)
}
