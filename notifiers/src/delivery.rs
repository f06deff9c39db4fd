//! Plumbing shared by the notifier binaries: configuration exits and the
//! dry-run aware Discord delivery.

use std::time::Duration;

use lib_common::configs::ConfigError;
use lib_common::notify::DiscordWebhook;

/// Prints a configuration error and ends the process. `--help` and
/// `--version` exit with 0, anything else with 1.
pub fn exit_on_config_error(err: ConfigError) -> ! {
    match err {
        ConfigError::Args(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
        other => {
            eprintln!("Configuration error: {}", other);
            std::process::exit(1);
        }
    }
}

/// Posts `content` to the webhook unless this is a dry run. A missing
/// webhook or a failed post is logged only.
pub async fn deliver(webhook_url: Option<&str>, dry_run: bool, timeout: Duration, content: &str) {
    if dry_run {
        log::info!("DRY_RUN is set, nothing posted to Discord");
        return;
    }
    let Some(url) = webhook_url else {
        log::warn!("No DISCORD_WEBHOOK_URL configured, nothing posted");
        return;
    };

    let webhook = match DiscordWebhook::new(url, timeout) {
        Ok(webhook) => webhook,
        Err(err) => {
            log::error!("Discord webhook URL rejected: {:#}", err);
            return;
        }
    };

    match webhook.post(content).await {
        Ok(()) => log::info!("Message posted to Discord"),
        Err(err) => log::error!("Discord post failed: {}", err),
    }
}
