use anyhow::Result;
use chrono::{DateTime, Utc};

use lib_common::configs::{connect_provider, load_gap_config, GapConfig};
use lib_common::loggers::setup_logging;
use lib_common::markets::gaps::{
    collect_gaps, instrument_rules, pre_open_note, pre_open_step, PriceProvider, Report, RunStep,
};

mod delivery;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_gap_config().unwrap_or_else(|e| delivery::exit_on_config_error(e));
    setup_logging(&config.output_log, &config.log_level)?;

    let now = config.now();
    log::info!(
        "Gap notifier run at {} (provider {}, policy {}, dry run {})",
        now.to_rfc3339(),
        config.provider,
        config.pre_open_policy,
        config.dry_run
    );

    let provider = match connect_provider(&config).await {
        Ok(provider) => provider,
        Err(err) => {
            log::error!("{}", err);
            post(&config, &err.diagnostic()).await;
            std::process::exit(1);
        }
    };

    run(&provider, &config, now).await
}

async fn post(config: &GapConfig, message: &str) {
    delivery::deliver(
        config.webhook_url.as_deref(),
        config.dry_run,
        config.http_timeout,
        message,
    )
    .await;
}

async fn run<P: PriceProvider>(provider: &P, config: &GapConfig, now: DateTime<Utc>) -> Result<()> {
    let rules = instrument_rules(&config.instruments, provider.default_rule());
    match pre_open_step(now, &rules, config.pre_open_policy, config.force_run) {
        RunStep::Proceed => {}
        RunStep::Notify { reopens_at } => {
            let note = pre_open_note(now, reopens_at, config.report_tz);
            log::info!("Markets are not open yet:\n{}", note);
            post(config, &note).await;
            return Ok(());
        }
        RunStep::Skip { reopens_at } => {
            log::info!(
                "Markets reopen at {}, skipping this run",
                reopens_at.to_rfc3339()
            );
            return Ok(());
        }
    }

    let reports = collect_gaps(provider, &config.instruments, now).await;
    let report_date = now.with_timezone(&config.report_tz).date_naive();
    let report = Report::new(report_date, provider.name(), &reports);
    let message = report.render();
    log::info!("Gap report:\n{}", message);

    post(config, &message).await;
    Ok(())
}
