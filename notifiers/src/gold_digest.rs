use anyhow::Result;

use lib_common::configs::load_digest_config;
use lib_common::loggers::setup_logging;
use lib_common::news::{
    compose_digest, fetch_article_text, summarize, ArticleExtractor, ArticleSummary,
};

mod delivery;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_digest_config().unwrap_or_else(|e| delivery::exit_on_config_error(e));
    setup_logging(&config.output_log, &config.log_level)?;

    log::info!(
        "Gold digest run over {} article(s), {} sentence(s) each (dry run {})",
        config.articles.len(),
        config.sentences,
        config.dry_run
    );

    let extractor = ArticleExtractor::new()?;
    let mut summaries = Vec::with_capacity(config.articles.len());

    for url in &config.articles {
        log::info!("Fetching {}", url);
        let result = match fetch_article_text(url, &extractor, config.http_timeout).await {
            Ok(text) => {
                let sentences = summarize(&text, config.sentences);
                if sentences.is_empty() {
                    log::warn!("No sentence to summarize at {}", url);
                    Err("No sentence to summarize".to_string())
                } else {
                    Ok(sentences)
                }
            }
            Err(err) => {
                log::warn!("Article {} skipped: {:#}", url, err);
                Err(format!("Error while processing the article: {}", err))
            }
        };
        summaries.push(ArticleSummary {
            url: url.clone(),
            result,
        });
    }

    let today = chrono::Utc::now().with_timezone(&config.report_tz).date_naive();
    let message = compose_digest(today, &summaries);
    log::info!("Gold digest:\n{}", message);

    delivery::deliver(
        config.webhook_url.as_deref(),
        config.dry_run,
        config.http_timeout,
        &message,
    )
    .await;
    Ok(())
}
