//! Weekly gold digest message.

use chrono::NaiveDate;

/// Outcome for one article: its summary sentences, or why it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleSummary {
    pub url: String,
    pub result: Result<Vec<String>, String>,
}

/// Builds the Discord message:
///
/// ```text
/// 📊 **Weekly gold market summary** – 21/07/2025
///
/// 🕵️ **Automatic analysis based on 2 recent articles:**
///
/// 🔗 Source : https://...
/// sentence
/// ...
///
/// 🧠 Summary generated automatically. Check before official distribution.
/// ```
pub fn compose_digest(date: NaiveDate, articles: &[ArticleSummary]) -> String {
    let blocks: Vec<String> = articles
        .iter()
        .map(|article| match &article.result {
            Ok(sentences) => format!("🔗 Source : {}\n{}", article.url, sentences.join("\n")),
            Err(error) => format!("❌ {}\n🔗 {}", error, article.url),
        })
        .collect();

    let plural = if articles.len() == 1 { "" } else { "s" };
    format!(
        "📊 **Weekly gold market summary** – {}\n\n\
         🕵️ **Automatic analysis based on {} recent article{}:**\n\n\
         {}\n\n\
         🧠 Summary generated automatically. Check before official distribution.",
        date.format("%d/%m/%Y"),
        articles.len(),
        plural,
        blocks.join("\n\n")
    )
}
