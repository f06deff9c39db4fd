//! # News Digest
//!
//! Building blocks of the weekly gold digest:
//!
//! - **`articles`**: download an article page and keep the text of its
//!   `<p>` elements.
//! - **`summarizer`**: frequency-based extractive summary.
//! - **`digest`**: the Discord message assembled from the per-article
//!   summaries.

/// HTML fetching and paragraph extraction.
pub mod articles;
/// Composition of the digest message.
pub mod digest;
/// Extractive summarizer.
pub mod summarizer;

pub use articles::{extract_article_text, fetch_article_text, ArticleExtractor};
pub use digest::{compose_digest, ArticleSummary};
pub use summarizer::summarize;
