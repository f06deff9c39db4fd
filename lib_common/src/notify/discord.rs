//! Discord webhook poster.
//!
//! `POST {webhook}` with `{"content": "..."}`. Discord answers `204 No
//! Content` (or `200` with `?wait=true`). Content above the message limit
//! is split on line boundaries and sent as consecutive posts.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use thiserror::Error;

use crate::retrieve::ky_http::ApiClient;

/// Maximum characters per post, below Discord's 2000 hard limit.
pub const DISCORD_CHUNK_LIMIT: usize = 1900;

/// Why a post did not go through.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NotifyError {
    /// Discord answered with something other than 200/204.
    #[error("discord answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS or timeout failure.
    #[error("network error while posting to discord: {0}")]
    Network(String),
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

/// A configured webhook.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    client: ApiClient,
}

impl DiscordWebhook {
    /// Builds a client for the full webhook URL.
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: ApiClient::new(url, None, timeout)?,
        })
    }

    /// Posts `content`, split into as many messages as needed. Stops at the
    /// first failed chunk.
    pub async fn post(&self, content: &str) -> Result<(), NotifyError> {
        // Discord rejects whitespace-only content.
        let chunks: Vec<String> = chunk_message(content, DISCORD_CHUNK_LIMIT)
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect();
        let total = chunks.len();

        for (i, chunk) in chunks.iter().enumerate() {
            let response = self
                .client
                .request::<serde_json::Value, _>(
                    Method::POST,
                    "",
                    &[],
                    None,
                    Some(WebhookMessage { content: chunk }),
                )
                .await
                .map_err(|e| NotifyError::Network(e.to_string()))?;

            if response.status != 200 && response.status != 204 {
                let body: String = response
                    .error_body
                    .unwrap_or_default()
                    .chars()
                    .take(150)
                    .collect();
                return Err(NotifyError::Status {
                    status: response.status,
                    body,
                });
            }
            log::info!("Discord HTTP {} (part {}/{})", response.status, i + 1, total);
        }

        Ok(())
    }
}

/// Splits `content` into pieces of at most `limit` characters, cutting
/// between lines. A single line longer than `limit` is cut on character
/// boundaries. Blank lines are kept, so joining the pieces with `\n` gives
/// back `content` when no line was cut. Never returns an empty list.
pub fn chunk_message(content: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut current_lines = 0;

    for line in content.split('\n') {
        let line_len = line.chars().count();
        let needed = if current_lines == 0 { line_len } else { line_len + 1 };

        if current_len + needed <= limit {
            if current_lines > 0 {
                current.push('\n');
            }
            current.push_str(line);
            current_len += needed;
            current_lines += 1;
            continue;
        }

        if current_lines > 0 {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
            current_lines = 0;
        }

        if line_len <= limit {
            current.push_str(line);
            current_len = line_len;
            current_lines = 1;
        } else {
            let chars: Vec<char> = line.chars().collect();
            let mut pieces = chars
                .chunks(limit)
                .map(|c| c.iter().collect::<String>())
                .peekable();
            while let Some(piece) = pieces.next() {
                if pieces.peek().is_some() {
                    chunks.push(piece);
                } else {
                    current_len = piece.chars().count();
                    current_lines = 1;
                    current = piece;
                }
            }
        }
    }

    if current_lines > 0 || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}
