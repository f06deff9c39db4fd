//! # Notification Sinks
//!
//! Outbound messages of the notifier binaries. Only Discord webhooks are
//! supported; a failed post is logged by the caller and never retried.

/// Discord webhook client with message chunking.
pub mod discord;

pub use discord::{chunk_message, DiscordWebhook, NotifyError, DISCORD_CHUNK_LIMIT};
