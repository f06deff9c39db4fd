//! # Configuration Modules
//!
//! `.env` + environment + command line configuration of the two notifier
//! binaries, parsed with clap and validated into plain structs.

/// Gap notifier settings, instruments file and provider selection.
pub mod config_gap;

/// Gold digest settings.
pub mod config_digest;

/// Builds the price provider a `GapConfig` selects.
pub mod connect;

#[cfg(test)]
/// Removes every variable `C` reads, so parsing in tests only sees argv.
pub(crate) fn clear_env_of<C: clap::CommandFactory>() {
    for arg in C::command().get_arguments() {
        if let Some(name) = arg.get_env() {
            std::env::remove_var(name);
        }
    }
}

pub use config_digest::{load_digest_config, DigestConfig};
pub use connect::{connect_provider, ConfiguredProvider, ConnectError};
pub use config_gap::{load_gap_config, ConfigError, GapConfig, ProviderKind};
