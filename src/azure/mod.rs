//! Azure CLI interaction.
//!
//! - [`provider`] - the narrow capability trait and its error taxonomy
//! - [`cli`] - the live `az` implementation
//! - [`auth`] - token validity checks and refresh flow

pub mod auth;
pub mod cli;
pub mod provider;

pub use auth::ensure_authenticated;
pub use cli::AzCli;
pub use provider::{NewRule, Provider, ProviderError};
