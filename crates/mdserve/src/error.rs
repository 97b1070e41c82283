//! Top-level error type surfaced by [`crate::supervisor::run`].

use crate::config::ConfigError;
use std::io;
use thiserror::Error;

/// Everything that can keep the server from starting or keep it from
/// running cleanly once started.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The supplied configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Binding or listening on the configured port failed.
    #[error("failed to bind listener: {0}")]
    Bind(#[source] io::Error),

    /// Installing a signal handler failed.
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] io::Error),
}
