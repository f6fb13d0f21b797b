//! # Bridge Error Types
//!
//! All errors that can occur while creating, configuring, or tearing down the
//! lifecycle bridge.

use thiserror::Error;

/// The application's init hook refused to start.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("application init failed with status {code}")]
pub struct AppInitError {
    /// Nonzero status reported by the application.
    pub code: i32,
}

impl AppInitError {
    /// Creates an init error with the given status.
    #[must_use]
    pub const fn new(code: i32) -> Self {
        Self { code }
    }
}

/// Errors that can occur in the lifecycle bridge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Destroy was called with no matching create.
    #[error("bridge has not been created")]
    NotCreated,

    /// The application init hook failed; nothing was started.
    #[error(transparent)]
    AppInit(#[from] AppInitError),

    /// The application thread could not be started.
    #[error("failed to spawn application thread: {0}")]
    Spawn(String),

    /// Invalid or unreadable configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
