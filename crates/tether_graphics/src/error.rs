//! # Graphics Error Types
//!
//! All errors that can occur while driving the graphics context lifecycle.

use crate::provider::ProviderOp;
use thiserror::Error;

/// Errors that can occur in the graphics context lifecycle.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsError {
    /// A provider call reported failure.
    #[error("graphics provider failed: {op}")]
    Provider {
        /// The call that failed.
        op: ProviderOp,
    },

    /// Not bound, and the caller did not allow allocation.
    #[error("surface and context are not bound")]
    NotBound,
}

impl GraphicsError {
    /// Shorthand for a provider failure.
    #[must_use]
    pub const fn provider(op: ProviderOp) -> Self {
        Self::Provider { op }
    }
}

/// Result type for graphics operations.
pub type GraphicsResult<T> = Result<T, GraphicsError>;
