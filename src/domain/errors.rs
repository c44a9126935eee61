//! Domain errors. Used by ports, stores and use cases.
//!
//! Adapters map infrastructure errors into these. `Clone` because errors travel
//! inside `DataStatus` snapshots that every subscriber receives.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Network / transport failure (connection refused, TLS, timeout from the transport).
    #[error("request failed: {0}")]
    Transport(String),

    /// Remote endpoint answered with a non-success status.
    #[error("Failed: {code}")]
    Status { code: u16 },

    /// Tenant-scoped call attempted without a workspace credential. No request is sent.
    #[error("token not found: cannot {action} without a tenant token")]
    TokenNotFound { action: &'static str },

    #[error("failed generating workspace. workspace is already loaded.")]
    WorkspaceAlreadyLoaded,

    #[error("{0}")]
    NotFound(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported chart: {0}")]
    UnsupportedChart(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// Store background worker is gone (store dropped or runtime shutting down).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("UI error: {0}")]
    Ui(String),
}
