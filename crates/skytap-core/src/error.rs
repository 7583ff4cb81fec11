// ── Core error types ──
//
// Failures raised while projecting an API payload into an inventory.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// `network_connection_id` names a tunnel the environment doesn't have.
    #[error("No tunnels with id '{id}' found in the configuration")]
    TunnelNotFound { id: String },

    #[error("Failed to serialize inventory: {0}")]
    Serialization(#[from] serde_json::Error),
}
