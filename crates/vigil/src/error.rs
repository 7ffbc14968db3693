//! Error types for collaborator implementations.

use thiserror::Error;

/// Errors a collaborator implementation may produce while talking to its
/// backing service.
///
/// These never cross the engine boundary raw: provider streams fold them
/// into [`Resource::Failure`](crate::Resource) envelopes before the engine
/// sees them.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unavailable: {0}")]
    Network(String),

    #[error("not authorized")]
    Unauthorized,

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
