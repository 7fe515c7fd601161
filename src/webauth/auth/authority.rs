//! Seam for the remote authority that runs the out-of-band handshake.

use async_trait::async_trait;

use super::identity::{NodeId, UserId};

/// A freshly started handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthFlow {
    /// Correlation token used to poll for completion.
    pub id: String,
    /// Where the human completes authentication.
    pub url: String,
}

/// Result of polling a handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Complete,
    Pending,
    Failed(String),
}

#[async_trait]
pub trait AuthAuthority: Send + Sync {
    /// Start a new handshake for the given node and user.
    async fn start_auth(&self, node: &NodeId, user: UserId) -> anyhow::Result<AuthFlow>;

    /// Poll a handshake. With `wait` the authority may block until the
    /// handshake resolves; callers bound that wait themselves.
    async fn poll_auth(&self, auth_id: &str, wait: bool) -> anyhow::Result<PollOutcome>;
}
