//! Overlay identities and the resolver seam.
//!
//! Identities are resolved fresh on every request: a node can be re-tagged or
//! change owners between two requests, so nothing here is cached.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, net::SocketAddr};
use utoipa::ToSchema;

/// Stable identifier of a node on the overlay network.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the human user owning a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved node: who it is, who owns it, and whether it is a tagged device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeIdentity {
    pub id: NodeId,
    pub user_id: UserId,
    /// Tagged nodes are device-class identities without an owning user.
    pub tagged: bool,
}

/// Maps network addresses to overlay identities.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve the peer behind `addr`.
    ///
    /// Returns `Ok(None)` when the address is not an overlay peer.
    async fn who_is(&self, addr: SocketAddr) -> anyhow::Result<Option<NodeIdentity>>;

    /// Identity of the machine serving the request.
    async fn self_node(&self) -> anyhow::Result<NodeIdentity>;
}
