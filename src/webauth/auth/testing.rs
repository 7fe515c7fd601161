//! In-memory collaborators for broker tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use super::{
    AuthAuthority, AuthFlow, Broker, BrokerConfig, IdentityResolver, NodeId, NodeIdentity,
    PollOutcome, UserId,
};

pub(crate) const CONTROL_URL: &str = "http://localhost:8080";
pub(crate) const AUTH_PATH: &str = "/a/12345";
pub(crate) const AUTH_PATH_SUCCESS: &str = "/a/will-succeed";
pub(crate) const AUTH_PATH_ERROR: &str = "/a/will-error";
pub(crate) const AUTH_PATH_HANG: &str = "/a/will-hang";

pub(crate) const USER_A_NODE_IP: &str = "100.100.100.101";
pub(crate) const USER_B_NODE_IP: &str = "100.100.100.102";
pub(crate) const TAGGED_NODE_IP: &str = "100.100.100.103";

#[allow(clippy::unwrap_used)]
pub(crate) fn addr(ip: &str) -> SocketAddr {
    SocketAddr::new(ip.parse().unwrap(), 41641)
}

impl NodeIdentity {
    pub(crate) fn user(id: impl Into<String>, user_id: u64) -> Self {
        Self {
            id: NodeId::new(id),
            user_id: UserId(user_id),
            tagged: false,
        }
    }

    pub(crate) fn tagged(id: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
            user_id: UserId::default(),
            tagged: true,
        }
    }
}

pub(crate) fn user_a_node() -> NodeIdentity {
    NodeIdentity::user("1", 1)
}

pub(crate) fn user_b_node() -> NodeIdentity {
    NodeIdentity::user("2", 2)
}

pub(crate) fn tagged_node() -> NodeIdentity {
    NodeIdentity::tagged("3")
}

pub(crate) struct FakeResolver {
    peers: HashMap<IpAddr, NodeIdentity>,
    self_node: Mutex<Option<NodeIdentity>>,
    fail_whois: AtomicBool,
}

impl FakeResolver {
    /// Three peers: user A, user B and a tagged server.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn tailnet(self_node: NodeIdentity) -> Self {
        let peers = [
            (USER_A_NODE_IP, user_a_node()),
            (USER_B_NODE_IP, user_b_node()),
            (TAGGED_NODE_IP, tagged_node()),
        ]
        .into_iter()
        .map(|(ip, node)| (ip.parse().unwrap(), node))
        .collect();
        Self {
            peers,
            self_node: Mutex::new(Some(self_node)),
            fail_whois: AtomicBool::new(false),
        }
    }

    #[allow(clippy::unwrap_used)]
    pub(crate) fn set_self(&self, node: Option<NodeIdentity>) {
        *self.self_node.lock().unwrap() = node;
    }

    pub(crate) fn fail_whois(&self) {
        self.fail_whois.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityResolver for FakeResolver {
    async fn who_is(&self, addr: SocketAddr) -> Result<Option<NodeIdentity>> {
        if self.fail_whois.load(Ordering::SeqCst) {
            return Err(anyhow!("local api unreachable"));
        }
        Ok(self.peers.get(&addr.ip()).cloned())
    }

    #[allow(clippy::unwrap_used)]
    async fn self_node(&self) -> Result<NodeIdentity> {
        self.self_node
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("missing self node in status"))
    }
}

/// Authority whose poll result is chosen by the auth id.
#[derive(Default)]
pub(crate) struct FakeAuthority {
    pub(crate) starts: AtomicUsize,
    pub(crate) polls: AtomicUsize,
    fail_start: AtomicBool,
}

impl FakeAuthority {
    pub(crate) fn fail_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthAuthority for FakeAuthority {
    async fn start_auth(&self, node: &NodeId, _user: UserId) -> Result<AuthFlow> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(anyhow!("control unreachable"));
        }
        if node.as_str().is_empty() {
            return Err(anyhow!("missing Src node"));
        }
        Ok(AuthFlow {
            id: AUTH_PATH.to_string(),
            url: format!("{CONTROL_URL}{AUTH_PATH}"),
        })
    }

    async fn poll_auth(&self, auth_id: &str, _wait: bool) -> Result<PollOutcome> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        match auth_id {
            AUTH_PATH_SUCCESS => Ok(PollOutcome::Complete),
            AUTH_PATH_ERROR => Ok(PollOutcome::Failed(
                "authenticated as wrong user".to_string(),
            )),
            AUTH_PATH_HANG => std::future::pending().await,
            AUTH_PATH => Ok(PollOutcome::Pending),
            other => Err(anyhow!("unknown auth id {other}")),
        }
    }
}

/// Broker over the fakes with a frozen clock.
pub(crate) fn broker(
    config: BrokerConfig,
    resolver: Arc<FakeResolver>,
    authority: Arc<FakeAuthority>,
    now: DateTime<Utc>,
) -> Broker {
    Broker::new(config, resolver, authority).with_clock(Arc::new(move || now))
}
