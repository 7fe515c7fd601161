//! Browser sessions and the in-memory session store.
//!
//! Expiry is enforced on read: an entry older than the TTL is treated as absent
//! by every lookup path, whether or not it is still resident. `insert` also
//! prunes such entries so the map does not grow without bound.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, TimeDelta, Utc};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::identity::{NodeId, NodeIdentity, UserId};

/// Prefix for minted session ids.
pub(crate) const SESSION_ID_PREFIX: &str = "wa-";
const SESSION_ID_BYTES: usize = 32;
const SESSION_ID_ATTEMPTS: usize = 5;

/// A browser session bound to one node and user for its whole lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserSession {
    pub id: String,
    pub src_node: NodeId,
    pub src_user: UserId,
    pub created: DateTime<Utc>,
    pub auth_id: String,
    pub auth_url: String,
    /// Only ever goes from false to true; failures remove the session instead.
    pub authenticated: bool,
}

impl BrowserSession {
    /// True once the session is at least `ttl` old.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.created >= ttl
    }

    /// True if the session is bound to `identity`.
    #[must_use]
    pub fn belongs_to(&self, identity: &NodeIdentity) -> bool {
        self.src_node == identity.id && self.src_user == identity.user_id
    }

    /// Shortened id for logs; full ids are bearer secrets.
    #[must_use]
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(SESSION_ID_PREFIX.len() + 6)
            .map_or(self.id.len(), |(i, _)| i);
        &self.id[..end]
    }
}

/// Whether `session` grants access at `now`.
///
/// Uses the same expiry predicate as session lookup, so a session can never be
/// authorized while verification treats it as absent.
#[must_use]
pub fn is_authorized(session: Option<&BrowserSession>, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
    session.is_some_and(|session| session.authenticated && !session.is_expired(now, ttl))
}

/// Concurrency-safe map of session id to session.
///
/// Callers never lock directly; every method takes the lock for the duration
/// of a single operation.
pub struct SessionStore {
    ttl: TimeDelta,
    sessions: RwLock<HashMap<String, BrowserSession>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Store a session, dropping entries that have expired as of `now`.
    pub async fn insert(&self, session: BrowserSession, now: DateTime<Utc>) {
        let mut sessions = self.sessions.write().await;
        let ttl = self.ttl;
        sessions.retain(|_, entry| !entry.is_expired(now, ttl));
        sessions.insert(session.id.clone(), session);
    }

    /// Snapshot of the session stored under `id`, expired or not.
    pub async fn get(&self, id: &str) -> Option<BrowserSession> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> Option<BrowserSession> {
        self.sessions.write().await.remove(id)
    }

    /// Flip `authenticated` to true in place.
    ///
    /// Returns false if the session no longer exists. Repeating the call is a no-op.
    pub async fn mark_authenticated(&self, id: &str) -> bool {
        match self.sessions.write().await.get_mut(id) {
            Some(session) => {
                session.authenticated = true;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Mint an unguessable id not currently in use.
    ///
    /// # Errors
    /// Returns an error if the OS random source fails or every attempt collides.
    pub async fn new_session_id(&self) -> Result<String, String> {
        for _ in 0..SESSION_ID_ATTEMPTS {
            let id = generate_session_id()?;
            if !self.sessions.read().await.contains_key(&id) {
                return Ok(id);
            }
        }
        Err("too many collisions generating new session; please refresh page".to_string())
    }
}

fn generate_session_id() -> Result<String, String> {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| format!("failed to generate session id: {err}"))?;
    Ok(format!(
        "{SESSION_ID_PREFIX}{}",
        Base64UrlUnpadded::encode_string(&bytes)
    ))
}
