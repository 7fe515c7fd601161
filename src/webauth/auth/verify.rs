//! Identity verification.
//!
//! Runs on every request. The rules are ordered and the first match wins:
//! tagged caller, then tagged self under local access, then ownership, then
//! the session lookup itself.

use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use tracing::{debug, instrument, warn};

use super::{
    error::AuthError,
    identity::NodeIdentity,
    session::{self, BrowserSession},
    state::Broker,
};

/// Identities resolved for a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub remote: NodeIdentity,
    pub self_node: NodeIdentity,
}

impl Caller {
    /// The request comes from the serving machine itself.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.remote.id == self.self_node.id
    }
}

/// Snapshot returned by the session status endpoint.
#[derive(Clone, Debug)]
pub struct SessionStatus {
    pub caller: Caller,
    pub session: Option<BrowserSession>,
    pub authorized: bool,
}

impl Broker {
    /// Resolve both identities and apply the identity rules.
    ///
    /// # Errors
    /// Returns one of the identity rejections, or `SelfIdentity` if the local
    /// identity cannot be resolved.
    #[instrument(skip(self))]
    pub async fn resolve_caller(&self, addr: SocketAddr) -> Result<Caller, AuthError> {
        let remote = match self.resolver.who_is(addr).await {
            Ok(Some(remote)) => remote,
            Ok(None) => return Err(AuthError::NotUsingOverlayNetwork),
            Err(err) => {
                warn!("whois lookup for {addr} failed: {err:#}");
                return Err(AuthError::NotUsingOverlayNetwork);
            }
        };
        let self_node = self
            .resolver
            .self_node()
            .await
            .map_err(AuthError::SelfIdentity)?;

        if remote.tagged {
            return Err(AuthError::TaggedRemoteSource);
        }

        let caller = Caller { remote, self_node };
        let is_local = caller.is_local();
        if is_local && caller.self_node.tagged {
            return Err(AuthError::TaggedLocalSource);
        }
        // A tagged self has no owner to compare against.
        if !is_local
            && !caller.self_node.tagged
            && caller.remote.user_id != caller.self_node.user_id
        {
            return Err(AuthError::NotOwner);
        }

        Ok(caller)
    }

    /// Find the session named by the cookie and check it belongs to `caller`.
    ///
    /// Expired or mismatched entries are deleted on the way out.
    ///
    /// # Errors
    /// Returns `NoSession` when there is no usable session.
    pub async fn lookup_session(
        &self,
        caller: &Caller,
        session_id: Option<&str>,
    ) -> Result<BrowserSession, AuthError> {
        let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
            return Err(AuthError::NoSession);
        };
        let Some(session) = self.sessions.get(session_id).await else {
            return Err(AuthError::NoSession);
        };

        if !session.belongs_to(&caller.remote) {
            debug!(
                "session {} is bound to {}/{}, not {}/{}",
                session.short_id(),
                session.src_node,
                session.src_user,
                caller.remote.id,
                caller.remote.user_id
            );
            self.sessions.remove(&session.id).await;
            return Err(AuthError::NoSession);
        }
        if session.is_expired(self.now(), self.sessions.ttl()) {
            debug!("session {} expired", session.short_id());
            self.sessions.remove(&session.id).await;
            return Err(AuthError::NoSession);
        }

        Ok(session)
    }

    /// Full verification: identity rules followed by the session lookup.
    ///
    /// # Errors
    /// Any identity rejection, or `NoSession`.
    pub async fn verify(
        &self,
        addr: SocketAddr,
        session_id: Option<&str>,
    ) -> Result<(BrowserSession, Caller), AuthError> {
        let caller = self.resolve_caller(addr).await?;
        let session = self.lookup_session(&caller, session_id).await?;
        Ok((session, caller))
    }

    /// Whether `session` grants access at `now`.
    #[must_use]
    pub fn is_authorized(&self, session: Option<&BrowserSession>, now: DateTime<Utc>) -> bool {
        session::is_authorized(session, now, self.sessions.ttl())
    }

    /// Verify the caller without contacting the authority or creating sessions.
    ///
    /// # Errors
    /// Identity rejections only; a missing session is reported as unauthorized.
    pub async fn session_status(
        &self,
        addr: SocketAddr,
        session_id: Option<&str>,
    ) -> Result<SessionStatus, AuthError> {
        let caller = self.resolve_caller(addr).await?;
        let session = match self.lookup_session(&caller, session_id).await {
            Ok(session) => Some(session),
            Err(AuthError::NoSession) => None,
            Err(err) => return Err(err),
        };
        let authorized = self.is_authorized(session.as_ref(), self.now());
        Ok(SessionStatus {
            caller,
            session,
            authorized,
        })
    }
}
