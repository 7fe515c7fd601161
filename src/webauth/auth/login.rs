//! Login and poll state machine.
//!
//! Sessions start `Pending`, become authenticated only through a waiting poll
//! that observes completion, and are removed when the authority reports
//! failure. Non-waiting polls never contact the authority.

use std::net::SocketAddr;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use super::{
    authority::PollOutcome,
    error::AuthError,
    identity::NodeIdentity,
    session::BrowserSession,
    state::Broker,
};

/// What the login endpoint should tell the browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session is authenticated.
    Authorized,
    /// The handshake is still outstanding on an existing session.
    Pending { auth_url: String },
    /// A new pending session was minted; its id must be sent as the cookie.
    Created(BrowserSession),
}

impl Broker {
    /// Drive one call of the login endpoint.
    ///
    /// # Errors
    /// Identity rejections, `AuthFailed` when the authority rejected the
    /// handshake, or a server error when a collaborator is unreachable.
    #[instrument(skip(self, session_id))]
    pub async fn login(
        &self,
        addr: SocketAddr,
        session_id: Option<&str>,
        wait: bool,
    ) -> Result<LoginOutcome, AuthError> {
        let caller = self.resolve_caller(addr).await?;

        match self.lookup_session(&caller, session_id).await {
            Ok(session) if session.authenticated => Ok(LoginOutcome::Authorized),
            Ok(session) if !wait => Ok(LoginOutcome::Pending {
                auth_url: session.auth_url,
            }),
            Ok(session) => self.await_auth(session).await,
            Err(AuthError::NoSession) => self
                .create_session(&caller.remote)
                .await
                .map(LoginOutcome::Created),
            Err(err) => Err(err),
        }
    }

    /// Block on the authority for a pending session, bounded by the configured timeout.
    async fn await_auth(&self, session: BrowserSession) -> Result<LoginOutcome, AuthError> {
        let poll = self.authority.poll_auth(&session.auth_id, true);
        let outcome = match timeout(self.config.auth_wait_timeout(), poll).await {
            Ok(result) => result.map_err(AuthError::Authority)?,
            Err(_) => {
                debug!("wait for session {} timed out", session.short_id());
                PollOutcome::Pending
            }
        };

        match outcome {
            PollOutcome::Complete => {
                if !self.sessions.mark_authenticated(&session.id).await {
                    return Err(AuthError::NoSession);
                }
                info!(
                    "session {} authenticated for {}/{}",
                    session.short_id(),
                    session.src_node,
                    session.src_user
                );
                Ok(LoginOutcome::Authorized)
            }
            PollOutcome::Pending => Ok(LoginOutcome::Pending {
                auth_url: session.auth_url,
            }),
            PollOutcome::Failed(reason) => {
                warn!(
                    "authentication failed for session {}: {reason}",
                    session.short_id()
                );
                self.sessions.remove(&session.id).await;
                Err(AuthError::AuthFailed)
            }
        }
    }

    /// Start a handshake and store a new pending session for `remote`.
    ///
    /// Nothing is stored unless the authority hands back a flow.
    async fn create_session(&self, remote: &NodeIdentity) -> Result<BrowserSession, AuthError> {
        let id = self
            .sessions
            .new_session_id()
            .await
            .map_err(AuthError::SessionId)?;
        let flow = self
            .authority
            .start_auth(&remote.id, remote.user_id)
            .await
            .map_err(AuthError::Authority)?;

        let now = self.now();
        let session = BrowserSession {
            id,
            src_node: remote.id.clone(),
            src_user: remote.user_id,
            created: now,
            auth_id: flow.id,
            auth_url: flow.url,
            authenticated: false,
        };
        self.sessions.insert(session.clone(), now).await;
        info!(
            "created session {} for {}/{}",
            session.short_id(),
            remote.id,
            remote.user_id
        );

        Ok(session)
    }
}
