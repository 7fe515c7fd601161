//! Session broker core.
//!
//! Gates the admin interface on the caller's overlay identity. Every request
//! re-resolves the caller through the [`IdentityResolver`] and re-checks any
//! presented session against it; new sessions start an out-of-band handshake
//! with the [`AuthAuthority`] and only become authenticated once a waiting
//! poll observes completion.
//!
//! ## Identity rules
//!
//! Applied in order, first match wins:
//!
//! 1. Caller does not resolve to a peer: `NotUsingOverlayNetwork`.
//! 2. Caller is tagged: `TaggedRemoteSource`.
//! 3. Local access and the local machine is tagged: `TaggedLocalSource`.
//! 4. Remote access to an untagged machine by another user: `NotOwner`.
//! 5. No cookie, unknown id, identity mismatch or expiry: `NoSession`.
//!
//! ## Session lifetime
//!
//! One TTL governs both lookup and [`is_authorized`]. Expired sessions are
//! treated as absent on read; there is no background sweeper.

mod authority;
mod error;
mod identity;
mod login;
mod session;
mod state;
mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use authority::{AuthAuthority, AuthFlow, PollOutcome};
pub use error::AuthError;
pub use identity::{IdentityResolver, NodeId, NodeIdentity, UserId};
pub use login::LoginOutcome;
pub use session::{is_authorized, BrowserSession, SessionStore};
pub use state::{Broker, BrokerConfig, Clock};
pub use verify::{Caller, SessionStatus};
