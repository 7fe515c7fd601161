//! Broker configuration and shared state.

use chrono::{DateTime, TimeDelta, Utc};
use std::{fmt, sync::Arc, time::Duration};

use super::{authority::AuthAuthority, identity::IdentityResolver, session::SessionStore};

const DEFAULT_SESSION_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_AUTH_WAIT_TIMEOUT_SECONDS: u64 = 60;

/// Source of the current time; swapped out in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone, Debug)]
pub struct BrokerConfig {
    session_ttl_seconds: i64,
    auth_wait_timeout_seconds: u64,
    secure_cookie: bool,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            auth_wait_timeout_seconds: DEFAULT_AUTH_WAIT_TIMEOUT_SECONDS,
            secure_cookie: false,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_auth_wait_timeout_seconds(mut self, seconds: u64) -> Self {
        self.auth_wait_timeout_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Session lifetime; out-of-range values fall back to the default.
    #[must_use]
    pub fn session_ttl(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.session_ttl_seconds)
            .filter(|ttl| *ttl > TimeDelta::zero())
            .unwrap_or_else(|| TimeDelta::seconds(DEFAULT_SESSION_TTL_SECONDS))
    }

    #[must_use]
    pub fn auth_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_wait_timeout_seconds)
    }

    #[must_use]
    pub fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }
}

/// The session broker: identity verification and the login state machine on
/// top of the two collaborators and the session store.
pub struct Broker {
    pub(super) config: BrokerConfig,
    pub(super) resolver: Arc<dyn IdentityResolver>,
    pub(super) authority: Arc<dyn AuthAuthority>,
    pub(super) sessions: SessionStore,
    pub(super) clock: Clock,
}

impl Broker {
    pub fn new(
        config: BrokerConfig,
        resolver: Arc<dyn IdentityResolver>,
        authority: Arc<dyn AuthAuthority>,
    ) -> Self {
        let sessions = SessionStore::new(config.session_ttl());
        Self {
            config,
            resolver,
            authority,
            sessions,
            clock: Arc::new(Utc::now),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn resolver(&self) -> &dyn IdentityResolver {
        self.resolver.as_ref()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

impl fmt::Debug for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{BrokerConfig, DEFAULT_AUTH_WAIT_TIMEOUT_SECONDS, DEFAULT_SESSION_TTL_SECONDS};
    use chrono::TimeDelta;
    use std::time::Duration;

    #[test]
    fn broker_config_defaults_and_overrides() {
        let config = BrokerConfig::new();
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.session_ttl(), TimeDelta::days(30));
        assert_eq!(
            config.auth_wait_timeout(),
            Duration::from_secs(DEFAULT_AUTH_WAIT_TIMEOUT_SECONDS)
        );
        assert!(!config.secure_cookie());

        let config = config
            .with_session_ttl_seconds(120)
            .with_auth_wait_timeout_seconds(5)
            .with_secure_cookie(true);
        assert_eq!(config.session_ttl(), TimeDelta::seconds(120));
        assert_eq!(config.auth_wait_timeout(), Duration::from_secs(5));
        assert!(config.secure_cookie());
    }

    #[test]
    fn non_positive_ttl_falls_back_to_default() {
        let config = BrokerConfig::new().with_session_ttl_seconds(0);
        assert_eq!(config.session_ttl(), TimeDelta::days(30));
        let config = BrokerConfig::new().with_session_ttl_seconds(i64::MAX);
        assert_eq!(config.session_ttl(), TimeDelta::days(30));
    }
}
