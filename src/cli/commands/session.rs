use clap::{Arg, ArgMatches, Command};

pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_AUTH_WAIT_TIMEOUT_SECONDS: &str = "auth-wait-timeout-seconds";
pub const ARG_SECURE_COOKIE: &str = "secure-cookie";

#[derive(Debug, Clone)]
pub struct Options {
    pub session_ttl_seconds: i64,
    pub auth_wait_timeout_seconds: u64,
    pub secure_cookie: bool,
}

impl Options {
    /// Parse session arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the session TTL is not positive.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(2_592_000);
        if session_ttl_seconds <= 0 {
            anyhow::bail!("--{ARG_SESSION_TTL_SECONDS} must be greater than zero");
        }

        Ok(Self {
            session_ttl_seconds,
            auth_wait_timeout_seconds: matches
                .get_one::<u64>(ARG_AUTH_WAIT_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(60),
            secure_cookie: matches.get_flag(ARG_SECURE_COOKIE),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Browser session lifetime in seconds")
                .env("WEBAUTH_SESSION_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_AUTH_WAIT_TIMEOUT_SECONDS)
                .long(ARG_AUTH_WAIT_TIMEOUT_SECONDS)
                .help("Upper bound for a waiting login poll, in seconds")
                .env("WEBAUTH_AUTH_WAIT_TIMEOUT_SECONDS")
                .default_value("60")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_SECURE_COOKIE)
                .long(ARG_SECURE_COOKIE)
                .help("Mark the session cookie Secure (serve behind TLS)")
                .env("WEBAUTH_SECURE_COOKIE")
                .action(clap::ArgAction::SetTrue),
        )
}
