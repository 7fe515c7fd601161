//! Map parsed CLI arguments to the action the binary should run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{local_api, session};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let local_api_opts = local_api::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        local_api_url: local_api_opts.url,
        local_api_token: local_api_opts.token,
        session_ttl_seconds: session_opts.session_ttl_seconds,
        auth_wait_timeout_seconds: session_opts.auth_wait_timeout_seconds,
        secure_cookie: session_opts.secure_cookie,
    }))
}
