use crate::webauth::{
    self,
    auth::{Broker, BrokerConfig},
    local_api::LocalApiClient,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub local_api_url: String,
    pub local_api_token: Option<SecretString>,
    pub session_ttl_seconds: i64,
    pub auth_wait_timeout_seconds: u64,
    pub secure_cookie: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the local API URL is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let client = Arc::new(
        LocalApiClient::new(&args.local_api_url, args.local_api_token)
            .context("Failed to configure local API client")?,
    );
    debug!("Local API: {client:?}");

    let config = BrokerConfig::new()
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_auth_wait_timeout_seconds(args.auth_wait_timeout_seconds)
        .with_secure_cookie(args.secure_cookie);

    let broker = Arc::new(Broker::new(config, client.clone(), client));

    webauth::new(args.port, broker).await
}
