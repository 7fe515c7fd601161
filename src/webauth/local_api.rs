//! Client for the local overlay daemon API.
//!
//! One client serves both seams: `whois`/`status` resolve identities and
//! `debug-web-client` drives the out-of-band handshake with the control plane.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{fmt, net::SocketAddr, time::Duration};
use tracing::{debug, instrument};
use url::Url;

use crate::webauth::auth::{
    AuthAuthority, AuthFlow, IdentityResolver, NodeId, NodeIdentity, PollOutcome, UserId,
};
use crate::APP_USER_AGENT;

const WHOIS_PATH: &str = "/localapi/v0/whois";
const STATUS_PATH: &str = "/localapi/v0/status";
const WEB_CLIENT_PATH: &str = "/localapi/v0/debug-web-client";

/// Upper bound for every call except a waiting poll, which the broker bounds itself.
const LOCAL_API_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct WhoIsResponse {
    #[serde(rename = "Node")]
    node: WireNode,
    #[serde(rename = "UserProfile", default)]
    user_profile: Option<WireUserProfile>,
}

#[derive(Deserialize)]
struct WireNode {
    #[serde(rename = "StableID")]
    stable_id: String,
    #[serde(rename = "Tags", default)]
    tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct WireUserProfile {
    #[serde(rename = "ID")]
    id: u64,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(rename = "Self", default)]
    self_node: Option<WireSelf>,
}

#[derive(Deserialize)]
struct WireSelf {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "UserID", default)]
    user_id: u64,
    #[serde(rename = "Tags", default)]
    tags: Option<Vec<String>>,
}

#[derive(Serialize)]
struct WebClientRequest<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Src", skip_serializing_if = "Option::is_none")]
    src: Option<&'a str>,
    #[serde(rename = "User", skip_serializing_if = "Option::is_none")]
    user: Option<u64>,
    #[serde(rename = "Wait")]
    wait: bool,
}

#[derive(Deserialize)]
struct WebClientResponse {
    #[serde(rename = "ID", default)]
    id: String,
    #[serde(rename = "URL", default)]
    url: String,
    #[serde(rename = "Complete", default)]
    complete: bool,
}

fn is_tagged(tags: Option<&Vec<String>>) -> bool {
    tags.is_some_and(|tags| !tags.is_empty())
}

pub struct LocalApiClient {
    base_url: Url,
    token: Option<SecretString>,
    client: Client,
    request_timeout: Duration,
}

impl LocalApiClient {
    /// Build a client for the local API at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or not HTTP(S).
    pub fn new(base_url: &str, token: Option<SecretString>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid local API URL: {base_url}"))?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => return Err(anyhow!("Unsupported local API URL scheme: {scheme}")),
        }
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build local API HTTP client")?;
        Ok(Self {
            base_url,
            token,
            client,
            request_timeout: LOCAL_API_REQUEST_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid local API endpoint: {path}"))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.basic_auth("", Some(token.expose_secret())),
            None => request,
        }
    }

    /// POST to the web client endpoint. Waiting polls carry no request timeout.
    async fn web_client(&self, body: &WebClientRequest<'_>) -> Result<reqwest::Response> {
        let url = self.endpoint(WEB_CLIENT_PATH)?;
        let mut request = self.authorize(self.client.post(url.clone())).json(body);
        if !body.wait {
            request = request.timeout(self.request_timeout);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("{url} request failed"))?;
        Ok(response)
    }
}

impl fmt::Debug for LocalApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

async fn error_from(url: &Url, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    anyhow!("{} - {}, {}", url, status, body.trim())
}

#[async_trait]
impl IdentityResolver for LocalApiClient {
    #[instrument(skip(self))]
    async fn who_is(&self, addr: SocketAddr) -> Result<Option<NodeIdentity>> {
        let mut url = self.endpoint(WHOIS_PATH)?;
        url.query_pairs_mut().append_pair("addr", &addr.to_string());

        let response = self
            .authorize(self.client.get(url.clone()))
            .timeout(self.request_timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            debug!("whois {addr}: {}", response.status());
            return Ok(None);
        }

        let whois: WhoIsResponse = response.json().await?;
        Ok(Some(NodeIdentity {
            id: NodeId(whois.node.stable_id),
            user_id: UserId(whois.user_profile.map_or(0, |profile| profile.id)),
            tagged: is_tagged(whois.node.tags.as_ref()),
        }))
    }

    #[instrument(skip(self))]
    async fn self_node(&self) -> Result<NodeIdentity> {
        let url = self.endpoint(STATUS_PATH)?;
        let response = self
            .authorize(self.client.get(url.clone()))
            .timeout(self.request_timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from(&url, response).await);
        }

        let status: StatusResponse = response.json().await?;
        let self_node = status
            .self_node
            .ok_or_else(|| anyhow!("missing self node in status"))?;
        Ok(NodeIdentity {
            id: NodeId(self_node.id),
            user_id: UserId(self_node.user_id),
            tagged: is_tagged(self_node.tags.as_ref()),
        })
    }
}

#[async_trait]
impl AuthAuthority for LocalApiClient {
    #[instrument(skip(self))]
    async fn start_auth(&self, node: &NodeId, user: UserId) -> Result<AuthFlow> {
        let url = self.endpoint(WEB_CLIENT_PATH)?;
        let response = self
            .web_client(&WebClientRequest {
                id: "",
                src: Some(node.as_str()),
                user: Some(user.0),
                wait: false,
            })
            .await?;
        if !response.status().is_success() {
            return Err(error_from(&url, response).await);
        }

        let flow: WebClientResponse = response.json().await?;
        if flow.id.is_empty() || flow.url.is_empty() {
            return Err(anyhow!("{url} returned no auth ID or URL"));
        }
        Ok(AuthFlow {
            id: flow.id,
            url: flow.url,
        })
    }

    #[instrument(skip(self, auth_id))]
    async fn poll_auth(&self, auth_id: &str, wait: bool) -> Result<PollOutcome> {
        let url = self.endpoint(WEB_CLIENT_PATH)?;
        let response = self
            .web_client(&WebClientRequest {
                id: auth_id,
                src: None,
                user: None,
                wait,
            })
            .await?;

        match response.status() {
            status if status.is_success() => {
                let poll: WebClientResponse = response.json().await?;
                Ok(if poll.complete {
                    PollOutcome::Complete
                } else {
                    PollOutcome::Pending
                })
            }
            StatusCode::UNAUTHORIZED => {
                let reason = response.text().await.unwrap_or_default();
                Ok(PollOutcome::Failed(reason.trim().to_string()))
            }
            _ => Err(error_from(&url, response).await),
        }
    }
}
