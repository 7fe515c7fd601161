//! Session cookie parsing and construction.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

use crate::webauth::auth::BrokerConfig;

pub(crate) const SESSION_COOKIE_NAME: &str = "webauth_session";

/// Session id from the request cookies, if any.
pub(crate) fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `HttpOnly` cookie carrying a freshly minted session id.
pub(crate) fn session_cookie(
    config: &BrokerConfig,
    session_id: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.session_ttl().num_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );
    if config.secure_cookie() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
