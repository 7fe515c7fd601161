use axum::{
    extract::{ConnectInfo, Extension, Query},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, instrument};
use utoipa::{IntoParams, ToSchema};

use super::{
    cookie::{extract_session_id, session_cookie},
    error_response,
};
use crate::webauth::auth::{AuthError, Broker, LoginOutcome};

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct LoginResponse {
    #[serde(rename = "OK")]
    pub ok: bool,
    /// Where to complete authentication while the session is pending.
    #[serde(rename = "AuthURL", default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    /// `true` blocks until the pending handshake resolves or times out.
    wait: Option<String>,
}

#[utoipa::path(
    get,
    path = "/auth/login",
    params(LoginQuery),
    responses(
        (status = 200, description = "Authenticated, or pending with an auth URL", body = LoginResponse),
        (status = 401, description = "Authentication failed, or caller is not on the overlay network"),
        (status = 403, description = "Caller is tagged or does not own this node"),
        (status = 500, description = "Identity or auth authority unavailable")
    ),
    tag = "auth"
)]
#[instrument(skip(query, headers, broker))]
pub async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
    broker: Extension<Arc<Broker>>,
) -> Response {
    let wait = query.wait.as_deref() == Some("true");
    let session_id = extract_session_id(&headers);

    match broker.login(addr, session_id.as_deref(), wait).await {
        Ok(LoginOutcome::Authorized) => (
            StatusCode::OK,
            Json(LoginResponse {
                ok: true,
                auth_url: None,
            }),
        )
            .into_response(),
        Ok(LoginOutcome::Pending { auth_url }) => (
            StatusCode::OK,
            Json(LoginResponse {
                ok: false,
                auth_url: Some(auth_url),
            }),
        )
            .into_response(),
        Ok(LoginOutcome::Created(session)) => {
            let cookie = match session_cookie(broker.config(), &session.id) {
                Ok(cookie) => cookie,
                Err(err) => {
                    error!("Failed to build session cookie: {err}");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };
            let mut response_headers = HeaderMap::new();
            response_headers.insert(SET_COOKIE, cookie);
            (
                StatusCode::OK,
                response_headers,
                Json(LoginResponse {
                    ok: false,
                    auth_url: Some(session.auth_url),
                }),
            )
                .into_response()
        }
        // The session is gone; the next request starts a fresh handshake.
        Err(AuthError::AuthFailed) => StatusCode::UNAUTHORIZED.into_response(),
        Err(err) => error_response(err),
    }
}
