use axum::{
    extract::{ConnectInfo, Extension},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tracing::instrument;
use utoipa::ToSchema;

use super::{cookie::extract_session_id, error_response};
use crate::webauth::auth::{Broker, NodeId};

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Viewer {
    node_id: NodeId,
    user_id: u64,
    /// Request originated on the serving machine.
    local: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SessionResponse {
    authorized: bool,
    viewer: Viewer,
}

#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current session state for the calling node", body = SessionResponse),
        (status = 401, description = "Caller is not on the overlay network"),
        (status = 403, description = "Caller is tagged or does not own this node"),
        (status = 500, description = "Local identity unavailable")
    ),
    tag = "auth"
)]
/// Report whether the presented cookie grants access, without starting a handshake.
#[instrument(skip(headers, broker))]
pub async fn session(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    broker: Extension<Arc<Broker>>,
) -> Response {
    let session_id = extract_session_id(&headers);

    match broker.session_status(addr, session_id.as_deref()).await {
        Ok(status) => {
            let local = status.caller.is_local();
            let body = SessionResponse {
                authorized: status.authorized,
                viewer: Viewer {
                    node_id: status.caller.remote.id,
                    user_id: status.caller.remote.user_id.0,
                    local,
                },
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => error_response(err),
    }
}
