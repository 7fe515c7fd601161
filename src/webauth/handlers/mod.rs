pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::login;

pub mod session;
pub use self::session::session;

pub(crate) mod cookie;

use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::webauth::auth::AuthError;

/// Map a broker error to a response. Server errors are logged and carry no body.
pub(crate) fn error_response(err: AuthError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        error!("{:#}", anyhow::Error::new(err));
        return status.into_response();
    }
    if err.is_rejection() {
        debug!("Rejected caller: {err}");
    }
    (status, err.to_string()).into_response()
}
