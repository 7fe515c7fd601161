use axum::http::StatusCode;
use thiserror::Error;

/// Reasons a request cannot be served a session.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not connected over the overlay network")]
    NotUsingOverlayNetwork,
    #[error("tagged nodes cannot authenticate")]
    TaggedRemoteSource,
    #[error("tagged node accessed locally has no user to authenticate")]
    TaggedLocalSource,
    #[error("not the owner of this node")]
    NotOwner,
    #[error("no session")]
    NoSession,
    #[error("authentication failed")]
    AuthFailed,
    #[error("failed to resolve self identity")]
    SelfIdentity(#[source] anyhow::Error),
    #[error("auth authority request failed")]
    Authority(#[source] anyhow::Error),
    #[error("{0}")]
    SessionId(String),
}

impl AuthError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotUsingOverlayNetwork | Self::NoSession | Self::AuthFailed => {
                StatusCode::UNAUTHORIZED
            }
            Self::TaggedRemoteSource | Self::TaggedLocalSource | Self::NotOwner => {
                StatusCode::FORBIDDEN
            }
            Self::SelfIdentity(_) | Self::Authority(_) | Self::SessionId(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// True for identity rejections that happen before any session lookup.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::NotUsingOverlayNetwork
                | Self::TaggedRemoteSource
                | Self::TaggedLocalSource
                | Self::NotOwner
        )
    }
}
