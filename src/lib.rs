//! # webauth
//!
//! Session broker for a node's local admin web interface on an overlay
//! network. Browsers prove who they are through the network itself: every
//! request is attributed to a peer node and its owning user by the local
//! daemon, and a cookie-backed session is only granted after an out-of-band
//! handshake with the control plane completes.
//!
//! Only the user who owns the node may administer it, and tagged (service)
//! nodes are never granted sessions.

pub mod cli;
pub mod webauth;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
