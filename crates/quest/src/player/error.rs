//! Player session errors.

use thiserror::Error;

/// Player session errors.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The request carries no session cookie.
    #[error("no player session")]
    MissingSession,

    /// The cookie failed signature or shape validation.
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    /// The cookie is past its expiry.
    #[error("session token expired")]
    TokenExpired,

    /// Player session settings are unusable.
    #[error("invalid player session config: {0}")]
    Config(String),

    /// Token could not be produced.
    #[error("internal session error: {0}")]
    Internal(String),
}
