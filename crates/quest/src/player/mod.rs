//! Player sessions.
//!
//! A player's registration (team, players, uid) and the id of their game
//! session travel in a signed cookie, so the server keeps no per-player
//! state beyond the bridge registry.

mod config;
mod error;
mod token;

pub use config::PlayerConfig;
pub use error::PlayerError;
pub use token::{PlayerClaims, PlayerKeys, PlayerSession, token_from_cookie_header};
