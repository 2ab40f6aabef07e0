//! Wire types for the Quest poll-cycle API.
//!
//! A client drives one quiz session through discrete request/response
//! cycles:
//!
//! ```text
//! Client --[POST /start_quest: team, players]--> Backend (issues session cookie)
//! Client --[POST /play: {action, answer}]------> Backend --> SessionRunner
//!        <--[{output, finished}]-----------------
//! ```
//!
//! Each `/play` call submits at most one answer and returns whatever output
//! the quiz produced since the previous call.

pub mod play;

pub use play::{PlayAction, PlayRequest, PlayResponse, StartQuestRequest, StartQuestResponse};
