//! Quest: run a blocking, line-oriented quiz program behind a stateless
//! poll API.
//!
//! - [`program`] defines the sequential program contract and bundles the quiz.
//! - [`bridge`] runs each program on its own thread and buffers its I/O.
//! - [`api`] exposes the bridge over HTTP.

pub mod api;
pub mod bridge;
pub mod player;
pub mod program;
pub mod scores;
