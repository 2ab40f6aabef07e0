//! Bridge between blocking programs and the poll-based driving layer.
//!
//! Handles the lifecycle of one program thread per session: spawning,
//! routing its I/O through an [`InteractionChannel`], collecting output with
//! a bounded wait, and evicting finished sessions.

mod channel;
mod console;
mod registry;
mod runner;
mod service;

pub use channel::{ChannelError, Drained, InteractionChannel};
pub use console::ChannelConsole;
pub use registry::SessionRegistry;
pub use runner::{RunState, RunnerInfo, SessionRunner};
pub use service::{BridgeConfig, BridgeService};
