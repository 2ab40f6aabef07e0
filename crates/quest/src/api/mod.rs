//! HTTP API module.
//!
//! Thin glue between HTTP requests and the bridge: each request is one poll
//! cycle for the caller's session.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
