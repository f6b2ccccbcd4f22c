//! starter-axum - HTTP surface of the backend starter
//!
//! Wires [`starter_core`] into an axum [`Router`](axum::Router) with CORS and
//! request tracing, and wraps it in a [`Server`] with fixed timeouts.

mod error;
mod handlers;
mod middleware;
mod router;
mod server;
mod state;

pub use router::app_router;
pub use server::{IDLE_TIMEOUT, READ_TIMEOUT, Server, WRITE_TIMEOUT};
pub use state::AppState;
