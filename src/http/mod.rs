//! HTTP server module.
//!
//! The server includes:
//! - Address resolution from `[http]` settings
//! - Graceful shutdown on SIGTERM/SIGINT with connection draining

mod server;
mod shutdown;

pub use server::{bind_address, start_server, ServerError};
