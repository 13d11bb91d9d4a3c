//! Client for an out-of-process proc-macro expansion server.
//!
//! [`ProcMacroServer`] owns the server process and exchanges one request
//! and one response at a time over its stdio. [`Expander`] sits on top and
//! expands macro calls given as source text.

mod config;
mod error;
mod expander;
mod server;

pub use crate::config::ServerConfig;
pub use crate::error::ServerError;
pub use crate::expander::Expander;
pub use crate::server::ProcMacroServer;
