//! HTTP front end
//!
//! Serves the prediction form and shares the inference path with the CLI.

pub mod server;

pub use server::{router, serve, AppState, ServeBackend};
