//! Ambient helpers shared by the fallback crates: tracing setup, startup
//! environment checks and the admin HTTP server.

pub mod admin_http;
pub mod env;
pub mod utils;
