pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod message;
pub mod server;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
