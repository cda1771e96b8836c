//! Starlight daemon: the proxy server and the session CLI

pub mod commands;
pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod state_dir;

pub use config::Settings;
pub use error::{DaemonError, Result};
