//! Logging setup shared by the binaries

pub mod config;
#[cfg(feature = "subscriber")]
pub mod init;

pub use config::InstrumentationConfig;
#[cfg(feature = "subscriber")]
pub use init::init_tracing;
