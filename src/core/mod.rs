//! Framework-independent client logic: configuration and session handling

pub mod config;
#[cfg(feature = "ssr")]
pub mod proxy;
pub mod session;

pub use config::ClientConfig;
