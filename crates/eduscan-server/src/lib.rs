//! EduScan server wiring
//!
//! Loads `ServerConfig`, opens the state store and assembles the session
//! gate, upload simulator and UI into one `App`. The `eduscan-server` binary
//! is a thin CLI around this crate.

pub mod app;
pub mod config;

pub use app::App;
pub use config::{LoggingConfig, ServerConfig};
