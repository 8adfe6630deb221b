//! EduScan Session Gate
//!
//! Holds the signed-in teacher for this server process, mirrors it to the
//! persistent state store, and answers the "may this view be shown" question
//! for every protected route.
//!
//! Lifecycle:
//! - `Unknown` until `restore_session` has run once at startup
//! - then `Authenticated` or `Unauthenticated`, switched by `login` / `logout`

pub mod config;
pub mod error;
pub mod gate;
pub mod session;

pub use config::AuthConfig;
pub use error::{SessionError, SessionResult};
pub use gate::{AuthState, SessionGate, purge_persisted_session};
pub use session::Session;
