//! Session gate configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The single recognized account and how the gate stores it
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Login identifier (email)
    #[serde(default = "default_email")]
    pub email: String,

    /// Login secret
    #[serde(default = "default_password")]
    pub password: String,

    /// Profile id written on successful login
    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default = "default_display_name")]
    pub display_name: String,

    #[serde(default = "default_role")]
    pub role: String,

    /// Artificial latency applied to every login attempt
    #[serde(default = "default_login_delay_ms")]
    pub login_delay_ms: u64,

    /// Namespace prefix for the persisted keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_email() -> String {
    "teacher@eduscan.ai".to_string()
}

fn default_password() -> String {
    "demo123".to_string()
}

fn default_user_id() -> String {
    "1".to_string()
}

fn default_display_name() -> String {
    "Dr. Sarah Wilson".to_string()
}

fn default_role() -> String {
    "Teacher".to_string()
}

fn default_login_delay_ms() -> u64 {
    1000
}

fn default_key_prefix() -> String {
    "eduscan_".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            email: default_email(),
            password: default_password(),
            user_id: default_user_id(),
            display_name: default_display_name(),
            role: default_role(),
            login_delay_ms: default_login_delay_ms(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl AuthConfig {
    /// Key holding the opaque token marker
    pub fn token_key(&self) -> String {
        format!("{}token", self.key_prefix)
    }

    /// Key holding the serialized profile
    pub fn profile_key(&self) -> String {
        format!("{}user", self.key_prefix)
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    pub fn matches(&self, identifier: &str, secret: &str) -> bool {
        self.email == identifier && self.password == secret
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .field("login_delay_ms", &self.login_delay_ms)
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}
