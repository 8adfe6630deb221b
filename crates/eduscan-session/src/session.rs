//! Authenticated identity record

use serde::{Deserialize, Serialize};

/// The signed-in teacher.
///
/// Serialized as `{ "id", "email", "name", "role" }`, which is also the
/// format of the persisted profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub email: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub role: String,
}
