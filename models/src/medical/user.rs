// models/src/medical/user.rs

use serde::{Deserialize, Serialize};

use crate::identifiers::Identifier;
use super::role::Role;

// --- Stored User Struct ---
// Login credentials are seeded once and never edited afterwards.
// The password is kept in plaintext; the store is a local single-user file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Identifier,
    pub role: Role,
    pub email: String,
    pub password: String,
    /// Set for `Role::Patient` accounts; points at the patient record they own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Identifier>,
}

impl User {
    /// Exact, case-sensitive comparison of both credentials.
    pub fn matches_credentials(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
