// models/src/medical/login.rs
use serde::{Deserialize, Serialize};

/// A login attempt as typed into the sign-in form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String, // Plaintext password for login attempt
}

impl Login {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Login {
            email: email.into(),
            password: password.into(),
        }
    }

    /// The sign-in button stays disabled until both fields hold something.
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}
