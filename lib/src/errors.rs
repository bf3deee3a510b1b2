// lib/src/errors.rs

// The clinic error taxonomy lives in `models` so every crate shares it;
// this module only gives the library its short `Result` alias.

pub use models::errors::{ClinicError, ClinicResult, ValidationError};

pub type Result<T> = std::result::Result<T, ClinicError>;
