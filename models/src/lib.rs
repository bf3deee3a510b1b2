// models/src/lib.rs

// Shared record types for the clinic workspace. Everything persisted to the
// store is defined here so `lib`, `security` and `server` agree on one schema.

pub mod errors;
pub mod identifiers;
pub mod medical;
pub mod util;

pub use errors::{ClinicError, ClinicResult, ValidationError, ValidationResult};
pub use identifiers::Identifier;
pub use medical::{Attachment, Incident, IncidentStatus, Login, NewIncident, NewPatient, Patient, Role, User};
