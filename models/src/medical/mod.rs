// models/src/medical/mod.rs

pub mod role;
pub mod user;
pub mod login;
pub mod patient;
pub mod incident;

pub use role::Role;
pub use user::User;
pub use login::Login;
pub use patient::{NewPatient, Patient};
pub use incident::{Attachment, Incident, IncidentStatus, NewIncident};
