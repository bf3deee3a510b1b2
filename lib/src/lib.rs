// lib/src/lib.rs

// Storage, derivations and form handling for the dental clinic record
// keeper. Record types come from the `models` crate.

pub mod config;
pub mod controller;
pub mod derivation;
pub mod errors;
pub mod storage_engine;

pub use models::{Attachment, Identifier, Incident, IncidentStatus, NewIncident, NewPatient, Patient, Role, User};

// Explicit re-exports
pub use crate::config::{load_config, ClinicConfig};
pub use crate::controller::{AttachOutcome, AttachmentDraft, ClinicController, PatientRemoval};
pub use crate::errors::*;
pub use crate::storage_engine::{
    create_storage, Collection, InMemoryStorage, LoadOutcome, RecordStore, SledStorage, StorageEngine,
};
