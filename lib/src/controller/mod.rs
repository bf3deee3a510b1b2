// lib/src/controller/mod.rs

// Create / update / delete orchestration over the patient and incident
// collections. Every mutation validates first, then persists, then hands
// the updated collection back to the caller.

pub mod attachments;
pub mod incidents;
pub mod patients;

pub use attachments::{decode_data_uri, encode_data_uri, guess_mime_type, AttachOutcome, AttachmentDraft};
pub use patients::PatientRemoval;

use crate::config::{AttachmentConfig, DEFAULT_MAX_FILE_SIZE_BYTES};
use crate::storage_engine::RecordStore;

#[derive(Clone)]
pub struct ClinicController {
    store: RecordStore,
    max_file_size: u64,
}

impl ClinicController {
    pub fn new(store: RecordStore) -> Self {
        ClinicController { store, max_file_size: DEFAULT_MAX_FILE_SIZE_BYTES }
    }

    pub fn with_attachment_config(mut self, config: &AttachmentConfig) -> Self {
        self.max_file_size = config.max_file_size_bytes;
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// An empty file list for a new incident form.
    pub fn new_attachment_draft(&self) -> AttachmentDraft {
        AttachmentDraft::new(self.max_file_size)
    }
}
