// lib/src/controller/incidents.rs

use log::info;
use models::errors::{ClinicError, ValidationError};
use models::{Attachment, Identifier, Incident, NewIncident};

use super::attachments::{decode_data_uri, AttachmentDraft};
use super::ClinicController;
use crate::errors::Result;
use crate::storage_engine::Collection;

impl ClinicController {
    pub async fn incidents(&self) -> Result<Vec<Incident>> {
        self.store.load_records(Collection::Incidents).await
    }

    pub async fn find_incident(&self, id: &Identifier) -> Result<Incident> {
        self.incidents()
            .await?
            .into_iter()
            .find(|i| &i.id == id)
            .ok_or_else(|| ClinicError::NotFound(id.clone()))
    }

    /// Creates an incident (`editing` is `None`) or replaces the one with id `editing`.
    ///
    /// The referenced patient must exist. Status is taken as given; any
    /// status may replace any other.
    pub async fn save_incident(&self, form: NewIncident, editing: Option<&Identifier>) -> Result<Vec<Incident>> {
        form.validate()?;
        let patients = self.patients().await?;
        if !patients.iter().any(|p| p.id == form.patient_id.trim()) {
            return Err(ValidationError::UnknownPatient(form.patient_id.clone()).into());
        }

        let mut incidents = self.incidents().await?;
        match editing {
            Some(id) => {
                let index = incidents
                    .iter()
                    .position(|i| &i.id == id)
                    .ok_or_else(|| ClinicError::NotFound(id.clone()))?;
                let previous = incidents[index].status;
                incidents[index] = form.into_incident(id.clone())?;
                info!("Updated incident {} ({} -> {})", id, previous, incidents[index].status);
            }
            None => {
                let incident = form.into_incident(Identifier::generate())?;
                info!("Created incident {} for patient {}", incident.id, incident.patient_id);
                incidents.push(incident);
            }
        }

        self.store.save(Collection::Incidents, &incidents).await?;
        Ok(incidents)
    }

    pub async fn delete_incident(&self, id: &Identifier) -> Result<Vec<Incident>> {
        let mut incidents = self.incidents().await?;
        let before = incidents.len();
        incidents.retain(|i| &i.id != id);
        if incidents.len() == before {
            return Err(ClinicError::NotFound(id.clone()));
        }
        self.store.save(Collection::Incidents, &incidents).await?;
        info!("Deleted incident {}", id);
        Ok(incidents)
    }

    /// A file list seeded with what the incident already has, for editing.
    pub async fn attachment_draft_for(&self, id: &Identifier) -> Result<AttachmentDraft> {
        let incident = self.find_incident(id).await?;
        Ok(AttachmentDraft::from_files(incident.files, self.max_file_size))
    }

    /// Decodes the `index`th attachment of an incident back to its bytes.
    pub async fn attachment_contents(&self, id: &Identifier, index: usize) -> Result<(Attachment, Vec<u8>)> {
        let incident = self.find_incident(id).await?;
        let attachment = incident.files.into_iter().nth(index).ok_or_else(|| {
            ClinicError::InvalidData(format!("incident {} has no attachment #{}", id, index))
        })?;
        let (_, bytes) = decode_data_uri(&attachment.url)?;
        Ok((attachment, bytes))
    }
}
