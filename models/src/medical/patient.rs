// models/src/medical/patient.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};
use crate::identifiers::Identifier;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Identifier,
    pub name: String,
    pub dob: NaiveDate,
    pub contact: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub health_info: String,
}

// --- DTO for the patient form ---
// Holds what the admin typed; `dob` stays optional until validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub contact: String,
    pub email: String,
    pub address: String,
    pub health_info: String,
}

impl NewPatient {
    /// Name, date of birth, contact and email are mandatory.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.dob.is_none() {
            return Err(ValidationError::MissingField("dob"));
        }
        if self.contact.trim().is_empty() {
            return Err(ValidationError::MissingField("contact"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        Ok(())
    }

    /// Validates the form and stamps it with `id`.
    pub fn into_patient(self, id: Identifier) -> ValidationResult<Patient> {
        self.validate()?;
        let dob = self.dob.ok_or(ValidationError::MissingField("dob"))?;
        Ok(Patient {
            id,
            name: self.name,
            dob,
            contact: self.contact,
            email: self.email,
            address: self.address,
            health_info: self.health_info,
        })
    }
}

impl From<&Patient> for NewPatient {
    fn from(patient: &Patient) -> Self {
        NewPatient {
            name: patient.name.clone(),
            dob: Some(patient.dob),
            contact: patient.contact.clone(),
            email: patient.email.clone(),
            address: patient.address.clone(),
            health_info: patient.health_info.clone(),
        }
    }
}
