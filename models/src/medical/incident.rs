// models/src/medical/incident.rs
// An incident is one appointment / treatment record tied to a patient.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ValidationError, ValidationResult};
use crate::identifiers::Identifier;
use crate::util::{lenient_cost, local_date_time, optional_local_date_time};

/// Any status may follow any other; nothing here guards transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentStatus {
    #[default]
    Scheduled,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 4] = [
        IncidentStatus::Scheduled,
        IncidentStatus::InProgress,
        IncidentStatus::Completed,
        IncidentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Scheduled => "Scheduled",
            IncidentStatus::InProgress => "In Progress",
            IncidentStatus::Completed => "Completed",
            IncidentStatus::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for IncidentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "scheduled" => Ok(IncidentStatus::Scheduled),
            "inprogress" => Ok(IncidentStatus::InProgress),
            "completed" => Ok(IncidentStatus::Completed),
            "cancelled" | "canceled" => Ok(IncidentStatus::Cancelled),
            _ => Err(ValidationError::UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file attached to an incident, embedded as a data URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: Identifier,
    pub patient_id: Identifier,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub comments: String,
    #[serde(with = "local_date_time")]
    pub appointment_date: NaiveDateTime,
    #[serde(default, deserialize_with = "lenient_cost::deserialize")]
    pub cost: f64,
    #[serde(default)]
    pub status: IncidentStatus,
    #[serde(default)]
    pub treatment: String,
    #[serde(default, with = "optional_local_date_time", skip_serializing_if = "Option::is_none")]
    pub next_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub files: Vec<Attachment>,
}

impl Incident {
    pub fn is_completed(&self) -> bool {
        self.status == IncidentStatus::Completed
    }

    /// Calendar date of the appointment in local wall-clock terms.
    pub fn appointment_day(&self) -> NaiveDate {
        self.appointment_date.date()
    }

    pub fn belongs_to(&self, patient_id: &Identifier) -> bool {
        &self.patient_id == patient_id
    }
}

// --- DTO for the incident form ---
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    pub patient_id: String,
    pub title: String,
    pub description: String,
    pub comments: String,
    pub appointment_date: Option<NaiveDateTime>,
    pub cost: f64,
    pub status: IncidentStatus,
    pub treatment: String,
    pub next_date: Option<NaiveDateTime>,
    pub files: Vec<Attachment>,
}

impl NewIncident {
    /// Patient, title and appointment date are mandatory; cost can't be negative.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.patient_id.trim().is_empty() {
            return Err(ValidationError::MissingField("patientId"));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.appointment_date.is_none() {
            return Err(ValidationError::MissingField("appointmentDate"));
        }
        if !self.cost.is_finite() {
            return Err(ValidationError::InvalidCost(self.cost));
        }
        if self.cost < 0.0 {
            return Err(ValidationError::NegativeCost(self.cost));
        }
        Ok(())
    }

    pub fn into_incident(self, id: Identifier) -> ValidationResult<Incident> {
        self.validate()?;
        let appointment_date = self
            .appointment_date
            .ok_or(ValidationError::MissingField("appointmentDate"))?;
        Ok(Incident {
            id,
            patient_id: Identifier::new(self.patient_id.trim().to_string())?,
            title: self.title,
            description: self.description,
            comments: self.comments,
            appointment_date,
            cost: self.cost,
            status: self.status,
            treatment: self.treatment,
            next_date: self.next_date,
            files: self.files,
        })
    }
}

impl From<&Incident> for NewIncident {
    fn from(incident: &Incident) -> Self {
        NewIncident {
            patient_id: incident.patient_id.to_string(),
            title: incident.title.clone(),
            description: incident.description.clone(),
            comments: incident.comments.clone(),
            appointment_date: Some(incident.appointment_date),
            cost: incident.cost,
            status: incident.status,
            treatment: incident.treatment.clone(),
            next_date: incident.next_date,
            files: incident.files.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::parse_date_time;

    #[test]
    fn status_uses_display_names_on_the_wire() {
        assert_eq!(serde_json::to_string(&IncidentStatus::InProgress).unwrap(), "\"In Progress\"");
        let s: IncidentStatus = serde_json::from_str("\"Cancelled\"").unwrap();
        assert_eq!(s, IncidentStatus::Cancelled);
        assert_eq!("in-progress".parse::<IncidentStatus>().unwrap(), IncidentStatus::InProgress);
        assert!("done".parse::<IncidentStatus>().is_err());
    }

    #[test]
    fn stored_seed_incident_deserializes() {
        let json = r#"{
            "id": "i1", "patientId": "p1", "title": "Toothache",
            "description": "Upper molar pain", "comments": "Sensitive to cold",
            "appointmentDate": "2025-07-01T10:00:00", "cost": 80, "status": "Completed",
            "files": [{"name": "invoice.pdf", "url": "base64string-or-blob-url"}]
        }"#;
        let incident: Incident = serde_json::from_str(json).unwrap();
        assert!(incident.is_completed());
        assert_eq!(incident.cost, 80.0);
        assert_eq!(incident.files[0].size, 0);
        assert_eq!(incident.next_date, None);
        assert_eq!(incident.appointment_day(), NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    }

    #[test]
    fn form_requires_patient_title_and_date() {
        let mut form = NewIncident {
            patient_id: "p1".to_string(),
            title: "Cleaning".to_string(),
            appointment_date: Some(parse_date_time("2030-01-02T09:30").unwrap()),
            ..Default::default()
        };
        assert!(form.validate().is_ok());

        form.cost = -1.0;
        assert_eq!(form.validate(), Err(ValidationError::NegativeCost(-1.0)));
        form.cost = f64::INFINITY;
        assert_eq!(form.validate(), Err(ValidationError::InvalidCost(f64::INFINITY)));
        form.cost = f64::NAN;
        let err = form.validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCost(c) if c.is_nan()));
        assert_eq!(err.to_string(), "cost must be a finite amount, got NaN");
        form.cost = 0.0;

        form.appointment_date = None;
        assert_eq!(form.validate(), Err(ValidationError::MissingField("appointmentDate")));

        form.title.clear();
        assert_eq!(form.validate(), Err(ValidationError::MissingField("title")));
    }
}
