// lib/src/storage_engine/seed.rs

// First-run data. Seeding is an explicit step: nothing is written unless
// `initialize` is called, and it never overwrites a collection that already
// has content.

use log::{info, warn};
use models::{Incident, Patient, User};
use serde_json::Value;

use super::record_store::{Collection, LoadOutcome, RecordStore};
use crate::config::SeedConfig;
use crate::errors::Result;

const DEFAULT_USERS: &str = r#"[
    { "id": "1", "role": "Admin", "email": "admin@entnt.in", "password": "admin123" },
    { "id": "2", "role": "Patient", "email": "john@entnt.in", "password": "patient123", "patientId": "p1" }
]"#;

const DEFAULT_PATIENTS: &str = r#"[
    {
        "id": "p1",
        "name": "John Doe",
        "dob": "1990-05-10",
        "contact": "1234567890",
        "healthInfo": "No allergies"
    }
]"#;

const SAMPLE_INCIDENTS: &str = r#"[
    {
        "id": "i1",
        "patientId": "p1",
        "title": "Toothache",
        "description": "Upper molar pain",
        "comments": "Sensitive to cold",
        "appointmentDate": "2025-07-01T10:00:00",
        "cost": 80,
        "status": "Completed",
        "files": []
    }
]"#;

#[derive(Debug, Clone, PartialEq)]
pub struct SeedData {
    pub users: Vec<User>,
    pub patients: Vec<Patient>,
    pub incidents: Vec<Incident>,
}

impl SeedData {
    /// One admin, one patient account linked to patient `p1`, no incidents.
    pub fn standard() -> Result<Self> {
        Ok(SeedData {
            users: serde_json::from_str(DEFAULT_USERS)?,
            patients: serde_json::from_str(DEFAULT_PATIENTS)?,
            incidents: Vec::new(),
        })
    }

    /// The standard set plus one completed incident for `p1`.
    pub fn with_sample_incident() -> Result<Self> {
        let mut seed = Self::standard()?;
        seed.incidents = serde_json::from_str(SAMPLE_INCIDENTS)?;
        Ok(seed)
    }

    pub fn from_config(config: &SeedConfig) -> Result<Self> {
        if config.include_sample_incident {
            Self::with_sample_incident()
        } else {
            Self::standard()
        }
    }
}

/// Which collections `initialize` wrote and which it had to leave alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub seeded: Vec<Collection>,
    pub already_present: Vec<Collection>,
    /// Present but undecodable; left untouched so nothing is lost.
    pub corrupt: Vec<Collection>,
}

/// Writes each seed collection whose key is absent. Existing data wins.
pub async fn initialize(store: &RecordStore, seed: &SeedData) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let mut tx = store.transaction();

    for collection in [Collection::Users, Collection::Patients, Collection::Incidents] {
        match store.load_value::<Value>(collection).await? {
            LoadOutcome::Empty => {
                tx = match collection {
                    Collection::Users => tx.put(collection, &seed.users)?,
                    Collection::Patients => tx.put(collection, &seed.patients)?,
                    _ => tx.put(collection, &seed.incidents)?,
                };
                report.seeded.push(collection);
            }
            LoadOutcome::Parsed(_) => report.already_present.push(collection),
            LoadOutcome::Corrupt(reason) => {
                warn!("Not seeding '{}': existing content is corrupt ({})", collection, reason);
                report.corrupt.push(collection);
            }
        }
    }

    tx.commit().await?;
    if !report.seeded.is_empty() {
        info!("Seeded collections {:?}", report.seeded);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::{InMemoryStorage, StorageEngine};
    use models::Role;
    use std::sync::Arc;

    #[test]
    fn standard_seed_has_no_incidents() {
        let seed = SeedData::standard().unwrap();
        assert_eq!(seed.users.len(), 2);
        assert_eq!(seed.users[0].role, Role::Admin);
        assert_eq!(seed.users[1].patient_id.as_ref().unwrap(), "p1");
        assert_eq!(seed.patients[0].name, "John Doe");
        assert!(seed.incidents.is_empty());
        assert_eq!(SeedData::with_sample_incident().unwrap().incidents.len(), 1);
    }

    #[tokio::test]
    async fn initialize_only_fills_absent_collections() {
        let engine = Arc::new(InMemoryStorage::new());
        let store = RecordStore::new(engine.clone());
        store.save::<Patient>(Collection::Patients, &[]).await.unwrap();
        engine.insert("incidents", "oops").await.unwrap();

        let report = initialize(&store, &SeedData::standard().unwrap()).await.unwrap();
        assert_eq!(report.seeded, vec![Collection::Users]);
        assert_eq!(report.already_present, vec![Collection::Patients]);
        assert_eq!(report.corrupt, vec![Collection::Incidents]);

        // The empty patient list the admin saved is not replaced by the seed.
        assert!(store.load_records::<Patient>(Collection::Patients).await.unwrap().is_empty());
        assert_eq!(engine.retrieve("incidents").await.unwrap().as_deref(), Some("oops"));

        let again = initialize(&store, &SeedData::standard().unwrap()).await.unwrap();
        assert!(again.seeded.is_empty());
    }
}
