// lib/src/controller/patients.rs

use log::info;
use models::errors::ClinicError;
use models::{Identifier, Incident, NewPatient, Patient};

use super::ClinicController;
use crate::errors::Result;
use crate::storage_engine::Collection;

/// Both collections as they stand after a cascading patient delete.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRemoval {
    pub patients: Vec<Patient>,
    pub incidents: Vec<Incident>,
    pub removed_incidents: usize,
}

impl ClinicController {
    pub async fn patients(&self) -> Result<Vec<Patient>> {
        self.store.load_records(Collection::Patients).await
    }

    pub async fn find_patient(&self, id: &Identifier) -> Result<Patient> {
        self.patients()
            .await?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| ClinicError::NotFound(id.clone()))
    }

    /// Creates a patient (`editing` is `None`) or replaces the one with id `editing`.
    ///
    /// A new patient gets a freshly generated id; an edit keeps the old one
    /// and stays at its position in the list.
    pub async fn save_patient(&self, form: NewPatient, editing: Option<&Identifier>) -> Result<Vec<Patient>> {
        form.validate()?;
        let mut patients = self.patients().await?;

        match editing {
            Some(id) => {
                let index = patients
                    .iter()
                    .position(|p| &p.id == id)
                    .ok_or_else(|| ClinicError::NotFound(id.clone()))?;
                patients[index] = form.into_patient(id.clone())?;
                info!("Updated patient {}", id);
            }
            None => {
                let patient = form.into_patient(Identifier::generate())?;
                info!("Created patient {}", patient.id);
                patients.push(patient);
            }
        }

        self.store.save(Collection::Patients, &patients).await?;
        Ok(patients)
    }

    /// Removes a patient together with every incident that references it.
    ///
    /// Both collections are written in one transaction.
    pub async fn delete_patient(&self, id: &Identifier) -> Result<PatientRemoval> {
        let mut patients = self.patients().await?;
        let before = patients.len();
        patients.retain(|p| &p.id != id);
        if patients.len() == before {
            return Err(ClinicError::NotFound(id.clone()));
        }

        let mut incidents = self.incidents().await?;
        let incident_count = incidents.len();
        incidents.retain(|i| !i.belongs_to(id));
        let removed_incidents = incident_count - incidents.len();

        self.store
            .transaction()
            .put(Collection::Patients, &patients)?
            .put(Collection::Incidents, &incidents)?
            .commit()
            .await?;

        info!("Deleted patient {} and {} of their incidents", id, removed_incidents);
        Ok(PatientRemoval { patients, incidents, removed_incidents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::{InMemoryStorage, RecordStore, StorageEngine, WriteBatch};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use models::errors::ValidationError;
    use models::util::parse_date_time;
    use models::NewIncident;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn controller() -> ClinicController {
        ClinicController::new(RecordStore::new(Arc::new(InMemoryStorage::new())))
    }

    /// Reads pass through; writes fail once `read_only` is set.
    struct ReadOnlyDisk {
        inner: InMemoryStorage,
        read_only: AtomicBool,
    }

    impl ReadOnlyDisk {
        fn new() -> Self {
            ReadOnlyDisk { inner: InMemoryStorage::new(), read_only: AtomicBool::new(false) }
        }

        fn check(&self) -> Result<()> {
            if self.read_only.load(Ordering::SeqCst) {
                return Err(ClinicError::StorageError("disk is read-only".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl StorageEngine for ReadOnlyDisk {
        async fn insert(&self, key: &str, value: &str) -> Result<()> {
            self.check()?;
            self.inner.insert(key, value).await
        }

        async fn retrieve(&self, key: &str) -> Result<Option<String>> {
            self.inner.retrieve(key).await
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.check()?;
            self.inner.delete(key).await
        }

        async fn apply_batch(&self, batch: WriteBatch) -> Result<()> {
            self.check()?;
            self.inner.apply_batch(batch).await
        }

        async fn flush(&self) -> Result<()> {
            self.inner.flush().await
        }

        fn get_type(&self) -> &'static str {
            "read-only"
        }
    }

    fn form(name: &str) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            dob: NaiveDate::from_ymd_opt(1979, 11, 23),
            contact: "555-0199".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            address: "1 Main St".to_string(),
            health_info: "Penicillin allergy".to_string(),
        }
    }

    fn visit(patient: &Identifier, title: &str) -> NewIncident {
        NewIncident {
            patient_id: patient.to_string(),
            title: title.to_string(),
            appointment_date: Some(parse_date_time("2031-01-10T14:00").unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_generates_id_and_update_preserves_it() {
        let ctl = controller();
        let created = ctl.save_patient(form("Ada"), None).await.unwrap();
        assert_eq!(created.len(), 1);
        let id = created[0].id.clone();
        assert!(id.starts_with("id_"));

        let mut edit = form("Ada");
        edit.contact = "555-0000".to_string();
        let updated = ctl.save_patient(edit, Some(&id)).await.unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].id, id);
        assert_eq!(updated[0].contact, "555-0000");

        // The returned list is what got persisted.
        assert_eq!(ctl.patients().await.unwrap(), updated);
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_store() {
        let ctl = controller();
        let mut bad = form("Bo");
        bad.email.clear();
        let err = ctl.save_patient(bad, None).await.unwrap_err();
        assert!(matches!(err, ClinicError::Validation(ValidationError::MissingField("email"))));
        assert!(ctl.patients().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn editing_unknown_patient_is_not_found() {
        let ctl = controller();
        let ghost: Identifier = "ghost".parse().unwrap();
        assert!(matches!(ctl.save_patient(form("Cy"), Some(&ghost)).await, Err(ClinicError::NotFound(_))));
        assert!(matches!(ctl.delete_patient(&ghost).await, Err(ClinicError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_cascades_to_the_patients_incidents_only() {
        let ctl = controller();
        ctl.save_patient(form("Keep"), None).await.unwrap();
        let patients = ctl.save_patient(form("Drop"), None).await.unwrap();
        let keep = patients[0].id.clone();
        let drop = patients[1].id.clone();

        ctl.save_incident(visit(&drop, "Crown"), None).await.unwrap();
        ctl.save_incident(visit(&keep, "Checkup"), None).await.unwrap();
        ctl.save_incident(visit(&drop, "Root canal"), None).await.unwrap();

        let removal = ctl.delete_patient(&drop).await.unwrap();
        assert_eq!(removal.removed_incidents, 2);
        assert_eq!(removal.patients.len(), 1);
        assert_eq!(removal.patients[0].id, keep);
        assert_eq!(removal.incidents.len(), 1);
        assert_eq!(removal.incidents[0].title, "Checkup");

        // Re-read from the store: no incident points at the deleted patient.
        let stored = ctl.incidents().await.unwrap();
        assert!(stored.iter().all(|i| !i.belongs_to(&drop)));
        assert!(ctl.find_patient(&drop).await.is_err());
    }

    #[tokio::test]
    async fn failed_writes_surface_and_leave_records_untouched() {
        let disk = Arc::new(ReadOnlyDisk::new());
        let ctl = ClinicController::new(RecordStore::new(disk.clone()));
        let patients = ctl.save_patient(form("Eve"), None).await.unwrap();
        let eve = patients[0].id.clone();
        let incidents = ctl.save_incident(visit(&eve, "Scaling"), None).await.unwrap();

        disk.read_only.store(true, Ordering::SeqCst);

        let err = ctl.save_patient(form("Fay"), None).await.unwrap_err();
        assert!(matches!(err, ClinicError::StorageError(_)));

        let err = ctl.delete_patient(&eve).await.unwrap_err();
        assert!(matches!(err, ClinicError::TransactionError(_)));
        assert!(err.to_string().contains("disk is read-only"));

        assert_eq!(ctl.patients().await.unwrap(), patients);
        assert_eq!(ctl.incidents().await.unwrap(), incidents);
    }
}
