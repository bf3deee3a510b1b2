// lib/src/derivation/dashboard.rs

// Dashboard figures, recomputed from the raw collections on every read.
// All sorts are stable, so records with equal timestamps or counts keep
// their stored order.

use chrono::NaiveDateTime;
use models::{Identifier, Incident, IncidentStatus, Patient};
use serde::Serialize;

use crate::config::DashboardConfig;

/// Admin view: not completed and not yet in the past, soonest first.
///
/// Cancelled appointments still count here; the patient view excludes them.
pub fn upcoming_appointments(incidents: &[Incident], now: NaiveDateTime, limit: usize) -> Vec<&Incident> {
    let mut upcoming: Vec<&Incident> = incidents
        .iter()
        .filter(|i| i.appointment_date >= now && i.status != IncidentStatus::Completed)
        .collect();
    upcoming.sort_by(|a, b| a.appointment_date.cmp(&b.appointment_date));
    upcoming.truncate(limit);
    upcoming
}

/// Patient view: still ahead and neither completed nor cancelled, soonest first.
pub fn patient_upcoming<'a, I>(incidents: I, now: NaiveDateTime) -> Vec<&'a Incident>
where
    I: IntoIterator<Item = &'a Incident>,
{
    let mut upcoming: Vec<&Incident> = incidents
        .into_iter()
        .filter(|i| {
            i.appointment_date >= now
                && !matches!(i.status, IncidentStatus::Completed | IncidentStatus::Cancelled)
        })
        .collect();
    upcoming.sort_by(|a, b| a.appointment_date.cmp(&b.appointment_date));
    upcoming
}

/// Patient view: completed, or dated before `now`; most recent first.
pub fn patient_past<'a, I>(incidents: I, now: NaiveDateTime) -> Vec<&'a Incident>
where
    I: IntoIterator<Item = &'a Incident>,
{
    let mut past: Vec<&Incident> = incidents
        .into_iter()
        .filter(|i| i.is_completed() || i.appointment_date < now)
        .collect();
    past.sort_by(|a, b| b.appointment_date.cmp(&a.appointment_date));
    past
}

/// Sum of `cost` over completed incidents. Other statuses never count.
pub fn total_revenue<'a, I>(incidents: I) -> f64
where
    I: IntoIterator<Item = &'a Incident>,
{
    incidents
        .into_iter()
        .filter(|i| i.is_completed())
        .fold(0.0, |total, i| total + i.cost)
}

pub fn completed_count(incidents: &[Incident]) -> usize {
    incidents.iter().filter(|i| i.is_completed()).count()
}

pub fn pending_count(incidents: &[Incident]) -> usize {
    incidents.iter().filter(|i| !i.is_completed()).count()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientVisitCount<'a> {
    pub patient: &'a Patient,
    pub appointment_count: usize,
}

/// Every patient with their incident count, busiest first.
pub fn visit_counts<'a>(patients: &'a [Patient], incidents: &[Incident]) -> Vec<PatientVisitCount<'a>> {
    let mut counts: Vec<PatientVisitCount<'a>> = patients
        .iter()
        .map(|patient| PatientVisitCount {
            patient,
            appointment_count: incidents.iter().filter(|i| i.belongs_to(&patient.id)).count(),
        })
        .collect();
    counts.sort_by(|a, b| b.appointment_count.cmp(&a.appointment_count));
    counts
}

pub fn top_patients<'a>(patients: &'a [Patient], incidents: &[Incident], limit: usize) -> Vec<PatientVisitCount<'a>> {
    let mut counts = visit_counts(patients, incidents);
    counts.truncate(limit);
    counts
}

/// One patient's incidents, most recent first.
pub fn patient_history<'a>(incidents: &'a [Incident], patient_id: &Identifier) -> Vec<&'a Incident> {
    let mut history: Vec<&Incident> = incidents.iter().filter(|i| i.belongs_to(patient_id)).collect();
    history.sort_by(|a, b| b.appointment_date.cmp(&a.appointment_date));
    history
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard<'a> {
    pub total_patients: usize,
    pub upcoming: Vec<&'a Incident>,
    pub completed_treatments: usize,
    pub pending_treatments: usize,
    pub total_revenue: f64,
    pub top_patients: Vec<PatientVisitCount<'a>>,
}

pub fn admin_dashboard<'a>(
    patients: &'a [Patient],
    incidents: &'a [Incident],
    now: NaiveDateTime,
    config: &DashboardConfig,
) -> AdminDashboard<'a> {
    AdminDashboard {
        total_patients: patients.len(),
        upcoming: upcoming_appointments(incidents, now, config.upcoming_limit),
        completed_treatments: completed_count(incidents),
        pending_treatments: pending_count(incidents),
        total_revenue: total_revenue(incidents),
        top_patients: top_patients(patients, incidents, config.top_patients_limit),
    }
}

/// How many upcoming visits the overview tab previews.
pub const OVERVIEW_PREVIEW_LEN: usize = 2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientOverview<'a> {
    pub patient: &'a Patient,
    pub appointments: Vec<&'a Incident>,
    pub upcoming: Vec<&'a Incident>,
    pub past: Vec<&'a Incident>,
    pub completed_count: usize,
    pub total_spent: f64,
}

impl PatientOverview<'_> {
    pub fn next_visits(&self) -> &[&Incident] {
        &self.upcoming[..self.upcoming.len().min(OVERVIEW_PREVIEW_LEN)]
    }
}

pub fn patient_overview<'a>(patient: &'a Patient, incidents: &'a [Incident], now: NaiveDateTime) -> PatientOverview<'a> {
    let appointments = patient_history(incidents, &patient.id);
    let upcoming = patient_upcoming(appointments.iter().copied(), now);
    let past = patient_past(appointments.iter().copied(), now);
    let completed_count = past.iter().filter(|i| i.is_completed()).count();
    let total_spent = total_revenue(past.iter().copied());
    PatientOverview { patient, appointments, upcoming, past, completed_count, total_spent }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use models::util::parse_date_time;

    fn at(s: &str) -> NaiveDateTime {
        parse_date_time(s).unwrap()
    }

    fn patient(id: &str) -> Patient {
        Patient {
            id: id.parse().unwrap(),
            name: format!("Patient {}", id),
            dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            contact: "555".to_string(),
            email: format!("{}@example.com", id),
            address: String::new(),
            health_info: String::new(),
        }
    }

    fn incident(id: &str, patient: &str, date: &str, status: IncidentStatus, cost: f64) -> Incident {
        Incident {
            id: id.parse().unwrap(),
            patient_id: patient.parse().unwrap(),
            title: id.to_string(),
            description: String::new(),
            comments: String::new(),
            appointment_date: at(date),
            cost,
            status,
            treatment: String::new(),
            next_date: None,
            files: Vec::new(),
        }
    }

    const NOW: &str = "2030-06-15T12:00";

    #[test]
    fn upcoming_is_ascending_stable_and_capped() {
        use IncidentStatus::*;
        let incidents = vec![
            incident("late", "p1", "2030-07-01T09:00", Scheduled, 0.0),
            incident("tie-a", "p1", "2030-06-20T09:00", Scheduled, 0.0),
            incident("done", "p1", "2030-06-16T09:00", Completed, 0.0),
            incident("past", "p1", "2030-06-01T09:00", Scheduled, 0.0),
            incident("tie-b", "p2", "2030-06-20T09:00", Cancelled, 0.0),
            incident("now", "p2", NOW, InProgress, 0.0),
        ];
        let ids: Vec<&str> = upcoming_appointments(&incidents, at(NOW), 10)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["now", "tie-a", "tie-b", "late"]);

        assert_eq!(upcoming_appointments(&incidents, at(NOW), 2).len(), 2);
    }

    #[test]
    fn upcoming_cap_defaults_to_ten() {
        let incidents: Vec<Incident> = (0..15)
            .map(|d| incident(&format!("i{}", d), "p1", &format!("2030-07-{:02}T10:00", d + 1), IncidentStatus::Scheduled, 0.0))
            .collect();
        let dash = admin_dashboard(&[], &incidents, at(NOW), &DashboardConfig::default());
        assert_eq!(dash.upcoming.len(), 10);
        assert_eq!(dash.upcoming[0].id, "i0");
    }

    #[test]
    fn revenue_ignores_costs_of_unfinished_work() {
        use IncidentStatus::*;
        let incidents = vec![
            incident("a", "p1", NOW, Completed, 80.0),
            incident("b", "p1", NOW, Scheduled, 500.0),
            incident("c", "p1", NOW, InProgress, 40.0),
            incident("d", "p1", NOW, Cancelled, 30.0),
            incident("e", "p1", NOW, Completed, 20.5),
        ];
        assert_eq!(total_revenue(&incidents), 100.5);
        assert_eq!(completed_count(&incidents), 2);
        assert_eq!(pending_count(&incidents), 3);
    }

    #[test]
    fn revenue_with_nothing_completed_is_positive_zero() {
        assert!(total_revenue(&[] as &[Incident]).is_sign_positive());
        let pending = vec![incident("a", "p1", NOW, IncidentStatus::Scheduled, 50.0)];
        let revenue = total_revenue(&pending);
        assert_eq!(revenue, 0.0);
        assert!(revenue.is_sign_positive());
    }

    #[test]
    fn busiest_patient_ranks_first() {
        let patients = vec![patient("light"), patient("heavy")];
        let incidents = vec![
            incident("1", "heavy", NOW, IncidentStatus::Scheduled, 0.0),
            incident("2", "light", NOW, IncidentStatus::Scheduled, 0.0),
            incident("3", "heavy", NOW, IncidentStatus::Completed, 0.0),
            incident("4", "heavy", NOW, IncidentStatus::Cancelled, 0.0),
        ];
        let ranked = visit_counts(&patients, &incidents);
        assert_eq!(ranked[0].patient.id, "heavy");
        assert_eq!(ranked[0].appointment_count, 3);
        assert_eq!(ranked[1].patient.id, "light");
        assert_eq!(ranked[1].appointment_count, 1);
    }

    #[test]
    fn equal_counts_keep_patient_order() {
        let patients = vec![patient("a"), patient("b"), patient("c")];
        let ranked = top_patients(&patients, &[], 2);
        let ids: Vec<&str> = ranked.iter().map(|c| c.patient.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn patient_split_differs_from_admin_view_on_cancelled() {
        use IncidentStatus::*;
        let incidents = vec![
            incident("soon", "p1", "2030-06-16T09:00", Scheduled, 0.0),
            incident("cancelled", "p1", "2030-06-17T09:00", Cancelled, 0.0),
            incident("done-early", "p1", "2030-06-18T09:00", Completed, 60.0),
            incident("old", "p1", "2030-05-01T09:00", Scheduled, 0.0),
            incident("other", "p2", "2030-06-16T09:00", Scheduled, 0.0),
        ];
        let p = patient("p1");
        let overview = patient_overview(&p, &incidents, at(NOW));

        let history: Vec<&str> = overview.appointments.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(history, vec!["done-early", "cancelled", "soon", "old"]);

        let upcoming: Vec<&str> = overview.upcoming.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(upcoming, vec!["soon"]);

        // A future cancelled visit is neither upcoming nor past for the patient.
        let past: Vec<&str> = overview.past.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(past, vec!["done-early", "old"]);

        assert_eq!(overview.completed_count, 1);
        assert_eq!(overview.total_spent, 60.0);
        assert_eq!(overview.next_visits().len(), 1);

        let admin: Vec<&str> = upcoming_appointments(&incidents, at(NOW), 10).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(admin, vec!["soon", "other", "cancelled"]);
    }
}
