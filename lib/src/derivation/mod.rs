// lib/src/derivation/mod.rs

// Read-only views computed from the stored collections. Nothing here is
// cached; callers pass in `now` so results are reproducible.

pub mod calendar;
pub mod dashboard;

pub use calendar::CalendarMonth;
pub use dashboard::{
    admin_dashboard, completed_count, patient_history, patient_overview, patient_past,
    patient_upcoming, pending_count, top_patients, total_revenue, upcoming_appointments,
    visit_counts, AdminDashboard, PatientOverview, PatientVisitCount, OVERVIEW_PREVIEW_LEN,
};
