// server/src/cli/display.rs

// Plain-text rendering of records and derived views. Every function
// returns a String so handlers decide where it goes.

use chrono::NaiveDate;
use lib::derivation::{AdminDashboard, CalendarMonth, PatientOverview};
use models::{Incident, Patient, User};
use std::fmt::Write;

const WEEKDAY_HEADER: &str = "Su  Mo  Tu  We  Th  Fr  Sa";

pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

fn appointment_time(incident: &Incident) -> String {
    incident.appointment_date.format("%Y-%m-%d %H:%M").to_string()
}

fn patient_name<'a>(incident: &Incident, patients: &'a [Patient]) -> &'a str {
    patients
        .iter()
        .find(|p| p.id == incident.patient_id)
        .map(|p| p.name.as_str())
        .unwrap_or("Unknown patient")
}

pub fn format_user(user: &User) -> String {
    match &user.patient_id {
        Some(patient_id) => format!("{} ({}, patient {})", user.email, user.role, patient_id),
        None => format!("{} ({})", user.email, user.role),
    }
}

pub fn format_patient(patient: &Patient) -> String {
    let mut line = format!(
        "{}  {}  dob {}  {}  {}",
        patient.id, patient.name, patient.dob, patient.contact, patient.email
    );
    if !patient.health_info.is_empty() {
        let _ = write!(line, "  [{}]", patient.health_info);
    }
    line
}

pub fn format_incident(incident: &Incident, patients: &[Patient]) -> String {
    let mut line = format!(
        "{}  {}  {} - {}  [{}]  {}",
        incident.id,
        appointment_time(incident),
        patient_name(incident, patients),
        incident.title,
        incident.status,
        format_money(incident.cost)
    );
    if !incident.files.is_empty() {
        let _ = write!(line, "  ({} file(s))", incident.files.len());
    }
    line
}

/// An incident with everything the patient gets to see about it.
pub fn format_incident_detail(incident: &Incident) -> String {
    let mut out = format!("{}  {}  [{}]\n", appointment_time(incident), incident.title, incident.status);
    for (label, value) in [
        ("Description", &incident.description),
        ("Comments", &incident.comments),
        ("Treatment", &incident.treatment),
    ] {
        if !value.is_empty() {
            let _ = writeln!(out, "    {}: {}", label, value);
        }
    }
    if incident.is_completed() {
        let _ = writeln!(out, "    Cost: {}", format_money(incident.cost));
    }
    if let Some(next) = &incident.next_date {
        let _ = writeln!(out, "    Next visit: {}", next.format("%Y-%m-%d %H:%M"));
    }
    for (index, file) in incident.files.iter().enumerate() {
        let _ = writeln!(out, "    File #{}: {} ({}, {} bytes)", index, file.name, file.mime_type, file.size);
    }
    out
}

pub fn render_admin_dashboard(dashboard: &AdminDashboard<'_>, patients: &[Patient]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total patients:       {}", dashboard.total_patients);
    let _ = writeln!(out, "Completed treatments: {}", dashboard.completed_treatments);
    let _ = writeln!(out, "Pending treatments:   {}", dashboard.pending_treatments);
    let _ = writeln!(out, "Total revenue:        {}", format_money(dashboard.total_revenue));

    let _ = writeln!(out, "\nUpcoming appointments:");
    if dashboard.upcoming.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for incident in &dashboard.upcoming {
        let _ = writeln!(out, "  {}", format_incident(incident, patients));
    }

    let _ = writeln!(out, "\nTop patients:");
    for entry in &dashboard.top_patients {
        let _ = writeln!(out, "  {:<24} {} appointment(s)", entry.patient.name, entry.appointment_count);
    }
    out
}

pub fn render_overview(overview: &PatientOverview<'_>) -> String {
    let patient = overview.patient;
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", patient.name, patient.id);
    let _ = writeln!(out, "  Date of birth: {}", patient.dob);
    let _ = writeln!(out, "  Contact:       {}", patient.contact);
    let _ = writeln!(out, "  Email:         {}", patient.email);
    if !patient.address.is_empty() {
        let _ = writeln!(out, "  Address:       {}", patient.address);
    }
    if !patient.health_info.is_empty() {
        let _ = writeln!(out, "  Health info:   {}", patient.health_info);
    }

    let _ = writeln!(out, "\nAppointments: {}", overview.appointments.len());
    let _ = writeln!(out, "Upcoming:     {}", overview.upcoming.len());
    let _ = writeln!(out, "Completed:    {}", overview.completed_count);
    let _ = writeln!(out, "Total spent:  {}", format_money(overview.total_spent));

    let _ = writeln!(out, "\nNext visits:");
    if overview.next_visits().is_empty() {
        let _ = writeln!(out, "  none scheduled");
    }
    for incident in overview.next_visits() {
        let _ = writeln!(out, "  {}  {}", appointment_time(incident), incident.title);
    }
    out
}

pub fn render_appointments(upcoming: &[&Incident], past: &[&Incident]) -> String {
    let mut out = String::from("Upcoming:\n");
    if upcoming.is_empty() {
        out.push_str("  none\n");
    }
    for incident in upcoming {
        let _ = write!(out, "  {}", format_incident_detail(incident));
    }
    out.push_str("\nPast:\n");
    if past.is_empty() {
        out.push_str("  none\n");
    }
    for incident in past {
        let _ = write!(out, "  {}", format_incident_detail(incident));
    }
    out
}

/// Month grid, Sunday first. Days with appointments carry a `*`, today a `<`.
pub fn render_calendar(month: &CalendarMonth, incidents: &[Incident], patients: &[Patient], today: NaiveDate) -> String {
    let buckets = month.buckets(incidents);
    let mut out = format!("{}\n{}\n", month, WEEKDAY_HEADER);

    for week in month.cells().chunks(7) {
        let row: String = week
            .iter()
            .map(|cell| match cell {
                None => "    ".to_string(),
                Some(day) => {
                    let busy = buckets.get(day).is_some_and(|b| !b.is_empty());
                    format!(
                        "{:>2}{}{}",
                        day,
                        if busy { '*' } else { ' ' },
                        if month.is_today(*day, today) { '<' } else { ' ' }
                    )
                }
            })
            .collect();
        let _ = writeln!(out, "{}", row.trim_end());
    }

    for (day, day_incidents) in buckets.iter().filter(|(_, b)| !b.is_empty()) {
        let _ = writeln!(out, "\n{} {}:", month.name(), day);
        for incident in day_incidents {
            let _ = writeln!(
                out,
                "  {}  {} - {}  [{}]",
                incident.appointment_date.format("%H:%M"),
                patient_name(incident, patients),
                incident.title,
                incident.status
            );
        }
    }
    out
}
