// server/src/cli/handlers.rs

// One handler per subcommand. Handlers return the text to print; the
// session, store and role table travel in a `CliContext`.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lib::config::ClinicConfig;
use lib::controller::{AttachOutcome, AttachmentDraft, ClinicController};
use lib::derivation::{
    admin_dashboard, patient_history, patient_overview, patient_past, patient_upcoming, CalendarMonth,
};
use lib::storage_engine::{create_storage, initialize, RecordStore, SeedData, SeedReport, StorageEngine};
use models::util::{parse_date, parse_date_time};
use models::{Identifier, Incident, NewIncident, NewPatient, Patient};
use security::{AuthError, AuthService, Landing, Permission, RolesConfig, Session};

use crate::cli::commands::{
    ClinicCommands, FilesAction, IncidentAction, IncidentFields, PatientAction, PatientFields,
};
use crate::cli::display::{
    format_incident, format_patient, format_user, render_admin_dashboard, render_appointments, render_calendar,
    render_overview,
};

/// Everything a command needs, opened once per invocation.
pub struct CliContext {
    pub config: ClinicConfig,
    pub roles: RolesConfig,
    pub store: RecordStore,
    pub controller: ClinicController,
    pub auth: AuthService,
}

impl CliContext {
    pub fn open(config: ClinicConfig, roles: RolesConfig) -> Result<Self> {
        let engine = create_storage(&config.storage)?;
        Ok(Self::with_engine(config, roles, engine))
    }

    pub fn with_engine(config: ClinicConfig, roles: RolesConfig, engine: Arc<dyn StorageEngine>) -> Self {
        let store = RecordStore::new(engine);
        let controller = ClinicController::new(store.clone()).with_attachment_config(&config.attachments);
        let auth = AuthService::new(store.clone());
        CliContext { config, roles, store, controller, auth }
    }

    /// Fills absent collections from the configured seed. A no-op when seeding is off.
    pub async fn seed(&self) -> Result<SeedReport> {
        if !self.config.seed.enabled {
            return Ok(SeedReport::default());
        }
        let seed = SeedData::from_config(&self.config.seed)?;
        Ok(initialize(&self.store, &seed).await?)
    }

    async fn session(&self) -> Result<Session> {
        Ok(self.auth.require_session().await?)
    }

    async fn own_patient(&self, session: &Session) -> Result<Patient> {
        let id = session
            .patient_id()
            .ok_or_else(|| anyhow!("Account {} is not linked to a patient record", session.email()))?;
        Ok(self.controller.find_patient(id).await?)
    }

    /// Incidents the session may read: all of them, or only the patient's own.
    async fn visible_incidents(&self, session: &Session) -> Result<Vec<Incident>> {
        let incidents = self.controller.incidents().await?;
        if session.can(Permission::ViewAllRecords, &self.roles) {
            return Ok(incidents);
        }
        session.authorize(Permission::ViewOwnRecords, &self.roles)?;
        let Some(own) = session.patient_id() else {
            return Ok(Vec::new());
        };
        Ok(incidents.into_iter().filter(|i| i.belongs_to(own)).collect())
    }

    async fn visible_incident(&self, session: &Session, id: &Identifier) -> Result<Incident> {
        self.visible_incidents(session)
            .await?
            .into_iter()
            .find(|i| &i.id == id)
            .ok_or_else(|| anyhow!("No incident {} visible to {}", id, session.email()))
    }
}

pub async fn run_command(ctx: &CliContext, command: ClinicCommands, now: NaiveDateTime) -> Result<String> {
    let report = ctx.seed().await?;

    let output = match command {
        ClinicCommands::Init => describe_seed(&report),
        ClinicCommands::Login { email, password } => handle_login(ctx, &email, &password).await?,
        ClinicCommands::Logout => {
            ctx.auth.logout().await?;
            "Logged out\n".to_string()
        }
        ClinicCommands::Whoami => match ctx.auth.restore_session().await? {
            Some(session) => format!("{}\n", format_user(session.user())),
            None => "Not logged in\n".to_string(),
        },
        ClinicCommands::Dashboard => handle_dashboard(ctx, now).await?,
        ClinicCommands::Patients(wrapper) => handle_patients(ctx, wrapper.command).await?,
        ClinicCommands::Incidents(wrapper) => handle_incidents(ctx, wrapper.command).await?,
        ClinicCommands::Calendar { year, month } => handle_calendar(ctx, year, month, now).await?,
        ClinicCommands::Overview => handle_overview(ctx, now).await?,
        ClinicCommands::Appointments => handle_appointments(ctx, now).await?,
        ClinicCommands::Files(wrapper) => handle_files(ctx, wrapper.command).await?,
    };

    ctx.store.engine().flush().await?;
    Ok(output)
}

fn describe_seed(report: &SeedReport) -> String {
    let names = |list: &[lib::storage_engine::Collection]| {
        list.iter().map(|c| c.key()).collect::<Vec<_>>().join(", ")
    };
    let mut out = String::new();
    if report.seeded.is_empty() && report.already_present.is_empty() && report.corrupt.is_empty() {
        out.push_str("Seeding is disabled\n");
    }
    if !report.seeded.is_empty() {
        let _ = writeln!(out, "Seeded: {}", names(&report.seeded));
    }
    if !report.already_present.is_empty() {
        let _ = writeln!(out, "Already present: {}", names(&report.already_present));
    }
    if !report.corrupt.is_empty() {
        let _ = writeln!(out, "Unreadable, left untouched: {}", names(&report.corrupt));
    }
    out
}

async fn handle_login(ctx: &CliContext, email: &str, password: &str) -> Result<String> {
    let session = ctx.auth.login(email, password).await?;
    let landing = match session.landing() {
        Landing::AdminDashboard => "admin dashboard",
        Landing::PatientDashboard => "patient dashboard",
    };
    Ok(format!(
        "Logged in as {}\nRun `dental-cli dashboard` for the {}\n",
        format_user(session.user()),
        landing
    ))
}

async fn handle_dashboard(ctx: &CliContext, now: NaiveDateTime) -> Result<String> {
    let session = ctx.session().await?;
    match session.landing() {
        Landing::AdminDashboard => {
            session.authorize(Permission::ViewAllRecords, &ctx.roles)?;
            let patients = ctx.controller.patients().await?;
            let incidents = ctx.controller.incidents().await?;
            let dashboard = admin_dashboard(&patients, &incidents, now, &ctx.config.dashboard);
            Ok(render_admin_dashboard(&dashboard, &patients))
        }
        Landing::PatientDashboard => handle_overview(ctx, now).await,
    }
}

fn patient_form(mut form: NewPatient, fields: PatientFields) -> Result<NewPatient> {
    if let Some(name) = fields.name {
        form.name = name;
    }
    if let Some(dob) = fields.dob {
        form.dob = Some(parse_date(&dob)?);
    }
    if let Some(contact) = fields.contact {
        form.contact = contact;
    }
    if let Some(email) = fields.email {
        form.email = email;
    }
    if let Some(address) = fields.address {
        form.address = address;
    }
    if let Some(health_info) = fields.health_info {
        form.health_info = health_info;
    }
    Ok(form)
}

async fn handle_patients(ctx: &CliContext, action: PatientAction) -> Result<String> {
    let session = ctx.session().await?;
    match action {
        PatientAction::List => {
            session.authorize(Permission::ViewAllRecords, &ctx.roles)?;
            let patients = ctx.controller.patients().await?;
            if patients.is_empty() {
                return Ok("No patients\n".to_string());
            }
            Ok(patients.iter().map(|p| format_patient(p) + "\n").collect())
        }
        PatientAction::Add(fields) => {
            session.authorize(Permission::ManagePatients, &ctx.roles)?;
            let form = patient_form(NewPatient::default(), fields)?;
            let patients = ctx.controller.save_patient(form, None).await?;
            let created = patients.last().ok_or_else(|| anyhow!("Patient list empty after create"))?;
            Ok(format!("Created patient {}\n", format_patient(created)))
        }
        PatientAction::Update { id, fields } => {
            session.authorize(Permission::ManagePatients, &ctx.roles)?;
            let id: Identifier = id.parse()?;
            let existing = ctx.controller.find_patient(&id).await?;
            let form = patient_form(NewPatient::from(&existing), fields)?;
            ctx.controller.save_patient(form, Some(&id)).await?;
            Ok(format!("Updated patient {}\n", id))
        }
        PatientAction::Delete { id } => {
            session.authorize(Permission::ManagePatients, &ctx.roles)?;
            let id: Identifier = id.parse()?;
            let removal = ctx.controller.delete_patient(&id).await?;
            Ok(format!(
                "Deleted patient {} and {} incident(s)\n",
                id, removal.removed_incidents
            ))
        }
    }
}

fn incident_form(mut form: NewIncident, fields: &IncidentFields) -> Result<NewIncident> {
    if let Some(patient_id) = &fields.patient_id {
        form.patient_id = patient_id.clone();
    }
    if let Some(title) = &fields.title {
        form.title = title.clone();
    }
    if let Some(description) = &fields.description {
        form.description = description.clone();
    }
    if let Some(comments) = &fields.comments {
        form.comments = comments.clone();
    }
    if let Some(date) = &fields.appointment_date {
        form.appointment_date = Some(parse_date_time(date)?);
    }
    if let Some(cost) = fields.cost {
        form.cost = cost;
    }
    if let Some(status) = &fields.status {
        form.status = status.parse()?;
    }
    if let Some(treatment) = &fields.treatment {
        form.treatment = treatment.clone();
    }
    if let Some(next) = &fields.next_date {
        form.next_date = if next.trim().is_empty() { None } else { Some(parse_date_time(next)?) };
    }
    Ok(form)
}

/// Reads every path into the draft. Oversized or unreadable files become
/// warning lines; the rest are still attached.
async fn attach_files(draft: &mut AttachmentDraft, paths: &[PathBuf], out: &mut String) {
    for (path, outcome) in paths.iter().zip(draft.attach_paths(paths).await) {
        match outcome {
            Ok(AttachOutcome::Attached { .. }) => {
                let _ = writeln!(out, "Attached {}", path.display());
            }
            Ok(AttachOutcome::Rejected { warning, .. }) => {
                let _ = writeln!(out, "Warning: {}", warning);
            }
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                let _ = writeln!(out, "Warning: could not read {}: {}", path.display(), e);
            }
        }
    }
}

async fn handle_incidents(ctx: &CliContext, action: IncidentAction) -> Result<String> {
    let session = ctx.session().await?;
    match action {
        IncidentAction::List { patient } => {
            session.authorize(Permission::ViewAllRecords, &ctx.roles)?;
            let patients = ctx.controller.patients().await?;
            let incidents = ctx.controller.incidents().await?;
            let listed: Vec<&Incident> = match patient {
                Some(id) => patient_history(&incidents, &id.parse::<Identifier>()?),
                None => incidents.iter().collect(),
            };
            if listed.is_empty() {
                return Ok("No incidents\n".to_string());
            }
            Ok(listed.iter().map(|i| format_incident(i, &patients) + "\n").collect())
        }
        IncidentAction::Add(fields) => {
            session.authorize(Permission::ManageIncidents, &ctx.roles)?;
            let mut out = String::new();
            let mut form = incident_form(NewIncident::default(), &fields)?;
            let mut draft = ctx.controller.new_attachment_draft();
            attach_files(&mut draft, &fields.attach, &mut out).await;
            form.files = draft.into_files();

            let incidents = ctx.controller.save_incident(form, None).await?;
            let patients = ctx.controller.patients().await?;
            let created = incidents.last().ok_or_else(|| anyhow!("Incident list empty after create"))?;
            let _ = writeln!(out, "Created incident {}", format_incident(created, &patients));
            Ok(out)
        }
        IncidentAction::Update { id, fields, mut remove_files } => {
            session.authorize(Permission::ManageIncidents, &ctx.roles)?;
            let id: Identifier = id.parse()?;
            let mut out = String::new();
            let existing = ctx.controller.find_incident(&id).await?;
            let mut form = incident_form(NewIncident::from(&existing), &fields)?;

            let mut draft = ctx.controller.attachment_draft_for(&id).await?;
            // Highest index first so earlier positions stay valid.
            remove_files.sort_unstable_by(|a, b| b.cmp(a));
            remove_files.dedup();
            for index in remove_files {
                match draft.remove(index) {
                    Some(file) => {
                        let _ = writeln!(out, "Removed {}", file.name);
                    }
                    None => {
                        let _ = writeln!(out, "Warning: no attachment #{}", index);
                    }
                }
            }
            attach_files(&mut draft, &fields.attach, &mut out).await;
            form.files = draft.into_files();

            let incidents = ctx.controller.save_incident(form, Some(&id)).await?;
            if let Some(updated) = incidents.iter().find(|i| i.id == id) {
                let _ = writeln!(out, "Updated incident {} [{} -> {}]", id, existing.status, updated.status);
            }
            Ok(out)
        }
        IncidentAction::Delete { id } => {
            session.authorize(Permission::ManageIncidents, &ctx.roles)?;
            let id: Identifier = id.parse()?;
            ctx.controller.delete_incident(&id).await?;
            Ok(format!("Deleted incident {}\n", id))
        }
    }
}

async fn handle_calendar(
    ctx: &CliContext,
    year: Option<i32>,
    month: Option<u32>,
    now: NaiveDateTime,
) -> Result<String> {
    let session = ctx.session().await?;
    session.authorize(Permission::ViewCalendar, &ctx.roles)?;
    let today = now.date();
    let current = CalendarMonth::containing(today);
    let shown = CalendarMonth::new(year.unwrap_or(current.year()), month.unwrap_or(current.month()))?;

    let incidents = ctx.visible_incidents(&session).await?;
    let patients = ctx.controller.patients().await?;
    let mut out = render_calendar(&shown, &incidents, &patients, today);
    let (prev, next) = (shown.previous(), shown.next());
    let _ = writeln!(
        out,
        "\n< {} (--year {} --month {})   {} (--year {} --month {}) >",
        prev,
        prev.year(),
        prev.month(),
        next,
        next.year(),
        next.month()
    );
    Ok(out)
}

async fn handle_overview(ctx: &CliContext, now: NaiveDateTime) -> Result<String> {
    let session = ctx.session().await?;
    session.authorize(Permission::ViewOwnRecords, &ctx.roles)?;
    let patient = ctx.own_patient(&session).await?;
    let incidents = ctx.visible_incidents(&session).await?;
    Ok(render_overview(&patient_overview(&patient, &incidents, now)))
}

async fn handle_appointments(ctx: &CliContext, now: NaiveDateTime) -> Result<String> {
    let session = ctx.session().await?;
    if session.can(Permission::ViewAllRecords, &ctx.roles) {
        let patients = ctx.controller.patients().await?;
        let mut incidents = ctx.controller.incidents().await?;
        incidents.sort_by(|a, b| a.appointment_date.cmp(&b.appointment_date));
        if incidents.is_empty() {
            return Ok("No appointments\n".to_string());
        }
        return Ok(incidents.iter().map(|i| format_incident(i, &patients) + "\n").collect());
    }

    session.authorize(Permission::ViewOwnRecords, &ctx.roles)?;
    let patient = ctx.own_patient(&session).await?;
    let incidents = ctx.visible_incidents(&session).await?;
    let history = patient_history(&incidents, &patient.id);
    let upcoming = patient_upcoming(history.iter().copied(), now);
    let past = patient_past(history.iter().copied(), now);
    Ok(render_appointments(&upcoming, &past))
}

/// Where an exported attachment lands when no `--output` is given.
/// Only the file name part of the stored name is used.
fn export_path(name: &str, output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| {
        Path::new(name)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("attachment"))
    })
}

async fn handle_files(ctx: &CliContext, action: FilesAction) -> Result<String> {
    let session = ctx.session().await?;
    match action {
        FilesAction::List { incident_id } => {
            let incident = ctx.visible_incident(&session, &incident_id.parse::<Identifier>()?).await?;
            if incident.files.is_empty() {
                return Ok(format!("Incident {} has no attachments\n", incident.id));
            }
            let mut out = String::new();
            for (index, file) in incident.files.iter().enumerate() {
                let _ = writeln!(out, "#{}  {}  {}  {} bytes", index, file.name, file.mime_type, file.size);
            }
            Ok(out)
        }
        FilesAction::Export { incident_id, index, output } => {
            let id: Identifier = incident_id.parse()?;
            ctx.visible_incident(&session, &id).await?;
            let (attachment, bytes) = ctx.controller.attachment_contents(&id, index).await?;
            let path = export_path(&attachment.name, output);
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Exported attachment #{} of {} to {}", index, id, path.display());
            Ok(format!("Wrote {} bytes to {}\n", bytes.len(), path.display()))
        }
    }
}

/// The message the CLI prints for a failed command.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AuthError>() {
        Some(AuthError::NotLoggedIn) => "Not logged in. Run `dental-cli login --email <EMAIL> --password <PASSWORD>` first.".to_string(),
        Some(AuthError::PermissionDenied { .. }) => format!("Access denied: {}", err),
        _ => format!("Error: {:#}", err),
    }
}
