// server/src/cli/commands.rs

// Command-line arguments and subcommands for dental-cli, defined with `clap`.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dental-cli")]
#[command(version = "0.1.0")]
#[command(about = "Patient and appointment records for a small dental clinic")]
pub struct CliArgs {
    /// TOML config file (defaults to dental.toml in the user config directory)
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Directory holding the record store
    #[arg(long, global = true, env = "DENTAL_DATA_PATH", value_hint = clap::ValueHint::DirPath)]
    pub data_path: Option<PathBuf>,
    /// YAML file overriding role permissions
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub roles: Option<PathBuf>,
    #[command(subcommand)]
    pub command: ClinicCommands,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum ClinicCommands {
    /// Seed the store with the default users and patient where absent
    Init,
    /// Sign in; the session persists until logout
    Login {
        #[arg(long, short = 'e')]
        email: String,
        #[arg(long, short = 'p', env = "DENTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show who is signed in
    Whoami,
    /// KPIs for admins, the overview for patients
    Dashboard,
    /// Manage patient records
    Patients(PatientsCommandWrapper),
    /// Manage incidents (appointments)
    Incidents(IncidentsCommandWrapper),
    /// Month grid with the appointments of each day
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Your profile, totals and next visits
    Overview,
    /// Upcoming and past appointments
    Appointments,
    /// Work with incident attachments
    Files(FilesCommandWrapper),
}

#[derive(Debug, Args, PartialEq)]
pub struct PatientsCommandWrapper {
    #[command(subcommand)]
    pub command: PatientAction,
}

#[derive(Debug, Args, PartialEq)]
pub struct IncidentsCommandWrapper {
    #[command(subcommand)]
    pub command: IncidentAction,
}

#[derive(Debug, Args, PartialEq)]
pub struct FilesCommandWrapper {
    #[command(subcommand)]
    pub command: FilesAction,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum PatientAction {
    List,
    Add(PatientFields),
    /// Fields left out keep their current value
    Update {
        id: String,
        #[command(flatten)]
        fields: PatientFields,
    },
    /// Also deletes every incident of the patient
    Delete { id: String },
}

#[derive(Debug, Args, PartialEq, Default)]
pub struct PatientFields {
    #[arg(long)]
    pub name: Option<String>,
    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    pub dob: Option<String>,
    #[arg(long)]
    pub contact: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub health_info: Option<String>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum IncidentAction {
    List {
        /// Only incidents of this patient
        #[arg(long)]
        patient: Option<String>,
    },
    Add(IncidentFields),
    /// Fields left out keep their current value
    Update {
        id: String,
        #[command(flatten)]
        fields: IncidentFields,
        /// Drop the attachment at this position (repeatable)
        #[arg(long = "remove-file")]
        remove_files: Vec<usize>,
    },
    Delete { id: String },
}

#[derive(Debug, Args, PartialEq, Default)]
pub struct IncidentFields {
    #[arg(long)]
    pub patient_id: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub comments: Option<String>,
    /// Local date and time, YYYY-MM-DDTHH:MM
    #[arg(long)]
    pub appointment_date: Option<String>,
    #[arg(long)]
    pub cost: Option<f64>,
    /// Scheduled, "In Progress", Completed or Cancelled
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub treatment: Option<String>,
    #[arg(long)]
    pub next_date: Option<String>,
    /// File to attach (repeatable)
    #[arg(long = "attach", value_hint = clap::ValueHint::FilePath)]
    pub attach: Vec<PathBuf>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum FilesAction {
    /// List the attachments of an incident
    List { incident_id: String },
    /// Write an attachment back to disk
    Export {
        incident_id: String,
        /// Position of the attachment, starting at 0
        #[arg(default_value_t = 0)]
        index: usize,
        /// Output path (defaults to the attachment's name in the current directory)
        #[arg(long, short = 'o', value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parses_incident_add_with_attachments() {
        let args = CliArgs::try_parse_from([
            "dental-cli",
            "--data-path",
            "/tmp/clinic",
            "incidents",
            "add",
            "--patient-id",
            "p1",
            "--title",
            "Filling",
            "--appointment-date",
            "2031-02-03T09:30",
            "--cost",
            "120",
            "--attach",
            "xray.png",
            "--attach",
            "notes.pdf",
        ])
        .unwrap();
        assert_eq!(args.data_path, Some(PathBuf::from("/tmp/clinic")));
        let ClinicCommands::Incidents(IncidentsCommandWrapper { command: IncidentAction::Add(fields) }) = args.command
        else {
            panic!("expected incidents add");
        };
        assert_eq!(fields.patient_id.as_deref(), Some("p1"));
        assert_eq!(fields.cost, Some(120.0));
        assert_eq!(fields.attach.len(), 2);
    }

    #[test]
    fn files_export_defaults_to_first_attachment() {
        let args = CliArgs::try_parse_from(["dental-cli", "files", "export", "i1"]).unwrap();
        assert_eq!(
            args.command,
            ClinicCommands::Files(FilesCommandWrapper {
                command: FilesAction::Export { incident_id: "i1".to_string(), index: 0, output: None }
            })
        );
    }
}
