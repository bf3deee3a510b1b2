// server/src/cli/mod.rs

// Declares the CLI modules and re-exports what main.rs and tests reach for.

pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod handlers;

pub use cli::start_cli;
pub use commands::{
    CliArgs, ClinicCommands, FilesAction, IncidentAction, IncidentFields, PatientAction, PatientFields,
};
pub use config::{load_cli_config, load_roles_config};
pub use handlers::{describe_error, run_command, CliContext};
