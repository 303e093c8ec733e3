use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    AssignmentCommands, EquipmentCommands, RequestCommands, TeamCommands, UserCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the project directory and a default config file.
    Init(InitArgs),
    /// User accounts.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Maintenance teams and their technicians.
    Team {
        #[command(subcommand)]
        action: TeamCommands,
    },
    /// Equipment and its owning team.
    Equipment {
        #[command(subcommand)]
        action: EquipmentCommands,
    },
    /// Maintenance requests.
    Request {
        #[command(subcommand)]
        action: RequestCommands,
    },
    /// Assign a technician to a NEW request.
    Assign(AssignArgs),
    /// Assignments.
    Assignment {
        #[command(subcommand)]
        action: AssignmentCommands,
    },
    /// Query the audit log.
    Audit(AuditArgs),
    /// Print the JSON schema of an output type.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Debug, Args)]
pub struct AssignArgs {
    pub request_id: String,
    /// Technician receiving the work.
    #[arg(long)]
    pub to: String,
    /// Manager making the assignment.
    #[arg(long)]
    pub by: String,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub request: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// One of: request, request-view, new-request, request-update, assignment,
    /// receipt, audit-entry, user, team, equipment.
    pub type_name: String,
}
