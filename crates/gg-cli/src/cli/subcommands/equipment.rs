use clap::Subcommand;

/// Equipment commands.
#[derive(Clone, Debug, Subcommand)]
pub enum EquipmentCommands {
    /// Register equipment under a team.
    Add {
        name: String,
        #[arg(long)]
        serial: Option<String>,
        #[arg(long)]
        team: String,
    },
    /// Get equipment by ID.
    Get { id: String },
    /// Move equipment to another team.
    Reassign {
        id: String,
        #[arg(long)]
        team: String,
    },
    /// Set the operational status: operational or under-maintenance.
    Status { id: String, status: String },
    /// Mark equipment scrapped.
    Scrap { id: String },
}
