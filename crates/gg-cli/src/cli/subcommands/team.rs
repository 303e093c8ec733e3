use clap::Subcommand;

/// Team commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TeamCommands {
    /// Create a team.
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Get a team by ID.
    Get { id: String },
    /// Deactivate a team.
    Deactivate { id: String },
    /// Reactivate a team.
    Activate { id: String },
    /// Add a technician to a team.
    AddMember { team_id: String, user_id: String },
    /// Take a technician off a team.
    RemoveMember { team_id: String, user_id: String },
    /// List a team's members.
    Members { team_id: String },
}
