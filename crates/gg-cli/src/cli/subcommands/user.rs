use clap::Subcommand;

/// User account commands.
#[derive(Clone, Debug, Subcommand)]
pub enum UserCommands {
    /// Create an active user.
    Add {
        name: String,
        #[arg(long)]
        email: Option<String>,
        /// admin, manager, technician, or user
        #[arg(long, default_value = "technician")]
        role: String,
    },
    /// Get a user by ID.
    Get { id: String },
    /// Deactivate a user.
    Deactivate { id: String },
    /// Reactivate a user.
    Activate { id: String },
}
