use clap::Subcommand;

/// Assignment commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AssignmentCommands {
    /// Get an assignment by ID.
    Get { id: String },
    /// Get the assignment for a request, if any.
    ForRequest { request_id: String },
    /// List a technician's assignments.
    Mine {
        #[arg(long)]
        technician: String,
        #[arg(long)]
        status: Option<String>,
    },
    /// Mark assigned work finished.
    Complete {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
}
