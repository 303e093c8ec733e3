use clap::Subcommand;

/// Maintenance request commands.
#[derive(Clone, Debug, Subcommand)]
pub enum RequestCommands {
    /// Create a request in NEW.
    Create {
        #[arg(long)]
        equipment: String,
        /// corrective or preventive
        #[arg(long, default_value = "corrective")]
        kind: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        priority: Option<String>,
        /// RFC 3339 timestamp; required for preventive requests.
        #[arg(long)]
        scheduled_at: Option<String>,
        #[arg(long)]
        sla_hours: Option<f64>,
        /// Creating user.
        #[arg(long)]
        by: String,
    },
    /// Edit an open request's title, description, priority, schedule, or SLA.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// RFC 3339 timestamp.
        #[arg(long, conflicts_with = "clear_schedule")]
        scheduled_at: Option<String>,
        /// Drop the schedule (corrective requests only).
        #[arg(long)]
        clear_schedule: bool,
        #[arg(long)]
        sla_hours: Option<f64>,
        /// Editing user.
        #[arg(long)]
        by: String,
    },
    /// Get a request with its assignment and SLA.
    Get { id: String },
    /// List requests, newest first.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        equipment: Option<String>,
    },
    /// Move a request to another status.
    Transition {
        id: String,
        status: String,
        /// Acting user, recorded in the audit log.
        #[arg(long)]
        by: Option<String>,
    },
    /// Show a request's SLA position now.
    Sla { id: String },
}
