use gg_core::enums::RequestStatus;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AssignmentCommands;
use crate::commands::shared::parse::parse_optional_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gg assignment`.
pub async fn handle(
    action: &AssignmentCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        AssignmentCommands::Get { id } => output(&svc.get_assignment(id).await?, flags.format),
        AssignmentCommands::ForRequest { request_id } => {
            output(&svc.assignment_for_request(request_id).await?, flags.format)
        }
        AssignmentCommands::Mine { technician, status } => {
            let status: Option<RequestStatus> = parse_optional_enum(status.as_deref(), "status")?;
            let assignments = svc.technician_assignments(technician, status).await?;
            output(&assignments, flags.format)
        }
        AssignmentCommands::Complete { id, notes } => {
            let assignment = svc.complete_assignment(id, notes.as_deref()).await?;
            output(&assignment, flags.format)
        }
    }
}
