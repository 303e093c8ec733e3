use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TeamCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gg team`.
pub async fn handle(action: &TeamCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        TeamCommands::Add { name, description } => {
            let team = svc.create_team(name, description.as_deref()).await?;
            output(&team, flags.format)
        }
        TeamCommands::Get { id } => output(&svc.get_team(id).await?, flags.format),
        TeamCommands::Deactivate { id } => output(&svc.set_team_active(id, false).await?, flags.format),
        TeamCommands::Activate { id } => output(&svc.set_team_active(id, true).await?, flags.format),
        TeamCommands::AddMember { team_id, user_id } => {
            svc.add_team_member(team_id, user_id).await?;
            output(&json!({ "team_id": team_id, "user_id": user_id }), flags.format)
        }
        TeamCommands::RemoveMember { team_id, user_id } => {
            svc.remove_team_member(team_id, user_id).await?;
            output(
                &json!({ "team_id": team_id, "user_id": user_id, "removed": true }),
                flags.format,
            )
        }
        TeamCommands::Members { team_id } => output(&svc.team_members(team_id).await?, flags.format),
    }
}
