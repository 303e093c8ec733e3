use gg_core::enums::UserRole;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::UserCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gg user`.
pub async fn handle(action: &UserCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        UserCommands::Add { name, email, role } => {
            let role: UserRole = parse_enum(role, "role")?;
            let user = svc.create_user(name, email.as_deref(), role).await?;
            output(&user, flags.format)
        }
        UserCommands::Get { id } => output(&svc.get_user(id).await?, flags.format),
        UserCommands::Deactivate { id } => output(&svc.set_user_active(id, false).await?, flags.format),
        UserCommands::Activate { id } => output(&svc.set_user_active(id, true).await?, flags.format),
    }
}
