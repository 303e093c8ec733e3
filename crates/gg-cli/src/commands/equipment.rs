use gg_core::enums::EquipmentStatus;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::EquipmentCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gg equipment`.
pub async fn handle(
    action: &EquipmentCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    let equipment = match action {
        EquipmentCommands::Add { name, serial, team } => {
            svc.create_equipment(name, serial.as_deref(), team).await?
        }
        EquipmentCommands::Get { id } => svc.get_equipment(id).await?,
        EquipmentCommands::Reassign { id, team } => svc.reassign_equipment_team(id, team).await?,
        EquipmentCommands::Status { id, status } => {
            let status: EquipmentStatus = parse_enum(status, "status")?;
            svc.set_equipment_status(id, status).await?
        }
        EquipmentCommands::Scrap { id } => svc.scrap_equipment(id).await?,
    };
    output(&equipment, flags.format)
}
