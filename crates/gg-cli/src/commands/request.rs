use chrono::Utc;
use serde_json::json;

use gg_core::entities::{NewRequest, RequestUpdate};
use gg_core::enums::{RequestKind, RequestStatus};
use gg_db::repos::request::RequestFilter;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RequestCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_enum, parse_optional_enum, parse_timestamp};
use crate::context::AppContext;
use crate::output::output;

/// Handle `gg request`.
pub async fn handle(
    action: &RequestCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        RequestCommands::Create {
            equipment,
            kind,
            title,
            description,
            priority,
            scheduled_at,
            sla_hours,
            by,
        } => {
            let kind: RequestKind = parse_enum(kind, "kind")?;
            let input = NewRequest {
                equipment_id: equipment.clone(),
                kind,
                title: title.clone(),
                description: description.clone(),
                priority: parse_optional_enum(priority.as_deref(), "priority")?,
                scheduled_at: scheduled_at
                    .as_deref()
                    .map(|raw| parse_timestamp(raw, "scheduled_at"))
                    .transpose()?,
                sla_hours: *sla_hours,
                created_by: by.clone(),
            };
            output(&svc.create_request(input).await?, flags.format)
        }
        RequestCommands::Update {
            id,
            title,
            description,
            priority,
            scheduled_at,
            clear_schedule,
            sla_hours,
            by,
        } => {
            let update = RequestUpdate {
                title: title.clone(),
                description: description.clone(),
                priority: parse_optional_enum(priority.as_deref(), "priority")?,
                scheduled_at: scheduled_at
                    .as_deref()
                    .map(|raw| parse_timestamp(raw, "scheduled_at"))
                    .transpose()?,
                clear_schedule: *clear_schedule,
                sla_hours: *sla_hours,
            };
            output(&svc.update_request(id, &update, by).await?, flags.format)
        }
        RequestCommands::Get { id } => output(&svc.get_request(id).await?, flags.format),
        RequestCommands::List {
            status,
            kind,
            priority,
            team,
            equipment,
        } => {
            let filter = RequestFilter {
                status: parse_optional_enum(status.as_deref(), "status")?,
                kind: parse_optional_enum(kind.as_deref(), "kind")?,
                priority: parse_optional_enum(priority.as_deref(), "priority")?,
                team_id: team.clone(),
                equipment_id: equipment.clone(),
                limit: Some(effective_limit(flags.limit, ctx.config.general.default_limit)),
            };
            output(&svc.list_requests(&filter).await?, flags.format)
        }
        RequestCommands::Transition { id, status, by } => {
            let status: RequestStatus = parse_enum(status, "status")?;
            let request = svc.transition_status_by(id, status, by.as_deref()).await?;
            output(&request, flags.format)
        }
        RequestCommands::Sla { id } => {
            let view = svc.get_request(id).await?;
            output(
                &json!({
                    "id": view.request.id,
                    "status": view.request.status,
                    "evaluated_at": Utc::now(),
                    "sla": view.sla,
                    "is_overdue": view.is_overdue,
                }),
                flags.format,
            )
        }
    }
}
