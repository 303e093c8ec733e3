use gg_core::entities::{
    Assignment, AssignmentReceipt, AuditEntry, Equipment, MaintenanceRequest, NewRequest,
    RequestUpdate, RequestView, Team, User,
};
use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Handle `gg schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name.as_str() {
        "request" => schema_for!(MaintenanceRequest),
        "request-view" => schema_for!(RequestView),
        "new-request" => schema_for!(NewRequest),
        "request-update" => schema_for!(RequestUpdate),
        "assignment" => schema_for!(Assignment),
        "receipt" => schema_for!(AssignmentReceipt),
        "audit-entry" => schema_for!(AuditEntry),
        "user" => schema_for!(User),
        "team" => schema_for!(Team),
        "equipment" => schema_for!(Equipment),
        other => anyhow::bail!("unknown schema type '{other}'"),
    };
    output(&schema, flags.format)
}
