use gg_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_optional_enum;
use crate::context::AppContext;
use crate::output::output;

const DEFAULT_AUDIT_LIMIT: u32 = 100;

/// Handle `gg audit`.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = AuditFilter {
        request_id: args.request.clone(),
        user_id: args.user.clone(),
        action: parse_optional_enum(args.action.as_deref(), "action")?,
        limit: Some(effective_limit(flags.limit, DEFAULT_AUDIT_LIMIT)),
    };
    let entries = ctx.service.query_audit(&filter).await?;
    output(&entries, flags.format)
}
