use crate::cli::GlobalFlags;
use crate::cli::root_commands::AssignArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gg assign`.
pub async fn handle(args: &AssignArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let receipt = ctx
        .service
        .assign_technician(&args.request_id, &args.to, &args.by)
        .await?;
    output(&receipt, flags.format)
}
