use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct MigrateResponse<'a> {
    database: &'a str,
    migrated: bool,
}

/// Handle `omap migrate`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.service.db().run_migrations().await?;
    output(
        &MigrateResponse {
            database: &ctx.config.database.path,
            migrated: true,
        },
        flags.format,
    )
}
