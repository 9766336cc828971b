use crate::cli::{Commands, GlobalFlags};
use crate::context::AppContext;

/// Route a parsed command to its handler.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Migrate => super::migrate::handle(ctx, flags).await,
        Commands::User { action } => super::user::handle(&action, ctx, flags).await,
        Commands::Serve => super::serve::handle(ctx).await,
        Commands::Replay(args) => super::replay::handle(&args, ctx).await,
    }
}
