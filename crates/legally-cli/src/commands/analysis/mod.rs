mod feedback;
mod get;
mod start;
mod watch;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AnalysisCommands;
use crate::context::AppContext;

/// Handle `legally analysis <subcommand>`.
pub async fn handle(
    action: &AnalysisCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    ctx.require_session().await?;
    match action {
        AnalysisCommands::Start(args) => start::handle(args, ctx, flags).await,
        AnalysisCommands::Get(args) => get::handle(args, ctx, flags).await,
        AnalysisCommands::Watch(args) => watch::handle(args, ctx, flags).await,
        AnalysisCommands::Feedback(args) => feedback::handle(args, ctx, flags).await,
    }
}
