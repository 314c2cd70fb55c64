mod delete;
mod get;
mod list;
mod upload;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ContractCommands;
use crate::context::AppContext;

/// Handle `legally contract <subcommand>`.
pub async fn handle(
    action: &ContractCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    ctx.require_session().await?;
    match action {
        ContractCommands::Upload(args) => upload::handle(args, ctx, flags).await,
        ContractCommands::List(args) => list::handle(args, ctx, flags).await,
        ContractCommands::Get(args) => get::handle(args, ctx, flags).await,
        ContractCommands::Delete(args) => delete::handle(args, ctx, flags).await,
    }
}
