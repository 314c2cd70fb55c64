use crate::cli::GlobalFlags;
use crate::cli::subcommands::ContractIdArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(
    args: &ContractIdArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let contract = ctx.contracts().fetch_contract(&args.id).await?;
    output(&contract, flags.format)
}
