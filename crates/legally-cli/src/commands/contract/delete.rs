use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ContractIdArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct DeleteResponse<'a> {
    id: &'a str,
    deleted: bool,
}

pub async fn handle(
    args: &ContractIdArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    ctx.contracts().delete_contract(&args.id).await?;
    ctx.notifications.success("Contract deleted", None);
    output(
        &DeleteResponse {
            id: &args.id,
            deleted: true,
        },
        flags.format,
    )
}
