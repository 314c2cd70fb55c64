use legally_core::entities::Contract;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ContractListArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct ListResponse<'a> {
    contracts: &'a [Contract],
    total: u64,
    page: u32,
    total_pages: u64,
}

pub async fn handle(
    args: &ContractListArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut library = ctx.contracts();
    library.fetch_contracts(args.page).await;
    if let Some(error) = library.error() {
        anyhow::bail!("{error}");
    }

    output(
        &ListResponse {
            contracts: library.contracts(),
            total: library.total(),
            page: library.page(),
            total_pages: library.total_pages(),
        },
        flags.format,
    )
}
