use crate::cli::GlobalFlags;
use crate::cli::subcommands::AnalysisIdArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(
    args: &AnalysisIdArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let analysis = ctx.analysis().load(&args.id).await?;
    output(&analysis, flags.format)
}
