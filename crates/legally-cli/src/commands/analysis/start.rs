use crate::cli::GlobalFlags;
use crate::cli::subcommands::AnalysisStartArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(
    args: &AnalysisStartArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if ctx.session.is_free_user() && !ctx.session.has_analyses_remaining() {
        ctx.notifications.warning(
            "No analyses remaining",
            Some("the server will likely refuse this request".into()),
        );
    }

    let language = args
        .language
        .clone()
        .unwrap_or_else(|| ctx.config.general.output_language.clone());
    let mut session = ctx.analysis();
    let result = session.start(&args.contract_id, &language).await;
    let analysis = match result {
        Ok(analysis) => analysis,
        Err(error) => {
            ctx.notifications
                .error("Failed to start analysis", Some(error.to_string()));
            return Err(error.into());
        }
    };
    ctx.notifications
        .info("Analysis started", Some(analysis.id.clone()));

    if args.watch {
        return super::watch::follow(&mut session, &analysis.id, ctx, flags).await;
    }
    output(&analysis, flags.format)
}
