use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AnalysisFeedbackArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct FeedbackResponse<'a> {
    analysis_id: &'a str,
    section: &'a str,
    is_correct: bool,
    submitted: bool,
}

pub async fn handle(
    args: &AnalysisFeedbackArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let is_correct = args.correct && !args.incorrect;
    ctx.analysis()
        .submit_feedback(&args.id, &args.section, is_correct, args.comment.as_deref())
        .await?;
    ctx.notifications.success("Feedback sent", None);
    output(
        &FeedbackResponse {
            analysis_id: &args.id,
            section: &args.section,
            is_correct,
            submitted: true,
        },
        flags.format,
    )
}
