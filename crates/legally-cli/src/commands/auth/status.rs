use super::AccountResponse;
use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let note = match ctx.session.restore_from_storage().await {
        Ok(true) => None,
        Ok(false) => Some("no stored credential".to_string()),
        Err(error) => Some(error.to_string()),
    };
    output(&AccountResponse::from_session(ctx, note), flags.format)
}
