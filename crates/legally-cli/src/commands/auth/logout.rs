use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct LogoutResponse {
    logged_out: bool,
}

pub async fn handle(ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    // A rejected credential is already cleared by the restore.
    if let Err(error) = ctx.session.restore_from_storage().await {
        tracing::debug!(%error, "stored credential was already invalid");
    }
    ctx.session.logout().await;
    ctx.notifications.info("Signed out", None);
    output(&LogoutResponse { logged_out: true }, flags.format)
}
