mod login;
mod logout;
mod status;

use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;
use crate::context::AppContext;

/// Handle `legally auth <subcommand>`.
pub async fn handle(
    action: &AuthCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::Register(args) => login::handle(args, login::Mode::Register, ctx, flags).await,
        AuthCommands::Login(args) => login::handle(args, login::Mode::Login, ctx, flags).await,
        AuthCommands::Logout => logout::handle(ctx, flags).await,
        AuthCommands::Status => status::handle(ctx, flags).await,
    }
}

/// Account summary shared by `login`, `register` and `status`.
#[derive(Debug, Serialize)]
struct AccountResponse {
    authenticated: bool,
    email: Option<String>,
    tier: Option<String>,
    contracts_analyzed: Option<u32>,
    analyses_remaining: Option<u32>,
    can_analyze: bool,
    token_source: Option<String>,
    note: Option<String>,
}

impl AccountResponse {
    fn from_session(ctx: &AppContext, note: Option<String>) -> Self {
        let user = ctx.session.user();
        Self {
            authenticated: ctx.session.is_authenticated(),
            email: user.map(|u| u.email.clone()),
            tier: user.map(|u| u.tier.to_string()),
            contracts_analyzed: user.map(|u| u.contracts_analyzed),
            analyses_remaining: user.map(|u| u.analyses_remaining),
            can_analyze: ctx.session.is_premium_user() || ctx.session.has_analyses_remaining(),
            token_source: ctx.session.storage().source().map(str::to_string),
            note,
        }
    }
}
