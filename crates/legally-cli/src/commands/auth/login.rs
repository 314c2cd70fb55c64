use std::io::BufRead;

use anyhow::Context;
use legally_core::entities::Credentials;

use super::AccountResponse;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCredentialArgs;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Login,
    Register,
}

pub async fn handle(
    args: &AuthCredentialArgs,
    mode: Mode,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let password = match &args.password {
        Some(password) => password.clone(),
        None => read_password()?,
    };
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let credentials = Credentials {
        email: args.email.trim().to_string(),
        password,
    };

    let spinner = Progress::spinner(match mode {
        Mode::Login => "Signing in",
        Mode::Register => "Creating account",
    });
    let result = match mode {
        Mode::Login => ctx.session.login(&credentials).await,
        Mode::Register => ctx.session.register(&credentials).await,
    };

    match result {
        Ok(()) => {
            spinner.finish_clear();
            let title = match mode {
                Mode::Login => "Signed in",
                Mode::Register => "Account created",
            };
            ctx.notifications.success(title, Some(credentials.email));
            if ctx.session.is_free_user() && !ctx.session.has_analyses_remaining() {
                ctx.notifications.warning(
                    "No analyses remaining",
                    Some("Upgrade to premium to analyze more contracts".into()),
                );
            }
            output(&AccountResponse::from_session(ctx, None), flags.format)
        }
        Err(error) => {
            spinner.finish_err(&error.to_string());
            ctx.notifications.error(
                match mode {
                    Mode::Login => "Login failed",
                    Mode::Register => "Registration failed",
                },
                Some(error.to_string()),
            );
            Err(error.into())
        }
    }
}

fn read_password() -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
