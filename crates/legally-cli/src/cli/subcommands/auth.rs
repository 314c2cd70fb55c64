use clap::{Args, Subcommand};

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Create an account and store its credential.
    Register(AuthCredentialArgs),
    /// Log in with email and password.
    Login(AuthCredentialArgs),
    /// Notify the server and clear stored credentials.
    Logout,
    /// Show the signed-in account and remaining quota.
    Status,
}

#[derive(Clone, Debug, Args)]
pub struct AuthCredentialArgs {
    /// Account email.
    pub email: String,
    /// Password. Read from the first line of stdin when omitted.
    #[arg(long)]
    pub password: Option<String>,
}
