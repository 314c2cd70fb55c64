use clap::Subcommand;

use super::subcommands::{AnalysisCommands, AuthCommands, ContractCommands};

/// Root command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Account registration, login and credential status.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Upload and manage contracts.
    Contract {
        #[command(subcommand)]
        action: ContractCommands,
    },
    /// Start, inspect and follow analyses.
    Analysis {
        #[command(subcommand)]
        action: AnalysisCommands,
    },
}
