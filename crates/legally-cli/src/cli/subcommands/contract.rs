use clap::{Args, Subcommand};

/// Contract library commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ContractCommands {
    /// Upload a PDF or DOCX file (10 MB max).
    Upload(ContractUploadArgs),
    /// List uploaded contracts, one page at a time.
    List(ContractListArgs),
    /// Fetch one contract record.
    Get(ContractIdArgs),
    /// Delete a contract.
    Delete(ContractIdArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ContractUploadArgs {
    /// Path to the document.
    pub path: String,
    /// Start an analysis once the upload settles.
    #[arg(long)]
    pub analyze: bool,
    /// Output language for `--analyze` (defaults to `general.output_language`).
    #[arg(long, requires = "analyze")]
    pub language: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ContractListArgs {
    /// 1-based page number.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

#[derive(Clone, Debug, Args)]
pub struct ContractIdArgs {
    /// Contract id.
    pub id: String,
}
