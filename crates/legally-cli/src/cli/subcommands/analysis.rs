use clap::{Args, Subcommand};

/// Analysis commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AnalysisCommands {
    /// Request an analysis of an uploaded contract.
    Start(AnalysisStartArgs),
    /// Fetch the current analysis snapshot.
    Get(AnalysisIdArgs),
    /// Follow the live event stream until the analysis settles.
    Watch(AnalysisIdArgs),
    /// Rate one section of the analysis output.
    Feedback(AnalysisFeedbackArgs),
}

#[derive(Clone, Debug, Args)]
pub struct AnalysisStartArgs {
    /// Contract id.
    pub contract_id: String,
    /// Output language (defaults to `general.output_language`).
    #[arg(long)]
    pub language: Option<String>,
    /// Keep following the stream after starting.
    #[arg(long)]
    pub watch: bool,
}

#[derive(Clone, Debug, Args)]
pub struct AnalysisIdArgs {
    /// Analysis id.
    pub id: String,
}

#[derive(Clone, Debug, Args)]
pub struct AnalysisFeedbackArgs {
    /// Analysis id.
    pub id: String,
    /// Section of the output being rated.
    #[arg(long)]
    pub section: String,
    /// The section is correct.
    #[arg(long, conflicts_with = "incorrect", required_unless_present = "incorrect")]
    pub correct: bool,
    /// The section is wrong.
    #[arg(long)]
    pub incorrect: bool,
    /// Free-text comment.
    #[arg(long)]
    pub comment: Option<String>,
}
