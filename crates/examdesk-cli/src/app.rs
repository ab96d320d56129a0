//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "examdesk")]
#[command(
    author,
    version,
    about = "Study assistant: ask a generative model and search exam documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage API keys
    Keys(KeysArgs),

    /// Ask the model a question
    Ask(AskArgs),

    /// Manage uploaded documents
    Docs(DocsArgs),

    /// Search uploaded documents
    Search(SearchArgs),

    /// Suggest completions for a partial query
    Suggest(SuggestArgs),

    /// Show the filter values present in the document store
    Filters,
}

#[derive(Args)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub action: KeysAction,
}

#[derive(Subcommand)]
pub enum KeysAction {
    /// Add an API key at the end of the rotation
    Add { key: String },
    /// List keys (masked) with their health
    #[command(alias = "ls")]
    List,
    /// Remove the key at an index
    #[command(alias = "rm")]
    Remove { index: usize },
    /// Advance to the next key
    Rotate,
    /// Make the key at an index current
    Select { index: usize },
    /// Send a probe request with one key, or every key
    Check { index: Option<usize> },
    /// Turn fallback to the next key on or off
    Fallback {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Args)]
pub struct AskArgs {
    /// Question text
    #[arg(required = true)]
    pub prompt: Vec<String>,

    /// File whose text is sent as reference material
    #[arg(long)]
    pub context_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct DocsArgs {
    #[command(subcommand)]
    pub action: DocsAction,
}

#[derive(Subcommand)]
pub enum DocsAction {
    /// Add a text document to the store
    Add {
        file: PathBuf,
        /// Display name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
        /// Subject code, e.g. toanHoc
        #[arg(long)]
        subject: Option<String>,
        /// MIME type (guessed from the extension when omitted)
        #[arg(long = "type")]
        file_type: Option<String>,
        /// Exam type, e.g. cuoiKy
        #[arg(long)]
        exam_type: Option<String>,
        /// Exam year
        #[arg(long)]
        year: Option<i32>,
    },
    /// List stored documents
    #[command(alias = "ls")]
    List,
    /// Remove the document at a position
    #[command(alias = "rm")]
    Remove { position: usize },
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search query (empty lists everything that passes the filters)
    pub query: Vec<String>,

    /// Subject code
    #[arg(long)]
    pub subject: Option<String>,

    /// MIME type
    #[arg(long = "type")]
    pub file_type: Option<String>,

    /// Exam type
    #[arg(long)]
    pub exam_type: Option<String>,

    /// Earliest upload date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest upload date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub to: Option<String>,

    /// Wrap matched terms in <mark> tags
    #[arg(long)]
    pub highlight: bool,

    /// Maximum number of results
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Partial query text
    pub partial: String,

    /// Maximum number of suggestions
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
    Csv,
    Md,
}
