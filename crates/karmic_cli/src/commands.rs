use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Authorized identity operations
    Identity {
        #[command(subcommand)]
        action: IdentityCommands,
    },

    /// Interpretation authoring operations
    Interpretation {
        #[command(subcommand)]
        action: InterpretationCommands,
    },

    /// Stored report operations
    Report {
        #[command(subcommand)]
        action: ReportCommands,
    },
}

#[derive(Subcommand)]
pub(crate) enum IdentityCommands {
    /// Authorize an email
    Add { email: String },
    /// Revoke an email (protected entries are kept)
    Remove {
        email: String,
        /// Fail instead of ignoring a protected entry
        #[arg(long)]
        strict: bool,
    },
    /// List authorized emails
    List,
}

#[derive(Subcommand)]
pub(crate) enum InterpretationCommands {
    /// Create or replace an interpretation
    Set {
        /// Category id, e.g. karmicSeal
        #[arg(long)]
        category: String,
        #[arg(long, allow_negative_numbers = true)]
        number: i32,
        #[arg(long)]
        title: String,
        /// Inline content
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,
        /// Read content from a file
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    /// Show an interpretation (default text when none was authored)
    Get {
        #[arg(long)]
        category: String,
        #[arg(long, allow_negative_numbers = true)]
        number: i32,
    },
    /// Delete an interpretation
    Delete {
        #[arg(long)]
        category: String,
        #[arg(long, allow_negative_numbers = true)]
        number: i32,
    },
    /// Dump every authored interpretation as a JSON map
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Merge a map written by `export`
    Import { file: PathBuf },
    /// Show the enriched markup of an interpretation
    Render {
        #[arg(long)]
        category: String,
        #[arg(long, allow_negative_numbers = true)]
        number: i32,
    },
}

#[derive(Subcommand)]
pub(crate) enum ReportCommands {
    /// Reports of one identity in creation order
    List {
        #[arg(long)]
        email: String,
    },
    /// Number of reports per identity
    Counts,
}
