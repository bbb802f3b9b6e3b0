//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// locsync - keep local content in sync with a remote TMS
#[derive(Parser, Debug)]
#[command(name = "locsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: <project>/.locsync/locsync.db)
    #[arg(long, global = true, env = "LOCSYNC_DB")]
    pub db: Option<PathBuf>,

    /// Actor name for the audit trail
    #[arg(long, global = true, env = "LOCSYNC_ACTOR")]
    pub actor: Option<String>,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output only essential identifiers
    #[arg(long, global = true)]
    pub silent: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a locsync workspace in the current directory
    Init(InitArgs),

    /// Print version information
    Version,

    /// Show sync status for every tracked document
    Status,

    /// Document lifecycle commands
    Document {
        #[command(subcommand)]
        command: DocumentCommands,
    },

    /// Target language commands
    Target {
        #[command(subcommand)]
        command: TargetCommands,
    },

    /// Automation profile management
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Job grouping queries
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Dispatch an inbound webhook payload (file or stdin)
    Webhook(WebhookArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// TMS project identifier
    #[arg(long)]
    pub project_id: String,

    /// Source content language
    #[arg(long, default_value = "en")]
    pub source_locale: String,

    /// Enabled target languages (repeatable)
    #[arg(long = "target-locale", required = true)]
    pub target_locales: Vec<String>,

    /// Overwrite an existing workspace
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand, Debug)]
pub enum DocumentCommands {
    /// Upload a document's content for translation
    Upload {
        /// Project-relative path of the content
        local_ref: String,

        /// Job grouping tag to assign
        #[arg(long)]
        job: Option<String>,
    },

    /// Re-send edited content to the existing remote document
    Update {
        /// Project-relative path of the content
        local_ref: String,
    },

    /// Re-query remote import progress
    Check {
        /// Project-relative path of the content
        local_ref: String,
    },

    /// Detect local edits and apply auto-upload policy
    Refresh {
        /// Project-relative path of the content; omit with --all
        local_ref: Option<String>,

        /// Refresh every tracked document
        #[arg(long)]
        all: bool,
    },

    /// Reset a document to untracked and clear its remote mapping
    Clear {
        /// Project-relative path of the content
        local_ref: String,
    },

    /// Show one document with its targets
    Show {
        /// Project-relative path of the content
        local_ref: String,
    },

    /// List all tracked documents
    List,

    /// Assign or clear the job grouping tag
    SetJob {
        /// Project-relative path of the content
        local_ref: String,

        /// Job id; omit with --clear
        job: Option<String>,

        /// Remove the job assignment
        #[arg(long)]
        clear: bool,
    },

    /// Assign or clear the automation profile
    SetProfile {
        /// Project-relative path of the content
        local_ref: String,

        /// Profile name; omit with --clear
        profile: Option<String>,

        /// Remove the profile assignment
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TargetCommands {
    /// Request translation into one locale
    Request {
        /// Project-relative path of the content
        local_ref: String,

        /// Target locale (e.g. "de", "pt-BR")
        locale: String,
    },

    /// Re-query translation progress for one locale
    Check {
        /// Project-relative path of the content
        local_ref: String,

        /// Target locale
        locale: String,
    },

    /// Download a ready translation
    Download {
        /// Project-relative path of the content
        local_ref: String,

        /// Target locale
        locale: String,
    },

    /// Re-check every requested target of a document
    CheckAll {
        /// Project-relative path of the content
        local_ref: String,
    },
}

#[derive(Args, Debug)]
pub struct ProfileCreateArgs {
    /// Unique profile name
    pub name: String,

    /// Automatically re-send local edits
    #[arg(long)]
    pub auto_upload: bool,

    /// Automatically request eligible targets
    #[arg(long)]
    pub auto_request: bool,

    /// Automatically download completed translations
    #[arg(long)]
    pub auto_download: bool,
}

#[derive(Args, Debug)]
pub struct ProfileOverrideArgs {
    /// Profile name
    pub name: String,

    /// Locale to override
    pub locale: String,

    /// Disable the locale entirely
    #[arg(long, conflicts_with_all = ["auto_request", "auto_download", "remove"])]
    pub disable: bool,

    /// Custom auto-request flag for this locale
    #[arg(long)]
    pub auto_request: Option<bool>,

    /// Custom auto-download flag for this locale
    #[arg(long)]
    pub auto_download: Option<bool>,

    /// Remove the override for this locale
    #[arg(long)]
    pub remove: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Create a new automation profile
    Create(ProfileCreateArgs),

    /// List all profiles
    List,

    /// Show one profile with its overrides
    Show {
        /// Profile name
        name: String,
    },

    /// Update a profile's global automation flags
    Set {
        /// Profile name
        name: String,

        /// Automatically re-send local edits
        #[arg(long)]
        auto_upload: Option<bool>,

        /// Automatically request eligible targets
        #[arg(long)]
        auto_request: Option<bool>,

        /// Automatically download completed translations
        #[arg(long)]
        auto_download: Option<bool>,
    },

    /// Add, change, or remove a per-locale override
    Override(ProfileOverrideArgs),
}

#[derive(Subcommand, Debug)]
pub enum JobCommands {
    /// List job ids with member counts
    List,

    /// Show a job's member documents
    Show {
        /// Job id
        job_id: String,
    },

    /// Rebuild the job index from the documents table
    Rebuild,
}

#[derive(Args, Debug)]
pub struct WebhookArgs {
    /// Read the JSON payload from a file instead of stdin
    #[arg(long)]
    pub file: Option<PathBuf>,
}
