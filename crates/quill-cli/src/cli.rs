use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Organize notes by category from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name (backend URL and stored session)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Backend base URL override for this invocation
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, sign up, sign out or check the session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// List categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List notes grouped by category
    List {
        /// Category filter: `all` or a category id
        #[arg(short, long, default_value = "all")]
        category: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single note
    Show {
        /// Note ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new note
    New {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Category ID
        #[arg(long, value_name = "ID")]
        category: Option<String>,
    },
    /// Edit a note with autosave; with --stdin each input line is applied as content
    Edit {
        /// Note ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Category ID
        #[arg(long, value_name = "ID")]
        category: Option<String>,
        /// Autosave quiet period in milliseconds
        #[arg(long, value_name = "MS", default_value = "500")]
        debounce_ms: u64,
        /// Retry fields whose save failed instead of dropping them
        #[arg(long)]
        requeue_failed: bool,
        /// Read content states from stdin, one per line, until end of input
        #[arg(long)]
        stdin: bool,
    },
    /// Delete a note
    Delete {
        /// Note ID
        id: String,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Backend base URL for this profile
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Per-request timeout in seconds for this profile
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: Option<u64>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile, backend URL and request timeout
    Show,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email/password and store the session in the keychain
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account, then sign in
    Signup {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Check whether the stored session is still accepted
    Status,
}
