use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::git::GitScope;

/// CLI arguments parser using `clap`
#[derive(Parser, Debug)]
#[command(name = "gitmu", version, about)]
pub struct Cli {
    /// Settings file holding the identity list
    #[arg(long, global = true, env = "GITMU_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand chosen to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where an identity gets written
#[derive(Args, Debug, Clone, Copy)]
pub struct ScopeArgs {
    /// Write to the current repository instead of the global config
    #[arg(long)]
    pub local: bool,
}

impl ScopeArgs {
    pub fn scope(self) -> GitScope {
        if self.local { GitScope::Local } else { GitScope::Global }
    }
}

// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Picks a stored identity interactively and switches to it
    Select,
    /// Switches git to a stored identity
    Switch {
        /// Display key, e.g. "alice (alice@example.com)"
        display_key: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Stores an identity and switches to it
    Add {
        /// Git username
        user_name: String,
        /// Git email, derived when useNoreplyEmail is set
        user_email: Option<String>,
        #[command(flatten)]
        scope: ScopeArgs,
        /// Only store the identity
        #[arg(long)]
        no_switch: bool,
    },
    /// Deletes stored identities; without keys, choose them interactively
    Delete {
        /// Display keys of the identities to delete
        display_keys: Vec<String>,
    },
    /// Displays all stored identities
    List,
    /// Displays current Git user
    Current,
    /// Stores the identities currently set in global and local git config
    Import,
    /// Unsets user.name and user.email in global and local git config
    Unset,
    /// Runs the first-run import and, if enabled, the unset on startup
    Startup,
}
