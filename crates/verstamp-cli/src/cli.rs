//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use verstamp_core::ChangeKind;

/// verstamp - Keep one version record consistent across every manifest
#[derive(Parser, Debug)]
#[command(name = "verstamp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (defaults to the nearest directory with a manifest)
    #[arg(short = 'C', long, global = true, env = "VERSTAMP_ROOT")]
    pub root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the full version (MAJOR.MINOR.PATCH+BUILD)
    Get,

    /// Print the semantic version (MAJOR.MINOR.PATCH)
    GetSemantic,

    /// Print the build identifier
    GetBuild,

    /// Print every field of the version record
    Info {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Bump a component and stamp a new build identifier
    ///
    /// Examples:
    ///   verstamp increment minor      # 2.9.9 -> 2.10.0
    ///   verstamp increment build      # new build identifier only
    Increment {
        /// Component to bump (major, minor, patch or build)
        kind: ChangeKind,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Bump a component and leave the build identifier for `inject`
    Prepare {
        /// Component to bump (major, minor, patch or build)
        kind: ChangeKind,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Set the semantic version and stamp a new build identifier
    Set {
        /// New version, MAJOR.MINOR.PATCH
        version: String,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Fail unless the manifest holds a well-formed version
    Validate,

    /// Replace the build identifier with one for the current time
    Inject {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Revert every representation from its backup
    Restore,

    /// Discard backups without restoring
    Cleanup,

    /// Check every representation against the manifest
    Check {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Classify the change between two versions
    Classify {
        /// Version before the change
        old: String,

        /// Version after the change
        new: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List backup state per representation
    Backups,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
