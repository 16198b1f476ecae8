//! Command-line interface definitions.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates across two trees
//! dupescan scan ~/Music /mnt/backup/Music
//!
//! # JSON report, four hashing threads
//! dupescan scan ~/Downloads --json --threads 4
//!
//! # Remove every copy but the first in each group
//! dupescan scan ~/Downloads --delete-duplicates --trash
//!
//! # Act on explicit paths
//! dupescan delete ~/Downloads/a\ (1).jpg
//! dupescan move --to ~/dupes ~/Downloads/a\ (1).jpg --on-collision rename
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::actions::CollisionPolicy;
use crate::config::SettingsOverrides;

/// Find duplicate files by content hash.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable coloured output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories and report duplicate groups
    Scan(ScanArgs),
    /// Delete the given files
    Delete(DeleteArgs),
    /// Move the given files into a directory
    Move(MoveArgs),
}

/// Arguments for `scan`.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Root directories to scan
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Number of hashing threads
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub hash_threads: Option<usize>,

    /// Skip hidden files and directories
    #[arg(long)]
    pub skip_hidden: bool,

    /// Gitignore-style pattern to exclude (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// After the scan, delete all but the first file of every group
    #[arg(long, conflicts_with = "move_duplicates")]
    pub delete_duplicates: bool,

    /// After the scan, move all but the first file of every group here
    #[arg(long, value_name = "DIR")]
    pub move_duplicates: Option<PathBuf>,

    #[command(flatten)]
    pub action: ActionFlags,
}

/// Arguments for `delete`.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Files to delete
    #[arg(value_name = "FILE", required = true)]
    pub paths: Vec<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub action: ActionFlags,
}

/// Arguments for `move`.
#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Files to move
    #[arg(value_name = "FILE", required = true)]
    pub paths: Vec<PathBuf>,

    /// Destination directory
    #[arg(long = "to", value_name = "DIR")]
    pub destination: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub action: ActionFlags,
}

/// Flags shared by every command that deletes or moves.
#[derive(Debug, Args, Default)]
pub struct ActionFlags {
    /// Send deleted files to the system trash
    #[arg(long)]
    pub trash: bool,

    /// What to do when the destination already has the file name
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_collision: Option<CollisionPolicy>,
}

impl ActionFlags {
    fn apply(&self, overrides: &mut SettingsOverrides) {
        if self.trash {
            overrides.use_trash = Some(true);
        }
        overrides.on_collision = self.on_collision;
    }
}

impl Commands {
    /// Settings given explicitly on the command line.
    ///
    /// Boolean flags only override when present, so a config file can still
    /// turn them on.
    #[must_use]
    pub fn overrides(&self) -> SettingsOverrides {
        let mut overrides = SettingsOverrides::default();
        match self {
            Commands::Scan(args) => {
                overrides.hash_threads = args.hash_threads;
                if args.skip_hidden {
                    overrides.skip_hidden = Some(true);
                }
                if !args.ignore_patterns.is_empty() {
                    overrides.ignore_patterns = Some(args.ignore_patterns.clone());
                }
                args.action.apply(&mut overrides);
            }
            Commands::Delete(args) => args.action.apply(&mut overrides),
            Commands::Move(args) => args.action.apply(&mut overrides),
        }
        overrides
    }
}
