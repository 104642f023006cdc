//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Load this config file instead of searching
//! - `--repos-dir <path>`: Override `storage.repos_dir`
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output
//! - `--no-wait`: Fail instead of queueing behind another writer

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::types::{EntityId, EntityKind};

/// pv - Git-backed version history for prompts and snippets
#[derive(Parser, Debug)]
#[command(name = "pv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to load (skips the default search)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the version repository
    #[arg(long, global = true, value_name = "PATH")]
    pub repos_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Fail if another writer holds the repository lock
    #[arg(long, global = true)]
    pub no_wait: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the version repository if needed
    #[command(
        long_about = "Create the version repository if needed.\n\n\
            The repository is created under the configured repos directory with \
            a single marker commit on the default branch. Running init on an \
            existing repository leaves its history untouched.",
        after_help = "\
EXAMPLES:
    # Create the repository in the default location
    pv init

    # Create it elsewhere and remember the location in a config file
    pv --repos-dir /srv/proompt init --write-config"
    )]
    Init {
        /// Also write a config file (to --config, or the default location)
        #[arg(long)]
        write_config: bool,
    },

    /// Check that the default branch and HEAD resolve
    Validate,

    /// List entities that have version history
    List {
        /// Entity kind: prompt or snippet
        kind: EntityKind,
    },

    /// Show an entity's versions, newest first
    History {
        /// Entity kind: prompt or snippet
        kind: EntityKind,
        /// Entity id
        id: EntityId,
    },

    /// Print an entity as recorded at one version
    Show {
        /// Entity kind: prompt or snippet
        kind: EntityKind,
        /// Entity id
        id: EntityId,
        /// Full commit hash from `pv history`
        hash: String,
    },

    /// Record the first version of an entity
    #[command(after_help = "\
EXAMPLES:
    # Record a prompt read from a JSON file
    pv create prompt --file prompt.json --note \"first draft\"

    # Read the JSON from stdin
    cat snippet.json | pv create snippet --file -")]
    Create {
        /// Entity kind: prompt or snippet
        kind: EntityKind,
        #[command(flatten)]
        input: RecordArgs,
    },

    /// Record a new version of an existing entity
    Update {
        /// Entity kind: prompt or snippet
        kind: EntityKind,
        #[command(flatten)]
        input: RecordArgs,
    },

    /// Delete an entity's branch
    Delete {
        /// Entity kind: prompt or snippet
        kind: EntityKind,
        /// Entity id
        id: EntityId,
    },
}

/// Inputs shared by `create` and `update`.
#[derive(clap::Args, Debug)]
pub struct RecordArgs {
    /// Entity JSON file, or `-` for stdin
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,

    /// Annotation stored as the commit body
    #[arg(long, default_value = "")]
    pub note: String,

    /// Give up if the commit has not started within this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_globals_after_subcommand() {
        let cli = Cli::try_parse_from(["pv", "list", "prompt", "--json", "-q"]).unwrap();
        assert!(cli.json);
        assert!(!cli.no_wait);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Command::List {
                kind: EntityKind::Prompt
            }
        ));
    }

    #[test]
    fn accepts_plural_kind() {
        let cli = Cli::try_parse_from(["pv", "history", "snippets", "abc"]).unwrap();
        match cli.command {
            Command::History { kind, id } => {
                assert_eq!(kind, EntityKind::Snippet);
                assert_eq!(id.as_str(), "abc");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unsafe_id() {
        assert!(Cli::try_parse_from(["pv", "delete", "prompt", "../x"]).is_err());
    }

    #[test]
    fn record_args() {
        let cli = Cli::try_parse_from([
            "pv", "update", "prompt", "--file", "p.json", "--note", "polish", "--timeout", "5",
        ])
        .unwrap();
        match cli.command {
            Command::Update { input, .. } => {
                assert_eq!(input.file, PathBuf::from("p.json"));
                assert_eq!(input.note, "polish");
                assert_eq!(input.timeout, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn note_defaults_to_empty() {
        let cli = Cli::try_parse_from(["pv", "create", "snippet", "--file", "-"]).unwrap();
        match cli.command {
            Command::Create { input, .. } => assert_eq!(input.note, ""),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
