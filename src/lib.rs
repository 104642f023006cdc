//! Proompt versions - Git-backed version history for prompts and snippets
//!
//! Every prompt and snippet gets its own orphan branch in one shared Git
//! repository. Each create or update of the entity appends a commit holding
//! a JSON snapshot, so any past state can be listed and read back by hash.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Operator command-line interface (`pv`)
//! - [`versions`] - Repository manager, branch lifecycle, worktree
//!   transaction and history reader
//! - [`core`] - Domain types, naming, configuration, locking
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - Logging setup and output formatting
//!
//! # Correctness Invariants
//!
//! 1. Each entity branch is linear and shares no commit with any other
//! 2. Every entity commit's tree holds exactly `content.json`
//! 3. HEAD rests on the default branch between operations, even after a
//!    failed mutation
//! 4. Mutations are serialized within and across processes

pub mod cli;
pub mod core;
pub mod git;
pub mod ui;
pub mod versions;
