//! core::ops
//!
//! Write serialization and cancellation primitives.
//!
//! # Modules
//!
//! - [`lock`] - Exclusive cross-process repository lock
//! - [`interrupt`] - Cancellation token and deadline checks
//!
//! # Architecture
//!
//! Every mutating lifecycle operation:
//! 1. Takes the in-process write mutex
//! 2. Acquires the repository lock (blocking)
//! 3. Runs a worktree transaction, polling its [`Interrupt`] at checkpoints
//! 4. Restores HEAD, then releases the lock on drop

pub mod interrupt;
pub mod lock;

pub use interrupt::{Interrupt, InterruptReason};
pub use lock::{LockError, RepoLock};
