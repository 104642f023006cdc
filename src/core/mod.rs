//! core
//!
//! Domain types, naming rules and supporting infrastructure.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, RefName, EntityId, EntityKind
//! - [`entity`] - Prompt and snippet records and their stored snapshots
//! - [`naming`] - Branch naming, file names and commit messages
//! - [`ops`] - Repository locking and cooperative cancellation
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for the store
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Branch names are derived, never accepted from callers
//! - Schemas are strict and self-describing

pub mod config;
pub mod entity;
pub mod naming;
pub mod ops;
pub mod paths;
pub mod types;
