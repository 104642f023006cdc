//! core::ops::interrupt
//!
//! Cooperative cancellation for mutations.
//!
//! An [`Interrupt`] bundles an optional [`CancellationToken`] and an optional
//! deadline. The worktree transaction polls it at its checkpoints (before
//! touching the worktree, and again before committing). A tripped interrupt
//! aborts the mutation, which then restores HEAD like any other failure.
//!
//! # Example
//!
//! ```
//! use proompt_versions::core::ops::interrupt::{Interrupt, InterruptReason};
//! use tokio_util::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let interrupt = Interrupt::none().with_token(token.clone());
//! assert!(interrupt.check().is_ok());
//!
//! token.cancel();
//! assert_eq!(interrupt.check(), Err(InterruptReason::Cancelled));
//! ```

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Why a mutation stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptReason {
    Cancelled,
    DeadlineExceeded,
}

impl std::fmt::Display for InterruptReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterruptReason::Cancelled => write!(f, "cancelled"),
            InterruptReason::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Cancellation signal and deadline for a single mutation.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl Interrupt {
    /// An interrupt that never trips.
    pub fn none() -> Self {
        Self::default()
    }

    /// Trip when `token` is cancelled.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Trip once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Trip once `timeout` has elapsed from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Return the reason if the mutation should stop.
    ///
    /// Cancellation is reported ahead of an expired deadline.
    pub fn check(&self) -> Result<(), InterruptReason> {
        if self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(InterruptReason::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(InterruptReason::DeadlineExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_never_trips() {
        assert!(Interrupt::none().check().is_ok());
    }

    #[test]
    fn cancelled_token_trips() {
        let token = CancellationToken::new();
        let interrupt = Interrupt::none().with_token(token.clone());
        token.cancel();
        assert_eq!(interrupt.check(), Err(InterruptReason::Cancelled));
    }

    #[test]
    fn child_token_follows_parent() {
        let parent = CancellationToken::new();
        let interrupt = Interrupt::none().with_token(parent.child_token());
        assert!(interrupt.check().is_ok());
        parent.cancel();
        assert_eq!(interrupt.check(), Err(InterruptReason::Cancelled));
    }

    #[test]
    fn past_deadline_trips() {
        let interrupt = Interrupt::none().with_deadline(Instant::now());
        assert_eq!(interrupt.check(), Err(InterruptReason::DeadlineExceeded));
    }

    #[test]
    fn future_deadline_does_not_trip() {
        let interrupt = Interrupt::none().with_timeout(Duration::from_secs(3600));
        assert!(interrupt.check().is_ok());
    }

    #[test]
    fn cancellation_wins_over_deadline() {
        let token = CancellationToken::new();
        token.cancel();
        let interrupt = Interrupt::none()
            .with_token(token)
            .with_deadline(Instant::now());
        assert_eq!(interrupt.check(), Err(InterruptReason::Cancelled));
    }
}
