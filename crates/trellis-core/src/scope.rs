//! Deadline-bounded cancellation for a single request.
//!
//! Every dispatched request gets a [`CancelScope`]. The scope is cancelled
//! when its deadline passes or when the handler returns, whichever comes
//! first. Cancellation is cooperative: handlers observe it through
//! [`CancelScope::cancelled`], [`CancelScope::run`] or
//! [`CancelScope::ensure_active`]; nothing preempts a running handler.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use trellis_core::CancelScope;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (scope, guard) = CancelScope::with_timeout(Duration::from_secs(60));
//! assert!(!scope.is_cancelled());
//!
//! drop(guard);
//! assert!(scope.is_cancelled());
//! # }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::HandlerError;

/// Deadline applied to every request unless the router is configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const ACTIVE: u8 = 0;
const DEADLINE_EXCEEDED: u8 = 1;
const CLOSED: u8 = 2;

/// Why a scope was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The deadline passed before the handler returned.
    DeadlineExceeded,
    /// The scope was closed, normally because the handler returned.
    Closed,
}

/// Cancellation signal shared by everything working on one request.
///
/// Clones observe the same state.
#[derive(Debug, Clone)]
pub struct CancelScope {
    state: Arc<AtomicU8>,
    sender: broadcast::Sender<()>,
    deadline: Option<Instant>,
}

impl CancelScope {
    /// Creates a scope with no deadline. It is only cancelled explicitly.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            state: Arc::new(AtomicU8::new(ACTIVE)),
            sender,
            deadline: None,
        }
    }

    /// Creates a scope that cancels itself at `deadline`.
    ///
    /// The returned guard closes the scope and stops the timer when dropped.
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> (Self, ScopeGuard) {
        let mut scope = Self::new();
        scope.deadline = Some(deadline);

        let timer_scope = scope.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            timer_scope.cancel_with(DEADLINE_EXCEEDED);
        });

        let guard = ScopeGuard {
            scope: scope.clone(),
            timer: Some(timer),
        };
        (scope, guard)
    }

    /// Creates a scope that cancels itself `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> (Self, ScopeGuard) {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Closes the scope. Returns `false` if it was already cancelled.
    pub fn cancel(&self) -> bool {
        self.cancel_with(CLOSED)
    }

    fn cancel_with(&self, reason: u8) -> bool {
        if self
            .state
            .compare_exchange(ACTIVE, reason, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // No receivers is fine
            let _ = self.sender.send(());
            true
        } else {
            false
        }
    }

    /// Returns `true` once the scope has been cancelled for any reason.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::SeqCst) != ACTIVE
    }

    /// Returns why the scope was cancelled, or `None` while it is active.
    #[must_use]
    pub fn reason(&self) -> Option<CancelReason> {
        match self.state.load(Ordering::SeqCst) {
            DEADLINE_EXCEEDED => Some(CancelReason::DeadlineExceeded),
            CLOSED => Some(CancelReason::Closed),
            _ => None,
        }
    }

    /// Returns `true` if the scope was cancelled by its deadline.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.reason() == Some(CancelReason::DeadlineExceeded)
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the time left before the deadline, if any.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Completes once the scope is cancelled.
    ///
    /// Completes immediately if it already is.
    pub async fn cancelled(&self) {
        // Subscribe before checking the flag so a concurrent cancel is not missed
        let mut receiver = self.sender.subscribe();
        if self.is_cancelled() {
            return;
        }
        let _ = receiver.recv().await;
    }

    /// Runs `future` until it completes or the scope is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Timeout`] when the deadline passes first, or
    /// [`HandlerError::Internal`] when the scope is closed first.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, HandlerError>
    where
        F: Future,
    {
        tokio::select! {
            output = future => Ok(output),
            () = self.cancelled() => Err(self.cancellation_error()),
        }
    }

    /// Returns an error if the scope has already been cancelled.
    pub fn ensure_active(&self) -> Result<(), HandlerError> {
        if self.is_cancelled() {
            Err(self.cancellation_error())
        } else {
            Ok(())
        }
    }

    fn cancellation_error(&self) -> HandlerError {
        if self.timed_out() {
            HandlerError::timeout("request deadline exceeded")
        } else {
            HandlerError::internal("request scope closed")
        }
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the deadline timer of a [`CancelScope`].
///
/// Dropping the guard closes the scope and stops the timer.
#[derive(Debug)]
pub struct ScopeGuard {
    scope: CancelScope,
    timer: Option<JoinHandle<()>>,
}

impl ScopeGuard {
    /// Returns the guarded scope.
    #[must_use]
    pub const fn scope(&self) -> &CancelScope {
        &self.scope
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.scope.cancel();
    }
}
