//! # Cancellation context.
//!
//! [`Context`] is the caller's handle for stopping a retried call: a
//! [`CancellationToken`] plus an optional deadline on the tokio clock.
//!
//! ```text
//! Context::background()
//!   └─► with_timeout(5s)          child token, deadline = now + 5s
//!         └─► with_timeout(10s)   child token, deadline stays now + 5s
//! ```
//!
//! ## Rules
//! - Derived contexts get a **child token**: cancelling a child never cancels its parent.
//! - A derived deadline never extends the parent's deadline.
//! - Explicit cancellation is reported as [`ContextError::Canceled`], an expired
//!   deadline as [`ContextError::DeadlineExceeded`].

use std::time::Duration;

use tokio::select;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::ContextError;

/// Cancellation and deadline signal handed to every invocation.
#[derive(Clone, Debug, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// Context that is never done unless cancelled through [`Context::cancel`].
    pub fn background() -> Self {
        Self::default()
    }

    /// Context driven by an existing token (for example a runtime shutdown token).
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derives a child context that also expires `timeout` from now.
    ///
    /// A timeout too large to represent leaves the deadline unchanged.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Derives a child context that also expires at `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) => parent.min(deadline),
            None => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Derives a child context with the same deadline.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancels this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns the underlying token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Reports whether the context is cancelled or past its deadline.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves once the context is done, yielding the reason.
    ///
    /// Cancellation takes precedence when both fire at the same time.
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => select! {
                biased;
                _ = self.token.cancelled() => ContextError::Canceled,
                _ = time::sleep_until(deadline) => ContextError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                ContextError::Canceled
            }
        }
    }
}
