//! # Backoff policy and cursor abstraction.
//!
//! A [`Backoff`] is an immutable description of a delay sequence. Every call to
//! [`Backoff::cursor`] spawns a fresh, independent cursor that yields the
//! sequence from its first value. Cursors are plain [`Iterator`]s over
//! [`Duration`]; `None` means the sequence is exhausted.
//!
//! ```text
//! Backoff (shared, immutable)
//!   ├─► cursor() ──► Cursor #1 (owned by retry execution #1)
//!   ├─► cursor() ──► Cursor #2 (owned by retry execution #2)
//!   └─► ...
//! ```
//!
//! Modifiers wrap a backoff and produce another backoff, so generators and
//! modifiers nest freely. The outermost wrapper decides the cursor that is
//! actually spawned:
//!
//! ```text
//! Exponential::new(10ms).jitter(2ms).max_retries(5)
//!   └─► Bounded<Jitter<Exponential>>  (5 jittered values, then None)
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::policies::bounded::Bounded;
use crate::policies::jitter::{Jitter, JitterSource};
use crate::policies::modifier::Modifier;

/// Restartable source of retry delays.
///
/// Implementors must be cheap to share: spawning a cursor never mutates the
/// policy, so one value can drive any number of concurrent executions.
pub trait Backoff: Send + Sync {
    /// Per-execution state; yields delays until `None`.
    type Cursor: Iterator<Item = Duration> + Send;

    /// Spawns a cursor positioned at the first delay.
    fn cursor(&self) -> Self::Cursor;
}

impl<B: Backoff + ?Sized> Backoff for Arc<B> {
    type Cursor = B::Cursor;

    fn cursor(&self) -> Self::Cursor {
        (**self).cursor()
    }
}

impl<B: Backoff + ?Sized> Backoff for &B {
    type Cursor = B::Cursor;

    fn cursor(&self) -> Self::Cursor {
        (**self).cursor()
    }
}

/// Builder-style modifiers available on every [`Backoff`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use reattempt::{Backoff, BackoffExt, Linear};
///
/// let policy = Linear::new(Duration::from_secs(1)).max_retries(3);
/// let delays: Vec<_> = policy.cursor().collect();
/// assert_eq!(delays, [1, 2, 3].map(Duration::from_secs));
/// ```
pub trait BackoffExt: Backoff + Sized {
    /// Caps every cursor at `n` delays.
    fn max_retries(self, n: usize) -> Bounded<Self> {
        Bounded::new(self, n)
    }

    /// Perturbs every delay by up to `±spread`, seeded from entropy.
    fn jitter(self, spread: Duration) -> Jitter<Self> {
        Jitter::new(self, spread, JitterSource::Entropy)
    }

    /// Perturbs every delay by up to `±spread`, using the given seed source.
    fn jitter_with(self, spread: Duration, source: JitterSource) -> Jitter<Self> {
        Jitter::new(self, spread, source)
    }

    /// Applies `modifiers` in order; the last one becomes the outermost wrapper.
    fn modify<I>(self, modifiers: I) -> BoxBackoff
    where
        Self: 'static,
        I: IntoIterator<Item = Modifier>,
    {
        modifiers
            .into_iter()
            .fold(self.boxed(), |policy, modifier| modifier.apply(policy))
    }

    /// Erases the concrete type.
    fn boxed(self) -> BoxBackoff
    where
        Self: 'static,
    {
        BoxBackoff::new(self)
    }
}

impl<B: Backoff> BackoffExt for B {}

/// Type-erased cursor spawned by a [`BoxBackoff`].
pub type BoxCursor = Box<dyn Iterator<Item = Duration> + Send>;

trait ErasedBackoff: Send + Sync {
    fn erased_cursor(&self) -> BoxCursor;
}

impl<B> ErasedBackoff for B
where
    B: Backoff,
    B::Cursor: 'static,
{
    fn erased_cursor(&self) -> BoxCursor {
        Box::new(self.cursor())
    }
}

/// Shared, type-erased [`Backoff`].
///
/// Used where policies of different concrete types meet: runtime
/// [`Modifier`] lists and [`BackoffConfig::build`](crate::BackoffConfig::build).
/// Cloning is an `Arc` bump.
#[derive(Clone)]
pub struct BoxBackoff {
    inner: Arc<dyn ErasedBackoff>,
}

impl BoxBackoff {
    /// Wraps any backoff.
    pub fn new<B>(backoff: B) -> Self
    where
        B: Backoff + 'static,
    {
        Self {
            inner: Arc::new(backoff),
        }
    }
}

impl Backoff for BoxBackoff {
    type Cursor = BoxCursor;

    fn cursor(&self) -> Self::Cursor {
        self.inner.erased_cursor()
    }
}

impl fmt::Debug for BoxBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxBackoff").finish_non_exhaustive()
    }
}
