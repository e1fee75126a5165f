//! # Retry-count bound.
//!
//! [`Bounded`] caps how many delays each cursor yields. Once the cap is hit,
//! or the inner cursor runs dry first, the cursor reports `None` forever.
//! Values pass through untouched.

use std::iter::FusedIterator;
use std::time::Duration;

use crate::policies::backoff::Backoff;

/// Backoff that yields at most `limit` delays per cursor.
///
/// `limit = 0` means "never retry": the first pull is already `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounded<B> {
    inner: B,
    limit: usize,
}

impl<B> Bounded<B> {
    /// Wraps `inner`, allowing at most `limit` retries.
    pub fn new(inner: B, limit: usize) -> Self {
        Self { inner, limit }
    }

    /// Returns the configured retry cap.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the wrapped backoff.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: Backoff> Backoff for Bounded<B> {
    type Cursor = BoundedCursor<B::Cursor>;

    fn cursor(&self) -> Self::Cursor {
        BoundedCursor {
            inner: self.inner.cursor(),
            remaining: self.limit,
        }
    }
}

/// Cursor for [`Bounded`].
#[derive(Clone, Debug)]
pub struct BoundedCursor<C> {
    inner: C,
    remaining: usize,
}

impl<C> Iterator for BoundedCursor<C>
where
    C: Iterator<Item = Duration>,
{
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        match self.inner.next() {
            Some(v) => {
                self.remaining -= 1;
                Some(v)
            }
            None => {
                self.remaining = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lo, hi) = self.inner.size_hint();
        let hi = hi.map_or(self.remaining, |h| h.min(self.remaining));
        (lo.min(self.remaining), Some(hi))
    }
}

impl<C> FusedIterator for BoundedCursor<C> where C: Iterator<Item = Duration> {}
