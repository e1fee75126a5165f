//! # Jitter for retry delays.
//!
//! [`Jitter`] adds randomness to backoff delays to prevent thundering herd effects
//! when many callers retry at the same moment.
//!
//! Each delay `v` becomes `max(0, v + random[-spread, +spread])`, drawn
//! independently per value. Exhaustion of the inner sequence is passed through.
//!
//! Randomness is owned by the cursor: every [`Backoff::cursor`] call seeds a
//! fresh [`StdRng`] from its [`JitterSource`], so concurrent executions never
//! share generator state.
//! - [`JitterSource::Entropy`] seeds from the thread-local RNG (default).
//! - [`JitterSource::Seeded`] seeds deterministically; every cursor replays
//!   the same perturbations, which keeps tests reproducible.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::policies::backoff::Backoff;

/// Where a jitter cursor gets its random seed from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterSource {
    /// Fresh seed per cursor, drawn from the thread-local RNG.
    #[default]
    Entropy,
    /// Fixed seed; all cursors produce the same perturbations.
    Seeded(u64),
}

impl JitterSource {
    /// Builds the generator owned by one cursor.
    fn rng(&self) -> StdRng {
        match self {
            JitterSource::Entropy => StdRng::from_rng(&mut rand::rng()),
            JitterSource::Seeded(seed) => StdRng::seed_from_u64(*seed),
        }
    }
}

/// Backoff whose delays are randomly moved by up to `±spread`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Jitter<B> {
    inner: B,
    spread: Duration,
    source: JitterSource,
}

impl<B> Jitter<B> {
    /// Wraps `inner`, perturbing every delay by up to `±spread`.
    pub fn new(inner: B, spread: Duration, source: JitterSource) -> Self {
        Self {
            inner,
            spread,
            source,
        }
    }

    /// Returns the maximum perturbation.
    pub fn spread(&self) -> Duration {
        self.spread
    }
}

impl<B: Backoff> Backoff for Jitter<B> {
    type Cursor = JitterCursor<B::Cursor>;

    fn cursor(&self) -> Self::Cursor {
        // Spreads beyond u64::MAX ns (~584 years) are treated as that bound.
        let spread = self.spread.as_nanos().min(u64::MAX as u128) as i128;
        JitterCursor {
            inner: self.inner.cursor(),
            spread,
            rng: self.source.rng(),
        }
    }
}

/// Cursor for [`Jitter`].
#[derive(Clone, Debug)]
pub struct JitterCursor<C> {
    inner: C,
    spread: i128,
    rng: StdRng,
}

impl<C> Iterator for JitterCursor<C>
where
    C: Iterator<Item = Duration>,
{
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.inner.next()?;
        if self.spread == 0 {
            return Some(delay);
        }
        let offset = self.rng.random_range(-self.spread..=self.spread);
        Some(shift(delay, offset))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Moves `delay` by `offset_ns`, clamping at zero and saturating at the top.
fn shift(delay: Duration, offset_ns: i128) -> Duration {
    let magnitude = Duration::from_nanos(offset_ns.unsigned_abs() as u64);
    if offset_ns >= 0 {
        delay.saturating_add(magnitude)
    } else {
        delay.saturating_sub(magnitude)
    }
}
