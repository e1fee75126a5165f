//! # Runtime modifier lists.
//!
//! [`Modifier`] is the value form of the builder methods on
//! [`BackoffExt`](crate::BackoffExt). A list of modifiers can be assembled at
//! runtime (from configuration, for example) and applied to any backoff:
//!
//! ```text
//! [MaxRetries(5), Jitter(2ms)]  applied to Exponential(10ms)
//!   └─► Jitter<Bounded<Exponential>>
//! ```
//!
//! Modifiers are applied left to right, so the last one is the outermost
//! wrapper and decides the cursor the executor actually pulls from.

use std::time::Duration;

use crate::policies::backoff::{Backoff, BackoffExt, BoxBackoff};
use crate::policies::jitter::JitterSource;

/// A transform from one backoff into another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modifier {
    /// Cap every cursor at this many delays.
    MaxRetries(usize),
    /// Move every delay by up to `±spread`.
    Jitter {
        /// Maximum perturbation in either direction.
        spread: Duration,
        /// Seed source for the per-cursor generator.
        source: JitterSource,
    },
}

impl Modifier {
    /// Shorthand for [`Modifier::MaxRetries`].
    pub fn max_retries(n: usize) -> Self {
        Modifier::MaxRetries(n)
    }

    /// Shorthand for [`Modifier::Jitter`] seeded from entropy.
    pub fn jitter(spread: Duration) -> Self {
        Modifier::Jitter {
            spread,
            source: JitterSource::Entropy,
        }
    }

    /// Shorthand for [`Modifier::Jitter`] with an explicit seed source.
    pub fn jitter_with(spread: Duration, source: JitterSource) -> Self {
        Modifier::Jitter { spread, source }
    }

    /// Wraps `backoff` with this modifier.
    pub fn apply<B>(self, backoff: B) -> BoxBackoff
    where
        B: Backoff + 'static,
    {
        match self {
            Modifier::MaxRetries(n) => backoff.max_retries(n).boxed(),
            Modifier::Jitter { spread, source } => backoff.jitter_with(spread, source).boxed(),
        }
    }
}
