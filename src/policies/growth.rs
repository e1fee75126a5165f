//! # Delay generators.
//!
//! Each generator is an immutable [`Backoff`] built from a base delay `d`
//! (plus a growth rate for the `*Rate` variants). All sequences are infinite;
//! bound them with [`BackoffExt::max_retries`](crate::BackoffExt::max_retries).
//!
//! | Generator           | first | next                         |
//! |---------------------|-------|------------------------------|
//! | [`Constant`]        | `d`   | `d`                          |
//! | [`Linear`]          | `d`   | `prev + d`                   |
//! | [`LinearRate`]      | `d`   | `prev + rate`                |
//! | [`Exponential`]     | `d`   | `prev * 2`                   |
//! | [`ExponentialRate`] | `d`   | `prev + prev * rate`         |
//! | [`Fibonacci`]       | `d`   | `d, 2d, 3d, 5d, 8d, ...`     |
//!
//! Arithmetic saturates at [`Duration::MAX`] and never goes below zero.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use reattempt::{Backoff, Fibonacci};
//!
//! let fib = Fibonacci::new(Duration::from_millis(10));
//! let delays: Vec<_> = fib.cursor().take(5).collect();
//! assert_eq!(delays, [10, 20, 30, 50, 80].map(Duration::from_millis));
//! ```

use std::iter::{self, Repeat};
use std::time::Duration;

use crate::policies::backoff::Backoff;

/// Same delay every time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constant {
    delay: Duration,
}

impl Constant {
    /// Creates a constant backoff yielding `delay` forever.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Backoff for Constant {
    type Cursor = Repeat<Duration>;

    fn cursor(&self) -> Self::Cursor {
        iter::repeat(self.delay)
    }
}

/// Delay grows by the base delay on every step: `d, 2d, 3d, ...`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Linear {
    base: Duration,
}

impl Linear {
    /// Creates a linear backoff with step equal to `base`.
    pub fn new(base: Duration) -> Self {
        Self { base }
    }
}

impl Backoff for Linear {
    type Cursor = LinearCursor;

    fn cursor(&self) -> Self::Cursor {
        LinearCursor {
            next: self.base,
            step: self.base,
        }
    }
}

/// Delay starts at `base` and grows by `rate` on every step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearRate {
    base: Duration,
    rate: Duration,
}

impl LinearRate {
    /// Creates a linear backoff: `base, base + rate, base + 2·rate, ...`.
    pub fn new(base: Duration, rate: Duration) -> Self {
        Self { base, rate }
    }
}

impl Backoff for LinearRate {
    type Cursor = LinearCursor;

    fn cursor(&self) -> Self::Cursor {
        LinearCursor {
            next: self.base,
            step: self.rate,
        }
    }
}

/// Cursor shared by [`Linear`] and [`LinearRate`].
#[derive(Clone, Debug)]
pub struct LinearCursor {
    next: Duration,
    step: Duration,
}

impl Iterator for LinearCursor {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let v = self.next;
        self.next = v.saturating_add(self.step);
        Some(v)
    }
}

/// Delay doubles on every step: `d, 2d, 4d, ...`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exponential {
    base: Duration,
}

impl Exponential {
    /// Creates a doubling backoff starting at `base`.
    pub fn new(base: Duration) -> Self {
        Self { base }
    }
}

impl Backoff for Exponential {
    type Cursor = ExponentialCursor;

    fn cursor(&self) -> Self::Cursor {
        ExponentialCursor { next: self.base }
    }
}

/// Cursor for [`Exponential`].
#[derive(Clone, Debug)]
pub struct ExponentialCursor {
    next: Duration,
}

impl Iterator for ExponentialCursor {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let v = self.next;
        self.next = v.saturating_add(v);
        Some(v)
    }
}

/// Delay grows by a fraction of itself on every step: `v += v × rate`.
///
/// `rate = 1.0` behaves like [`Exponential`]; `rate = 0.5` grows by half.
/// A negative `rate` shrinks the delay; values that would drop below zero
/// (or turn non-finite) are reported as zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExponentialRate {
    base: Duration,
    rate: f64,
}

impl ExponentialRate {
    /// Creates a backoff starting at `base` and growing by `rate` per step.
    pub fn new(base: Duration, rate: f64) -> Self {
        Self { base, rate }
    }
}

impl Backoff for ExponentialRate {
    type Cursor = ExponentialRateCursor;

    fn cursor(&self) -> Self::Cursor {
        ExponentialRateCursor {
            first: Some(self.base),
            nanos: self.base.as_nanos() as f64,
            rate: self.rate,
        }
    }
}

/// Cursor for [`ExponentialRate`]; keeps the running value in nanoseconds.
///
/// The first value is `base` itself, so float rounding never touches it.
#[derive(Clone, Debug)]
pub struct ExponentialRateCursor {
    first: Option<Duration>,
    nanos: f64,
    rate: f64,
}

impl Iterator for ExponentialRateCursor {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let v = self.nanos;
        // `max` also maps NaN to zero; a zero value then stays zero.
        self.nanos = (v + v * self.rate).max(0.0);
        Some(self.first.take().unwrap_or_else(|| nanos_to_duration(v)))
    }
}

/// Float nanoseconds to `Duration`: truncates, saturates at [`Duration::MAX`].
fn nanos_to_duration(nanos: f64) -> Duration {
    if nanos < u64::MAX as f64 {
        return Duration::from_nanos(nanos as u64);
    }
    Duration::try_from_secs_f64(nanos / 1e9).unwrap_or(Duration::MAX)
}

/// Delay follows the Fibonacci numbers scaled by `d`: `d, 2d, 3d, 5d, ...`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fibonacci {
    base: Duration,
}

impl Fibonacci {
    /// Creates a Fibonacci backoff seeded with `(0, base)`.
    pub fn new(base: Duration) -> Self {
        Self { base }
    }
}

impl Backoff for Fibonacci {
    type Cursor = FibonacciCursor;

    fn cursor(&self) -> Self::Cursor {
        FibonacciCursor {
            prev: Duration::ZERO,
            curr: self.base,
        }
    }
}

/// Cursor for [`Fibonacci`].
#[derive(Clone, Debug)]
pub struct FibonacciCursor {
    prev: Duration,
    curr: Duration,
}

impl Iterator for FibonacciCursor {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let next = self.prev.saturating_add(self.curr);
        self.prev = self.curr;
        self.curr = next;
        Some(next)
    }
}
