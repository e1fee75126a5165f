//! Backoff policies and their modifiers.
//!
//! This module groups everything that decides **how long** to wait between
//! attempts and **how many** attempts are allowed.
//!
//! ## Contents
//! - [`Backoff`] restartable delay sequence (policy → fresh cursor per execution)
//! - [`Constant`], [`Linear`], [`LinearRate`], [`Exponential`], [`ExponentialRate`], [`Fibonacci`] generators
//! - [`Bounded`] caps the number of retries
//! - [`Jitter`] randomizes delays (owned per-cursor RNG, see [`JitterSource`])
//! - [`Modifier`] value form of the modifiers, for runtime lists
//!
//! ## Quick wiring
//! ```text
//! Exponential::new(d)            generator
//!     .jitter(spread)            modifier
//!     .max_retries(n)            modifier (outermost: decides the cursor)
//!      └─► Retry::new(op, policy) pulls one delay per retryable failure
//! ```

mod backoff;
mod bounded;
mod growth;
mod jitter;
mod modifier;

pub use backoff::{Backoff, BackoffExt, BoxBackoff, BoxCursor};
pub use bounded::{Bounded, BoundedCursor};
pub use growth::{
    Constant, Exponential, ExponentialCursor, ExponentialRate, ExponentialRateCursor, Fibonacci,
    FibonacciCursor, Linear, LinearCursor, LinearRate,
};
pub use jitter::{Jitter, JitterCursor, JitterSource};
pub use modifier::Modifier;
