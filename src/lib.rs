//! # reattempt
//!
//! **reattempt** re-executes a fallible async operation according to a
//! pluggable backoff policy until it succeeds, runs out of retries, or the
//! caller's context is cancelled or past its deadline.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Constant   │   │    Linear    │   │  Fibonacci   │   ... generators
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────────────┼──────────────────┘
//!                               ▼
//!                 ┌───────────────────────────┐
//!                 │  Modifiers (optional)     │
//!                 │  - Jitter(±spread)        │
//!                 │  - MaxRetries(n)          │
//!                 └─────────────┬─────────────┘
//!                               ▼  Backoff (immutable, shareable)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Retry<Op, B> (executor)                                          │
//! │  - invokes Operation                                              │
//! │  - spawns a fresh cursor per call (first retryable failure)       │
//! │  - races each delay against Context::done()                       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Retry::run(ctx, input)
//!
//! loop {
//!   ├─► op.invoke(ctx, input)
//!   │       ├─ Ok                 ─► return Ok
//!   │       ├─ Err (not Retryable) ─► return Err(Operation(e))
//!   │       └─ Err (Retryable)    ─► cursor.next()
//!   │                                 ├─ None     ─► return Err(Operation(e))
//!   │                                 └─ Some(d)  ─► wait d or ctx.done()
//!   │                                                 ├─ elapsed ─► continue
//!   │                                                 └─ done    ─► return Err(Context(reason))
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Policies**      | Restartable delay sequences and their growth laws.           | [`Backoff`], [`Exponential`], [`Fibonacci`]|
//! | **Modifiers**     | Bound retries, randomize delays, compose freely.             | [`BackoffExt`], [`Modifier`], [`Jitter`]   |
//! | **Executor**      | Retry loop with cancellation and deadlines.                  | [`Retry`], [`tryable`], [`Context`]        |
//! | **Operations**    | Any async closure or custom type.                            | [`Operation`]                              |
//! | **Errors**        | Retryable marker and typed results.                          | [`Retryable`], [`RetryError`]              |
//! | **Configuration** | Build a policy from plain settings.                          | [`BackoffConfig`]                          |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use reattempt::{BackoffExt, Context, Linear, Retry, RetryError, Retryable};
//!
//! #[derive(Debug, thiserror::Error)]
//! enum FetchError {
//!     #[error("service unavailable")]
//!     Unavailable(#[source] Retryable),
//!     #[error("not found")]
//!     NotFound,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let fetch = |_ctx: Context, id: u32| async move {
//!         match id {
//!             0 => Ok("root"),
//!             1 => Err(FetchError::Unavailable(Retryable)),
//!             _ => Err(FetchError::NotFound),
//!         }
//!     };
//!
//!     // 1ms, 2ms, 3ms between attempts, each moved by up to ±1ms.
//!     let policy = Linear::new(Duration::from_millis(1))
//!         .jitter(Duration::from_millis(1))
//!         .max_retries(3);
//!     let fetch = Retry::new(fetch, policy);
//!
//!     let ctx = Context::background().with_timeout(Duration::from_secs(1));
//!     assert_eq!(fetch.run(&ctx, 0).await.ok(), Some("root"));
//!     assert!(matches!(
//!         fetch.run(&ctx, 1).await,
//!         Err(RetryError::Operation(FetchError::Unavailable(_)))
//!     ));
//!     assert!(matches!(
//!         fetch.run(&ctx, 2).await,
//!         Err(RetryError::Operation(FetchError::NotFound))
//!     ));
//! }
//! ```
mod core;
mod error;
mod operations;
mod policies;

// ---- Public re-exports ----

pub use crate::core::{BackoffConfig, BackoffKind, Context, Retry, tryable};
pub use error::{ContextError, RetryError, Retryable, is_retryable};
pub use operations::Operation;
pub use policies::{
    Backoff, BackoffExt, BoxBackoff, BoxCursor, Bounded, BoundedCursor, Constant, Exponential,
    ExponentialCursor, ExponentialRate, ExponentialRateCursor, Fibonacci, FibonacciCursor, Jitter,
    JitterCursor, JitterSource, Linear, LinearCursor, LinearRate, Modifier,
};
