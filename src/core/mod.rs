//! Retry core: execution loop, cancellation, and configuration.
//!
//! The public API from this module is [`Retry`] / [`tryable`] (the executor),
//! [`Context`] (cancellation and deadline), and [`BackoffConfig`].
//!
//! Internal modules:
//! - [`retry`]: invokes the operation, pulls delays, races them against the context;
//! - [`context`]: cancellation token plus optional deadline;
//! - [`config`]: declarative policy settings.

mod config;
mod context;
mod retry;

pub use config::{BackoffConfig, BackoffKind};
pub use context::Context;
pub use retry::{Retry, tryable};
