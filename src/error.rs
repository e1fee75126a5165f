//! Error types used by the retry executor and the operations it drives.
//!
//! This module defines:
//!
//! - [`Retryable`]: the marker an operation's error carries to request a retry.
//! - [`ContextError`]: why a [`Context`](crate::Context) stopped (cancel or deadline).
//! - [`RetryError`]: what a retried call returns when it does not succeed.
//!
//! The error enums provide `as_label` and `as_message` helpers for logging.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// # Marker for errors that may succeed if the operation is invoked again.
///
/// An operation signals "try me again" by returning `Retryable` itself or any
/// error whose [`source`](StdError::source) chain contains it. Everything else
/// is terminal and is handed back to the caller after the first occurrence.
///
/// Wrap the marker with `#[source]` or `#[from]`. A thiserror
/// `#[error(transparent)]` variant forwards `source()` to the inner error's
/// own source, so a marker held directly by a transparent variant is skipped.
/// [`RetryError::Operation`] exposes the operation's error as its source, so a
/// retried call that gave up on a retryable error is itself retryable.
///
/// # Example
/// ```
/// use reattempt::{Retryable, is_retryable};
///
/// #[derive(Debug, thiserror::Error)]
/// enum FetchError {
///     #[error("upstream busy")]
///     Busy(#[source] Retryable),
///     #[error("not found")]
///     NotFound,
/// }
///
/// assert!(is_retryable(&FetchError::Busy(Retryable)));
/// assert!(!is_retryable(&FetchError::NotFound));
/// ```
#[derive(Error, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[error("retryable")]
pub struct Retryable;

/// Reports whether `err` is, or wraps, the [`Retryable`] marker.
///
/// Walks the whole `source()` chain, so the marker can sit at any depth.
pub fn is_retryable(err: &(dyn StdError + 'static)) -> bool {
    let mut cur = Some(err);
    while let Some(e) = cur {
        if e.is::<Retryable>() {
            return true;
        }
        cur = e.source();
    }
    false
}

/// # Reason a [`Context`](crate::Context) is done.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The context was cancelled explicitly (or through a parent token).
    #[error("context canceled")]
    Canceled,

    /// The context's deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl ContextError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ContextError::Canceled => "context_canceled",
            ContextError::DeadlineExceeded => "context_deadline_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ContextError::Canceled => "canceled while waiting to retry".to_string(),
            ContextError::DeadlineExceeded => "deadline passed while waiting to retry".to_string(),
        }
    }
}

/// # Errors returned by a retried call.
///
/// The operation's own error is passed through untouched, whether it was
/// terminal on the first attempt or retryable until the backoff ran out.
/// Only a cancellation observed while waiting replaces it.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// Error produced by the operation (terminal, or last retryable one).
    #[error("{0}")]
    Operation(#[source] E),

    /// The context was done while waiting for the next attempt.
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl<E> RetryError<E> {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use reattempt::{ContextError, RetryError, Retryable};
    ///
    /// let err: RetryError<Retryable> = RetryError::Context(ContextError::DeadlineExceeded);
    /// assert_eq!(err.as_label(), "context_deadline_exceeded");
    /// assert_eq!(RetryError::Operation(Retryable).as_label(), "operation_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::Operation(_) => "operation_failed",
            RetryError::Context(e) => e.as_label(),
        }
    }

    /// Borrows the operation's error, if that is what this is.
    pub fn operation(&self) -> Option<&E> {
        match self {
            RetryError::Operation(e) => Some(e),
            RetryError::Context(_) => None,
        }
    }

    /// Unwraps the operation's error, if that is what this is.
    pub fn into_operation(self) -> Option<E> {
        match self {
            RetryError::Operation(e) => Some(e),
            RetryError::Context(_) => None,
        }
    }

    /// Returns the context error when the call was cut short by cancellation.
    pub fn context(&self) -> Option<ContextError> {
        match self {
            RetryError::Operation(_) => None,
            RetryError::Context(e) => Some(*e),
        }
    }
}

impl<E: fmt::Display> RetryError<E> {
    /// Returns a human-readable message with details about the error.
    ///
    /// # Example
    /// ```
    /// use reattempt::{ContextError, RetryError, Retryable};
    ///
    /// assert_eq!(RetryError::Operation(Retryable).as_message(), "operation failed: retryable");
    /// let err: RetryError<Retryable> = ContextError::Canceled.into();
    /// assert_eq!(err.as_message(), "canceled while waiting to retry");
    /// ```
    pub fn as_message(&self) -> String {
        match self {
            RetryError::Operation(e) => format!("operation failed: {e}"),
            RetryError::Context(e) => e.as_message(),
        }
    }
}
