//! # Operation abstraction.
//!
//! An [`Operation`] is the fallible unit the executor re-invokes: it receives
//! a [`Context`] plus an input value and returns a `Result`. The executor
//! treats it as opaque; it only inspects the error for the
//! [`Retryable`](crate::Retryable) marker.
//!
//! Any closure `Fn(Context, I) -> impl Future<Output = Result<O, E>>` is an
//! operation. Each call creates a **new** future, so there is no hidden state
//! between attempts; share state explicitly with `Arc<...>` inside the closure.

use std::future::Future;

use async_trait::async_trait;

use crate::core::Context;

/// # Asynchronous, cancelable, fallible call.
///
/// Implementations should watch `ctx` (for example `ctx.token().cancelled()`)
/// and return promptly once it is done.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use reattempt::{Context, Operation, Retryable};
///
/// struct Ping;
///
/// #[async_trait]
/// impl Operation<u16> for Ping {
///     type Output = String;
///     type Error = Retryable;
///
///     async fn invoke(&self, ctx: Context, port: u16) -> Result<String, Retryable> {
///         if ctx.is_done() {
///             return Err(Retryable);
///         }
///         Ok(format!("pong from :{port}"))
///     }
/// }
/// ```
#[async_trait]
pub trait Operation<I: Send + 'static>: Send + Sync {
    /// Value produced on success.
    type Output: Send;
    /// Error produced on failure.
    type Error: Send;

    /// Runs the operation once.
    async fn invoke(&self, ctx: Context, input: I) -> Result<Self::Output, Self::Error>;
}

#[async_trait]
impl<I, O, E, F, Fut> Operation<I> for F
where
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
    F: Fn(Context, I) -> Fut + Send + Sync, // Fn, not FnMut
    Fut: Future<Output = Result<O, E>> + Send + 'static,
{
    type Output = O;
    type Error = E;

    async fn invoke(&self, ctx: Context, input: I) -> Result<O, E> {
        (self)(ctx, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Retryable;

    async fn invoke<Op: Operation<u32>>(op: &Op, v: u32) -> Result<Op::Output, Op::Error> {
        op.invoke(Context::background(), v).await
    }

    #[tokio::test]
    async fn test_closure_is_operation() {
        let double = |_ctx: Context, v: u32| async move { Ok::<_, Retryable>(v * 2) };
        assert_eq!(invoke(&double, 21).await, Ok(42));
    }

    #[tokio::test]
    async fn test_closure_sees_context() {
        let op = |ctx: Context, _: u32| async move {
            if ctx.is_done() { Err(Retryable) } else { Ok(()) }
        };
        let ctx = Context::background();
        ctx.cancel();
        assert_eq!(op.invoke(ctx, 0).await, Err(Retryable));
    }
}
