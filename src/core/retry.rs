//! # Retry executor.
//!
//! [`Retry`] re-invokes one [`Operation`] according to a [`Backoff`] policy
//! under a caller-supplied [`Context`].
//!
//! ## Lifecycle
//! ```text
//! Retry::run(ctx, input)
//!
//! loop {
//!   ├─► attempt += 1
//!   ├─► op.invoke(ctx, input) (no delay before the first call)
//!   │       │
//!   │       ├─ Ok           ──► Success, return Ok(output)
//!   │       ├─ Err(terminal) ─► NonRetryable, return the error as-is
//!   │       └─ Err(retryable):
//!   │            ├─ cursor = backoff.cursor()   (first retryable failure only)
//!   │            ├─ cursor.next() == None ──► Exhausted, return the error as-is
//!   │            └─ select! {
//!   │                 ctx.done()    ──► Cancelled, return RetryError::Context
//!   │                 timer(delay)  ──► continue
//!   │               }
//! }
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** (never concurrent within one call)
//! - The cursor is **owned by one call**; the policy itself is shared
//! - Cancellation is observed at **every wait** and wins ties with the timer
//! - One timer per call, allocated on the first wait and `reset` afterwards;
//!   dropped on every exit path

use std::error::Error as StdError;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use tokio::select;
use tokio::time::{self, Instant, Sleep};
use tracing::{debug, trace};

use crate::{
    core::Context,
    error::{RetryError, is_retryable},
    operations::Operation,
    policies::{Backoff, BackoffExt, BoxBackoff, Modifier},
};

/// Terminal state of one retried call (used for log labels).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Success,
    NonRetryable,
    Exhausted,
    Cancelled,
}

impl Outcome {
    fn as_label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::NonRetryable => "non_retryable",
            Outcome::Exhausted => "retries_exhausted",
            Outcome::Cancelled => "cancelled",
        }
    }
}

/// Operation with retry behavior attached.
///
/// `Retry` is itself an [`Operation`], so a retried call can be passed
/// anywhere an operation is expected. It holds no per-call state and can be
/// shared across tasks (`Arc<Retry<..>>`).
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use reattempt::{BackoffExt, Context, Exponential, Retry, Retryable};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let flaky = |_ctx: Context, n: u32| async move {
///         if n > 2 { Err(Retryable) } else { Ok(n) }
///     };
///     let retry = Retry::new(flaky, Exponential::new(Duration::from_millis(1)).max_retries(3));
///
///     assert_eq!(retry.run(&Context::background(), 1).await.ok(), Some(1));
///     assert!(retry.run(&Context::background(), 3).await.is_err());
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Retry<Op, B> {
    op: Op,
    backoff: B,
}

impl<Op, B> Retry<Op, B> {
    /// Attaches `backoff` to `op`.
    pub fn new(op: Op, backoff: B) -> Self {
        Self { op, backoff }
    }

    /// Returns the policy used by every call.
    pub fn backoff(&self) -> &B {
        &self.backoff
    }

    /// Returns the wrapped operation.
    pub fn operation(&self) -> &Op {
        &self.op
    }
}

impl<Op, B: Backoff> Retry<Op, B> {
    /// Runs the operation until it succeeds, fails terminally, runs out of
    /// delays, or `ctx` is done while waiting.
    ///
    /// ### Returns
    /// - `Ok(output)` from the first successful invocation;
    /// - `Err(RetryError::Operation(e))` with the operation's own error when it
    ///   is not retryable, or when it was retryable but the cursor is exhausted;
    /// - `Err(RetryError::Context(reason))` when `ctx` is done during a wait.
    pub async fn run<I>(
        &self,
        ctx: &Context,
        input: I,
    ) -> Result<Op::Output, RetryError<Op::Error>>
    where
        I: Clone + Send + 'static,
        Op: Operation<I>,
        Op::Error: StdError + 'static,
    {
        let done = ctx.done();
        tokio::pin!(done);

        let mut cursor: Option<B::Cursor> = None;
        let mut timer: Option<Pin<Box<Sleep>>> = None;
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            trace!(attempt, "invoking operation");

            let delay = match self.op.invoke(ctx.clone(), input.clone()).await {
                Ok(output) => {
                    finish(Outcome::Success, attempt);
                    return Ok(output);
                }
                Err(err) if !is_retryable(&err) => {
                    finish(Outcome::NonRetryable, attempt);
                    return Err(RetryError::Operation(err));
                }
                Err(err) => match cursor.get_or_insert_with(|| self.backoff.cursor()).next() {
                    Some(delay) => delay,
                    None => {
                        finish(Outcome::Exhausted, attempt);
                        return Err(RetryError::Operation(err));
                    }
                },
            };
            debug!(attempt, ?delay, "retry scheduled");

            if let Some(timer) = timer.as_mut() {
                timer.as_mut().reset(deadline_after(delay));
            }
            let sleep = timer.get_or_insert_with(|| Box::pin(time::sleep(delay)));

            select! {
                biased;
                reason = &mut done => {
                    debug!(
                        attempt,
                        outcome = Outcome::Cancelled.as_label(),
                        reason = reason.as_label(),
                        "retry aborted"
                    );
                    return Err(RetryError::Context(reason));
                }
                _ = sleep.as_mut() => {}
            }
        }
    }
}

/// Instant `delay` from now; delays past the clock's range wait ~30 years.
fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay)
        .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365 * 30))
}

fn finish(outcome: Outcome, attempts: u64) {
    debug!(attempts, outcome = outcome.as_label(), "retry finished");
}

#[async_trait]
impl<I, Op, B> Operation<I> for Retry<Op, B>
where
    I: Clone + Send + 'static,
    Op: Operation<I>,
    Op::Error: StdError + 'static,
    B: Backoff,
{
    type Output = Op::Output;
    type Error = RetryError<Op::Error>;

    async fn invoke(&self, ctx: Context, input: I) -> Result<Self::Output, Self::Error> {
        self.run(&ctx, input).await
    }
}

/// Attaches `backoff`, wrapped by `modifiers` in order, to `op`.
///
/// The last modifier is the outermost wrapper. With no modifiers the policy
/// is used as-is (generators alone never run out, so bound them or rely on
/// the context deadline).
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use reattempt::{Context, Linear, Modifier, RetryError, Retryable, tryable};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let always_busy = |_ctx: Context, _: ()| async { Err::<(), _>(Retryable) };
///     let retry = tryable(
///         always_busy,
///         Linear::new(Duration::from_millis(2)),
///         [Modifier::jitter(Duration::from_millis(1)), Modifier::max_retries(3)],
///     );
///
///     let res = retry.run(&Context::background(), ()).await;
///     assert!(matches!(res, Err(RetryError::Operation(Retryable))));
/// }
/// ```
pub fn tryable<Op, B, M>(op: Op, backoff: B, modifiers: M) -> Retry<Op, BoxBackoff>
where
    B: Backoff + 'static,
    M: IntoIterator<Item = Modifier>,
{
    Retry::new(op, backoff.modify(modifiers))
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use thiserror::Error;

    use super::*;
    use crate::error::{ContextError, Retryable};
    use crate::policies::{Constant, Exponential, JitterSource, Linear};

    #[derive(Error, Debug, PartialEq)]
    enum AppError {
        #[error("busy")]
        Busy(#[source] Retryable),
        #[error("bad input")]
        BadInput,
    }

    /// Records the instant of every invocation and fails with `err` until `ok_on`.
    #[derive(Clone)]
    struct Probe {
        calls: Arc<Mutex<Vec<Instant>>>,
        ok_on: usize,
        err: fn() -> AppError,
    }

    impl Probe {
        fn failing(err: fn() -> AppError) -> Self {
            Self::succeeding_on(usize::MAX, err)
        }

        fn succeeding_on(ok_on: usize, err: fn() -> AppError) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                ok_on,
                err,
            }
        }

        fn count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn gaps(&self) -> Vec<Duration> {
            let calls = self.calls.lock().unwrap();
            calls.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[async_trait]
    impl Operation<u32> for Probe {
        type Output = u32;
        type Error = AppError;

        async fn invoke(&self, _ctx: Context, input: u32) -> Result<u32, AppError> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(Instant::now());
                calls.len()
            };
            if n >= self.ok_on {
                Ok(input)
            } else {
                Err((self.err)())
            }
        }
    }

    fn busy() -> AppError {
        AppError::Busy(Retryable)
    }

    fn bad_input() -> AppError {
        AppError::BadInput
    }

    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(10),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_constant_bounded_exhausts_after_all_retries() {
        let probe = Probe::failing(busy);
        let retry = Retry::new(
            probe.clone(),
            Constant::new(Duration::from_secs(1)).max_retries(3),
        );

        let start = Instant::now();
        let res = retry.run(&Context::background(), 7).await;

        assert_eq!(probe.count(), 4);
        assert!(matches!(res, Err(RetryError::Operation(AppError::Busy(_)))));
        assert_close(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_linear_delays_in_order() {
        let probe = Probe::failing(busy);
        let retry = Retry::new(
            probe.clone(),
            Linear::new(Duration::from_secs(1)).max_retries(3),
        );

        let _ = retry.run(&Context::background(), 0).await;

        let gaps = probe.gaps();
        assert_eq!(gaps.len(), 3);
        for (gap, secs) in gaps.into_iter().zip([1, 2, 3]) {
            assert_close(gap, Duration::from_secs(secs));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_delays_in_order() {
        let probe = Probe::failing(busy);
        let retry = Retry::new(
            probe.clone(),
            Exponential::new(Duration::from_secs(1)).max_retries(3),
        );

        let _ = retry.run(&Context::background(), 0).await;

        let gaps = probe.gaps();
        assert_eq!(gaps.len(), 3);
        for (gap, secs) in gaps.into_iter().zip([1, 2, 4]) {
            assert_close(gap, Duration::from_secs(secs));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_second_invocation() {
        let probe = Probe::succeeding_on(2, busy);
        let retry = Retry::new(
            probe.clone(),
            Constant::new(Duration::from_millis(100)).max_retries(3),
        );

        let res = retry.run(&Context::background(), 11).await;

        assert_eq!(res.ok(), Some(11));
        assert_eq!(probe.count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_never_spawns_delay() {
        let probe = Probe::succeeding_on(1, busy);
        let retry = Retry::new(probe.clone(), Constant::new(Duration::from_secs(60)));

        let start = Instant::now();
        assert_eq!(retry.run(&Context::background(), 5).await.ok(), Some(5));
        assert_eq!(probe.count(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_returns_after_one_call() {
        let probe = Probe::failing(bad_input);
        let retry = Retry::new(
            probe.clone(),
            Constant::new(Duration::from_secs(1)).max_retries(3),
        );

        let res = retry.run(&Context::background(), 0).await;

        assert_eq!(probe.count(), 1);
        assert!(matches!(res, Err(RetryError::Operation(AppError::BadInput))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_returns_first_error() {
        let probe = Probe::failing(busy);
        let retry = Retry::new(probe.clone(), Constant::new(Duration::from_secs(1)).max_retries(0));

        let res = retry.run(&Context::background(), 0).await;

        assert_eq!(probe.count(), 1);
        assert_eq!(res.unwrap_err().into_operation(), Some(AppError::Busy(Retryable)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_overrides_application_error() {
        let probe = Probe::failing(busy);
        let retry = Retry::new(
            probe.clone(),
            Constant::new(Duration::from_secs(1)).max_retries(10),
        );
        let ctx = Context::background().with_timeout(Duration::from_millis(2500));

        let start = Instant::now();
        let res = retry.run(&ctx, 0).await;

        assert_eq!(
            res.unwrap_err().context(),
            Some(ContextError::DeadlineExceeded)
        );
        assert_eq!(probe.count(), 3);
        assert_close(start.elapsed(), Duration::from_millis(2500));

        // Nothing keeps running after the call returned.
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(probe.count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait() {
        let probe = Probe::failing(busy);
        let retry = Arc::new(Retry::new(probe.clone(), Constant::new(Duration::from_secs(5))));
        let ctx = Context::background();

        let handle = {
            let retry = Arc::clone(&retry);
            let ctx = ctx.clone();
            tokio::spawn(async move { retry.run(&ctx, 0).await })
        };

        time::sleep(Duration::from_secs(7)).await;
        ctx.cancel();
        let res = handle.await.unwrap();

        assert_eq!(res.unwrap_err().context(), Some(ContextError::Canceled));
        assert_eq!(probe.count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_context_still_invokes_once() {
        let probe = Probe::failing(busy);
        let retry = Retry::new(probe.clone(), Constant::new(Duration::from_secs(1)));
        let ctx = Context::background();
        ctx.cancel();

        let res = retry.run(&ctx, 0).await;

        assert_eq!(probe.count(), 1);
        assert_eq!(res.unwrap_err().context(), Some(ContextError::Canceled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_is_reused_across_calls() {
        let probe = Probe::failing(busy);
        let retry = Retry::new(
            probe.clone(),
            Exponential::new(Duration::from_millis(10)).max_retries(2),
        );

        let _ = retry.run(&Context::background(), 0).await;
        let _ = retry.run(&Context::background(), 0).await;

        // Each call spawns a fresh cursor: 3 invocations per call.
        assert_eq!(probe.count(), 6);
        let gaps = probe.gaps();
        assert_close(gaps[0], Duration::from_millis(10));
        assert_close(gaps[1], Duration::from_millis(20));
        assert_close(gaps[3], Duration::from_millis(10));
        assert_close(gaps[4], Duration::from_millis(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_share_one_policy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let op = {
            let calls = Arc::clone(&calls);
            move |_ctx: Context, _: ()| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(Retryable) }
            }
        };
        let retry = Arc::new(Retry::new(
            op,
            Constant::new(Duration::from_millis(50)).max_retries(4),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let retry = Arc::clone(&retry);
                tokio::spawn(async move { retry.run(&Context::background(), ()).await })
            })
            .collect();
        for h in handles {
            assert!(h.await.unwrap().is_err());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 8 * 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tryable_applies_modifiers() {
        let probe = Probe::failing(busy);
        let retry = tryable(
            probe.clone(),
            Constant::new(Duration::from_millis(100)),
            [
                Modifier::jitter_with(Duration::from_millis(20), JitterSource::Seeded(3)),
                Modifier::max_retries(5),
            ],
        );

        let _ = retry.run(&Context::background(), 0).await;

        assert_eq!(probe.count(), 6);
        for gap in probe.gaps() {
            assert!(gap >= Duration::from_millis(80), "{gap:?}");
            assert!(gap < Duration::from_millis(130), "{gap:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_is_an_operation() {
        let probe = Probe::succeeding_on(3, busy);
        let inner = Retry::new(
            probe.clone(),
            Constant::new(Duration::from_millis(1)).max_retries(5),
        );

        let res = inner.invoke(Context::background(), 9).await;

        assert_eq!(res.ok(), Some(9));
        assert_eq!(probe.count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_retry_retries_exhausted_inner_call() {
        let probe = Probe::failing(busy);
        let inner = Retry::new(
            probe.clone(),
            Constant::new(Duration::from_millis(1)).max_retries(1),
        );
        let outer = Retry::new(inner, Constant::new(Duration::from_millis(1)).max_retries(2));

        let res = outer.run(&Context::background(), 0).await;

        // 3 outer attempts, each running the inner call twice.
        assert_eq!(probe.count(), 6);
        assert!(matches!(
            res,
            Err(RetryError::Operation(RetryError::Operation(AppError::Busy(_))))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_retry_stops_on_terminal_inner_error() {
        let probe = Probe::failing(bad_input);
        let inner = Retry::new(
            probe.clone(),
            Constant::new(Duration::from_millis(1)).max_retries(3),
        );
        let outer = Retry::new(inner, Constant::new(Duration::from_millis(1)).max_retries(3));

        let res = outer.run(&Context::background(), 0).await;

        assert_eq!(probe.count(), 1);
        assert!(matches!(
            res,
            Err(RetryError::Operation(RetryError::Operation(AppError::BadInput)))
        ));
    }
}
