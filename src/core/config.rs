//! # Declarative backoff configuration.
//!
//! Provides [`BackoffConfig`], plain settings that build a ready-to-use
//! [`BoxBackoff`] without naming the concrete generator and modifier types.
//! Useful when the policy is chosen at runtime (settings file, CLI flags).
//!
//! ## Sentinel values
//! - `max_retries = None` → unbounded (stop only on success, terminal error, or context)
//! - `jitter = 0s` → no jitter
//!
//! ## Build order
//! ```text
//! generator(kind, base) ──► Jitter(jitter, seed) ──► MaxRetries(max_retries)
//! ```
//! The retry bound is the outermost wrapper, so it counts jittered delays.

use std::time::Duration;

use crate::policies::{
    Backoff, BackoffExt, BoxBackoff, Constant, Exponential, ExponentialRate, Fibonacci,
    JitterSource, Linear, LinearRate, Modifier,
};

/// Growth law of the delay sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum BackoffKind {
    /// `d, d, d, ...`
    #[default]
    Constant,
    /// `d, 2d, 3d, ...`
    Linear,
    /// `d, d + rate, d + 2·rate, ...`
    LinearRate {
        /// Added on every step.
        rate: Duration,
    },
    /// `d, 2d, 4d, ...`
    Exponential,
    /// `v(k+1) = v(k) + v(k) × rate`
    ExponentialRate {
        /// Relative growth per step.
        rate: f64,
    },
    /// `d, 2d, 3d, 5d, ...`
    Fibonacci,
}

impl BackoffKind {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BackoffKind::Constant => "constant",
            BackoffKind::Linear => "linear",
            BackoffKind::LinearRate { .. } => "linear_rate",
            BackoffKind::Exponential => "exponential",
            BackoffKind::ExponentialRate { .. } => "exponential_rate",
            BackoffKind::Fibonacci => "fibonacci",
        }
    }
}

/// Settings for building a backoff policy.
///
/// ## Field semantics
/// - `kind`: growth law of the delays
/// - `base`: first delay (and step for `Linear`)
/// - `max_retries`: retry cap (`None` = unbounded, `Some(0)` = never retry)
/// - `jitter`: maximum random shift in either direction (`0s` = none)
/// - `seed`: fixed jitter seed (`None` = seeded from entropy per cursor)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use reattempt::{Backoff, BackoffConfig, BackoffKind};
///
/// let cfg = BackoffConfig {
///     kind: BackoffKind::Fibonacci,
///     base: Duration::from_millis(10),
///     max_retries: Some(4),
///     ..BackoffConfig::default()
/// };
/// let delays: Vec<_> = cfg.build().cursor().collect();
/// assert_eq!(delays, [10, 20, 30, 50].map(Duration::from_millis));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BackoffConfig {
    /// Growth law.
    pub kind: BackoffKind,
    /// First delay.
    pub base: Duration,
    /// Maximum number of retries after the first attempt.
    ///
    /// - `None` = unbounded
    /// - `Some(n)` = at most `n` retries (`n + 1` invocations in total)
    pub max_retries: Option<usize>,
    /// Jitter spread.
    ///
    /// - `Duration::ZERO` = no jitter
    /// - `> 0` = each delay moves by up to `±jitter`, clamped at zero
    pub jitter: Duration,
    /// Deterministic jitter seed.
    pub seed: Option<u64>,
}

impl BackoffConfig {
    /// Returns the jitter spread as an `Option`.
    ///
    /// - `None` → no jitter
    /// - `Some(d)` → jitter of `±d`
    #[inline]
    pub fn jitter_spread(&self) -> Option<Duration> {
        if self.jitter == Duration::ZERO {
            None
        } else {
            Some(self.jitter)
        }
    }

    /// Returns where jitter cursors take their seed from.
    #[inline]
    pub fn jitter_source(&self) -> JitterSource {
        match self.seed {
            Some(seed) => JitterSource::Seeded(seed),
            None => JitterSource::Entropy,
        }
    }

    /// Returns the modifiers described by this config, innermost first.
    pub fn modifiers(&self) -> Vec<Modifier> {
        let mut out = Vec::with_capacity(2);
        if let Some(spread) = self.jitter_spread() {
            out.push(Modifier::jitter_with(spread, self.jitter_source()));
        }
        if let Some(n) = self.max_retries {
            out.push(Modifier::max_retries(n));
        }
        out
    }

    /// Builds the configured policy.
    pub fn build(&self) -> BoxBackoff {
        let modifiers = self.modifiers();
        let base = self.base;
        match self.kind {
            BackoffKind::Constant => with(Constant::new(base), modifiers),
            BackoffKind::Linear => with(Linear::new(base), modifiers),
            BackoffKind::LinearRate { rate } => with(LinearRate::new(base, rate), modifiers),
            BackoffKind::Exponential => with(Exponential::new(base), modifiers),
            BackoffKind::ExponentialRate { rate } => {
                with(ExponentialRate::new(base, rate), modifiers)
            }
            BackoffKind::Fibonacci => with(Fibonacci::new(base), modifiers),
        }
    }
}

fn with<B: Backoff + 'static>(backoff: B, modifiers: Vec<Modifier>) -> BoxBackoff {
    backoff.modify(modifiers)
}

impl Default for BackoffConfig {
    /// Default configuration:
    ///
    /// - `kind = Constant`
    /// - `base = 100ms`
    /// - `max_retries = Some(3)`
    /// - `jitter = 0s` (no jitter)
    /// - `seed = None`
    fn default() -> Self {
        Self {
            kind: BackoffKind::default(),
            base: Duration::from_millis(100),
            max_retries: Some(3),
            jitter: Duration::ZERO,
            seed: None,
        }
    }
}
