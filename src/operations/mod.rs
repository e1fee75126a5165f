//! # Operation abstraction.
//!
//! - [`Operation`] - trait for the async, cancelable call the executor retries
//!   (implemented for every `Fn(Context, I) -> Future<Output = Result<O, E>>`)

mod operation;

pub use operation::Operation;
