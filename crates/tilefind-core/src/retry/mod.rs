//! Per-file retry policy for tile downloads.
//!
//! Every failed attempt (transport error, timeout, non-2xx status, write
//! failure) is retried until the attempt cap; the policy only decides
//! whether another attempt follows and how long to wait before it.

mod error;
mod policy;

pub use error::AttemptError;
pub use policy::{RetryDecision, RetryPolicy};
