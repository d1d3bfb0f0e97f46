//! # Slackwater
//!
//! > *"Slack water is the pause between tides"*
//!
//! A Rust library for bounded polling: wait for asynchronous jobs and
//! eventually consistent systems to converge, without unbounded loops or
//! silent swallowing of real failures.
//!
//! ## Philosophy
//!
//! **Slackwater** embodies the principle of **pure core, imperative shell**:
//! - **Pure core**: [`WaitPolicy`] and [`PollOutcome`] are plain data, and
//!   the decision after each probe is a pure state transition
//! - **Imperative shell**: the waiters do nothing but run probes, fire
//!   hooks, and sleep
//!
//! A wait takes three ingredients: a time budget, a poll cadence, and a
//! probe reporting [`PollOutcome::Done`], pending, or failed. Probe errors
//! pass through an explicit classification: transient errors retry silently
//! like pending outcomes, fatal errors abort immediately, and a timeout
//! reports how long it waited, how many probes ran, and what the probe last
//! saw.
//!
//! ## Quick Example
//!
//! ```rust
//! # #[cfg(feature = "async")]
//! # {
//! use slackwater::{wait_for, PollOutcome, WaitPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! // Poll every 5ms, give up after 1s
//! let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(5));
//!
//! // Stands in for a status endpoint that needs three checks to turn ready
//! let mut checks = 0;
//! let result = wait_for::<_, String, _, _, _>(&policy, || {
//!     checks += 1;
//!     let outcome = if checks < 3 {
//!         PollOutcome::Pending
//!     } else {
//!         PollOutcome::Done("42 rows")
//!     };
//!     async move { outcome }
//! })
//! .await;
//!
//! assert_eq!(result.unwrap(), "42 rows");
//! # });
//! # }
//! ```
//!
//! The same contract is available without an async runtime through the
//! [`blocking`] module:
//!
//! ```rust
//! use slackwater::{blocking, PollOutcome, WaitPolicy};
//! use std::time::Duration;
//!
//! let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(5));
//!
//! let mut checks = 0;
//! let result = blocking::wait_for::<_, String, _, _>(&policy, || {
//!     checks += 1;
//!     PollOutcome::ready_when(checks >= 2, checks)
//! });
//!
//! assert_eq!(result.unwrap(), 2);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod blocking;
pub mod classify;
pub mod error;
pub mod outcome;
pub mod policy;
mod session;
pub mod testing;
#[cfg(feature = "async")]
pub mod wait;

// Re-exports
pub use classify::{Classify, ClassifyFn, FatalByDefault, TransientIf, Verdict};
pub use error::{LastSeen, TimedOut, WaitError};
pub use outcome::PollOutcome;
pub use policy::{Cadence, WaitEvent, WaitPolicy};
#[cfg(feature = "async")]
pub use wait::{boxed_probe, start_and_wait, wait_for, wait_for_with_hooks, BoxProbe};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::classify::{Classify, ClassifyFn, FatalByDefault, TransientIf, Verdict};
    pub use crate::error::{LastSeen, TimedOut, WaitError};
    pub use crate::outcome::PollOutcome;
    pub use crate::policy::{Cadence, WaitEvent, WaitPolicy};
    #[cfg(feature = "async")]
    pub use crate::wait::{boxed_probe, start_and_wait, wait_for, wait_for_with_hooks, BoxProbe};
}
