//! Testing utilities for code that waits.
//!
//! Probe scripts make wait behavior deterministic in tests: a
//! [`ScriptedProbe`] replays a fixed sequence of outcomes and counts how
//! many times it was polled. The assertion macros unwrap the three ways a
//! wait can end, panicking with the unexpected outcome otherwise.
//!
//! # Examples
//!
//! ## Scripted probes
//!
//! ```rust
//! use slackwater::testing::ScriptedProbe;
//! use slackwater::{assert_done, blocking, WaitPolicy};
//! use std::time::Duration;
//!
//! let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(1));
//!
//! let mut probe = ScriptedProbe::<&str, String>::pending_then_done(2, "done");
//! let value = assert_done!(blocking::wait_for(&policy, || probe.poll()));
//!
//! assert_eq!(value, "done");
//! assert_eq!(probe.calls(), 3);
//! ```
//!
//! ## Assertion macros
//!
//! ```rust
//! use slackwater::{assert_fatal, assert_timed_out, LastSeen, TimedOut, WaitError};
//! use std::time::Duration;
//!
//! let result: Result<i32, WaitError<i32, String>> =
//!     Err(WaitError::fatal("denied".to_string()));
//! assert_eq!(assert_fatal!(result), "denied");
//!
//! let result: Result<i32, WaitError<i32, String>> = Err(WaitError::timed_out(
//!     TimedOut::new(Duration::from_secs(1), 4, LastSeen::Nothing),
//! ));
//! assert_eq!(assert_timed_out!(result).attempts, 4);
//! ```

use std::collections::VecDeque;

use crate::outcome::PollOutcome;

/// A probe that replays a fixed script of outcomes.
///
/// Every call to [`poll`](Self::poll) pops the next scripted outcome; an
/// exhausted script keeps reporting [`PollOutcome::Pending`], which makes
/// always-pending timeout scenarios easy to express.
///
/// # Example
///
/// ```rust
/// use slackwater::testing::ScriptedProbe;
/// use slackwater::PollOutcome;
///
/// let mut probe = ScriptedProbe::<i32, String>::new([
///     PollOutcome::Pending,
///     PollOutcome::PendingWith(1),
///     PollOutcome::Done(2),
/// ]);
///
/// assert_eq!(probe.poll(), PollOutcome::Pending);
/// assert_eq!(probe.poll(), PollOutcome::PendingWith(1));
/// assert_eq!(probe.poll(), PollOutcome::Done(2));
/// assert_eq!(probe.calls(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedProbe<T, E> {
    script: VecDeque<PollOutcome<T, E>>,
    calls: u32,
}

impl<T, E> ScriptedProbe<T, E> {
    /// Create a probe from a sequence of outcomes.
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = PollOutcome<T, E>>,
    {
        Self {
            script: script.into_iter().collect(),
            calls: 0,
        }
    }

    /// A script of `pendings` bare pending outcomes followed by `Done(value)`.
    pub fn pending_then_done(pendings: u32, value: T) -> Self {
        let mut script: VecDeque<_> = (0..pendings).map(|_| PollOutcome::Pending).collect();
        script.push_back(PollOutcome::Done(value));
        Self { script, calls: 0 }
    }

    /// A script that never becomes ready.
    pub fn always_pending() -> Self {
        Self {
            script: VecDeque::new(),
            calls: 0,
        }
    }

    /// How many times the probe has been polled.
    pub fn calls(&self) -> u32 {
        self.calls
    }

    /// Run one probe attempt, consuming the next scripted outcome.
    pub fn poll(&mut self) -> PollOutcome<T, E> {
        self.calls += 1;
        self.script.pop_front().unwrap_or(PollOutcome::Pending)
    }
}

/// Assert that a wait succeeded, returning its value.
///
/// # Example
///
/// ```rust
/// use slackwater::{assert_done, WaitError};
///
/// let result: Result<i32, WaitError<i32, String>> = Ok(42);
/// assert_eq!(assert_done!(result), 42);
/// ```
#[macro_export]
macro_rules! assert_done {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(error) => panic!("expected Done, wait failed: {:?}", error),
        }
    };
}

/// Assert that a wait timed out, returning the timeout details.
///
/// # Example
///
/// ```rust
/// use slackwater::{assert_timed_out, LastSeen, TimedOut, WaitError};
/// use std::time::Duration;
///
/// let result: Result<i32, WaitError<i32, String>> = Err(WaitError::timed_out(
///     TimedOut::new(Duration::from_secs(1), 3, LastSeen::Nothing),
/// ));
///
/// let timed_out = assert_timed_out!(result);
/// assert_eq!(timed_out.attempts, 3);
/// ```
#[macro_export]
macro_rules! assert_timed_out {
    ($result:expr) => {
        match $result {
            Err($crate::WaitError::TimedOut(timed_out)) => timed_out,
            Err($crate::WaitError::Fatal(error)) => {
                panic!("expected TimedOut, got Fatal: {:?}", error)
            }
            Ok(value) => panic!("expected TimedOut, wait succeeded: {:?}", value),
        }
    };
}

/// Assert that a wait failed fatally, returning the error.
///
/// # Example
///
/// ```rust
/// use slackwater::{assert_fatal, WaitError};
///
/// let result: Result<i32, WaitError<i32, String>> =
///     Err(WaitError::fatal("denied".to_string()));
/// assert_eq!(assert_fatal!(result), "denied");
/// ```
#[macro_export]
macro_rules! assert_fatal {
    ($result:expr) => {
        match $result {
            Err($crate::WaitError::Fatal(error)) => error,
            Err($crate::WaitError::TimedOut(timed_out)) => {
                panic!("expected Fatal, got TimedOut: {:?}", timed_out)
            }
            Ok(value) => panic!("expected Fatal, wait succeeded: {:?}", value),
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl<T, E> Arbitrary for PollOutcome<T, E>
where
    T: Arbitrary,
    T::Parameters: Clone,
    E: Arbitrary,
{
    type Parameters = (T::Parameters, E::Parameters);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        let (t_params, e_params) = args;
        prop_oneof![
            any_with::<T>(t_params.clone()).prop_map(PollOutcome::Done),
            proptest::strategy::LazyJust::new(|| PollOutcome::Pending),
            any_with::<T>(t_params).prop_map(PollOutcome::PendingWith),
            any_with::<E>(e_params).prop_map(PollOutcome::Failed),
        ]
        .boxed()
    }
}

#[cfg(test)]
mod testing_tests {
    use super::*;
    use crate::error::{LastSeen, TimedOut, WaitError};
    use std::time::Duration;

    #[test]
    fn scripted_probe_replays_in_order() {
        let mut probe =
            ScriptedProbe::<i32, String>::new([PollOutcome::PendingWith(1), PollOutcome::Done(2)]);

        assert_eq!(probe.poll(), PollOutcome::PendingWith(1));
        assert_eq!(probe.poll(), PollOutcome::Done(2));
        assert_eq!(probe.calls(), 2);
    }

    #[test]
    fn scripted_probe_exhausted_reports_pending() {
        let mut probe = ScriptedProbe::<i32, String>::always_pending();

        assert_eq!(probe.poll(), PollOutcome::Pending);
        assert_eq!(probe.poll(), PollOutcome::Pending);
        assert_eq!(probe.calls(), 2);
    }

    #[test]
    fn pending_then_done_counts() {
        let mut probe = ScriptedProbe::<&str, String>::pending_then_done(2, "v");

        assert_eq!(probe.poll(), PollOutcome::Pending);
        assert_eq!(probe.poll(), PollOutcome::Pending);
        assert_eq!(probe.poll(), PollOutcome::Done("v"));
    }

    #[test]
    fn assert_done_returns_value() {
        let result: Result<i32, WaitError<i32, String>> = Ok(5);
        assert_eq!(assert_done!(result), 5);
    }

    #[test]
    #[should_panic(expected = "expected Done")]
    fn assert_done_panics_on_error() {
        let result: Result<i32, WaitError<i32, String>> =
            Err(WaitError::fatal("nope".to_string()));
        assert_done!(result);
    }

    #[test]
    fn assert_timed_out_returns_details() {
        let result: Result<i32, WaitError<i32, String>> = Err(WaitError::timed_out(
            TimedOut::new(Duration::from_secs(1), 3, LastSeen::Value(7)),
        ));

        let timed_out = assert_timed_out!(result);
        assert_eq!(timed_out.attempts, 3);
        assert_eq!(timed_out.last_value(), Some(&7));
    }

    #[test]
    #[should_panic(expected = "expected TimedOut")]
    fn assert_timed_out_panics_on_success() {
        let result: Result<i32, WaitError<i32, String>> = Ok(5);
        assert_timed_out!(result);
    }

    #[test]
    fn assert_fatal_returns_error() {
        let result: Result<i32, WaitError<i32, String>> =
            Err(WaitError::fatal("denied".to_string()));
        assert_eq!(assert_fatal!(result), "denied");
    }

    #[test]
    #[should_panic(expected = "expected Fatal")]
    fn assert_fatal_panics_on_timeout() {
        let result: Result<i32, WaitError<i32, String>> = Err(WaitError::timed_out(
            TimedOut::new(Duration::from_secs(1), 3, LastSeen::Nothing),
        ));
        assert_fatal!(result);
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn poll_outcome_arbitrary_is_exactly_one_kind(
                outcome in any::<PollOutcome<i32, String>>()
            ) {
                let kinds = outcome.is_done() as u8
                    + outcome.is_pending() as u8
                    + outcome.is_failed() as u8;
                prop_assert_eq!(kinds, 1);
            }
        }
    }
}
