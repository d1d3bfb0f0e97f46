//! Thread-blocking waiter.
//!
//! Same contract as the async waiter, but sleeps with
//! [`std::thread::sleep`] between probes. Do not call these functions from
//! inside an async runtime; blocking a runtime worker thread stalls every
//! task scheduled on it. Synchronous code and tests are the intended
//! callers.
//!
//! # Examples
//!
//! ```
//! use slackwater::{blocking, PollOutcome, WaitPolicy};
//! use std::time::Duration;
//!
//! let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(5));
//!
//! let mut calls = 0;
//! let result = blocking::wait_for::<_, String, _, _>(&policy, || {
//!     calls += 1;
//!     if calls < 3 {
//!         PollOutcome::Pending
//!     } else {
//!         PollOutcome::Done("ready")
//!     }
//! });
//!
//! assert_eq!(result.unwrap(), "ready");
//! assert_eq!(calls, 3);
//! ```

use std::thread;

use crate::classify::Classify;
use crate::error::WaitError;
use crate::outcome::PollOutcome;
use crate::policy::{WaitEvent, WaitPolicy};
use crate::session::{timeout_event, Step, WaitSession};

/// Poll `probe` until it reports `Done`, a fatal error occurs, or the
/// policy's budget runs out, blocking the current thread between probes.
///
/// The probe always runs at least once, immediately. Total blocking time is
/// bounded by the policy timeout plus at most one poll interval.
///
/// # Examples
///
/// ```
/// use slackwater::{blocking, PollOutcome, WaitPolicy};
/// use std::time::Duration;
///
/// let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(5));
///
/// let mut remaining_work = 2;
/// let result = blocking::wait_for::<_, String, _, _>(&policy, || {
///     if remaining_work == 0 {
///         PollOutcome::Done("finished")
///     } else {
///         remaining_work -= 1;
///         PollOutcome::Pending
///     }
/// });
///
/// assert_eq!(result.unwrap(), "finished");
/// ```
pub fn wait_for<T, E, C, P>(policy: &WaitPolicy<C>, probe: P) -> Result<T, WaitError<T, E>>
where
    C: Classify<E>,
    P: FnMut() -> PollOutcome<T, E>,
{
    wait_for_with_hooks(policy, probe, |_: &WaitEvent<'_, T, E>| {})
}

/// Like [`wait_for`], with a hook observing the wait's progress.
///
/// The hook fires after every probe that leaves the wait running (with the
/// upcoming delay) and once more if the wait times out (with `next_delay`
/// set to `None`). Fatal errors and success bypass the hook. The hook is
/// synchronous and should not block; use it for logging and metrics.
///
/// # Examples
///
/// ```
/// use slackwater::{blocking, PollOutcome, WaitEvent, WaitPolicy};
/// use std::time::Duration;
///
/// let policy = WaitPolicy::new(Duration::from_millis(20), Duration::from_millis(5));
///
/// let mut events = Vec::new();
/// let result = blocking::wait_for_with_hooks::<i32, String, _, _, _>(
///     &policy,
///     || PollOutcome::Pending,
///     |event: &WaitEvent<'_, i32, String>| events.push((event.attempt, event.next_delay)),
/// );
///
/// assert!(result.is_err());
/// // The terminal event reports no next delay
/// assert_eq!(events.last().map(|(_, delay)| *delay), Some(None));
/// ```
pub fn wait_for_with_hooks<T, E, C, P, H>(
    policy: &WaitPolicy<C>,
    mut probe: P,
    mut on_poll: H,
) -> Result<T, WaitError<T, E>>
where
    C: Classify<E>,
    P: FnMut() -> PollOutcome<T, E>,
    H: FnMut(&WaitEvent<'_, T, E>),
{
    let mut session = WaitSession::begin();
    loop {
        match session.observe(probe(), policy) {
            Step::Finish(result) => return finish(result, &mut on_poll),
            Step::Sleep(delay) => {
                on_poll(&WaitEvent {
                    attempt: session.attempts(),
                    elapsed: session.elapsed(),
                    last: session.last(),
                    next_delay: Some(delay),
                });
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    attempt = session.attempts(),
                    delay_ms = delay.as_millis() as u64,
                    "probe not ready; sleeping"
                );
                thread::sleep(delay);
                if let Some(error) = session.resume(policy) {
                    return finish(Err(error), &mut on_poll);
                }
            }
        }
    }
}

fn finish<T, E, H>(
    result: Result<T, WaitError<T, E>>,
    on_poll: &mut H,
) -> Result<T, WaitError<T, E>>
where
    H: FnMut(&WaitEvent<'_, T, E>),
{
    if let Err(WaitError::TimedOut(timed_out)) = &result {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempts = timed_out.attempts,
            waited_ms = timed_out.waited.as_millis() as u64,
            "wait timed out"
        );
        on_poll(&timeout_event(timed_out));
    }
    result
}

#[cfg(test)]
mod blocking_tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_counts_probes_exactly() {
        let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(1));

        let mut calls = 0u32;
        let result = wait_for::<_, String, _, _>(&policy, || {
            calls += 1;
            if calls < 4 {
                PollOutcome::Pending
            } else {
                PollOutcome::Done(calls)
            }
        });

        assert_eq!(result.unwrap(), 4);
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_fatal_stops_after_one_probe() {
        let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(1));

        let mut calls = 0u32;
        let result = wait_for::<i32, _, _, _>(&policy, || {
            calls += 1;
            PollOutcome::Failed("forbidden".to_string())
        });

        assert_eq!(result.unwrap_err().into_fatal(), Some("forbidden".to_string()));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_interval_longer_than_timeout_probes_once() {
        let policy = WaitPolicy::new(Duration::from_millis(10), Duration::from_millis(40));

        let mut calls = 0u32;
        let result = wait_for::<i32, String, _, _>(&policy, || {
            calls += 1;
            PollOutcome::Pending
        });

        let timed_out = result.unwrap_err().into_timed_out().unwrap();
        assert_eq!(calls, 1);
        assert_eq!(timed_out.attempts, 1);
    }

    #[test]
    fn test_hook_sequence_ends_with_timeout_event() {
        let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(1))
            .with_max_attempts(3);

        let mut events: Vec<(u32, Option<Duration>)> = Vec::new();
        let result = wait_for_with_hooks::<i32, String, _, _, _>(
            &policy,
            || PollOutcome::Pending,
            |event: &WaitEvent<'_, i32, String>| events.push((event.attempt, event.next_delay)),
        );

        assert!(result.is_err());
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].0, 1);
        assert!(events[0].1.is_some());
        assert_eq!(events[1].0, 2);
        assert!(events[1].1.is_some());
        // Attempt budget spent right after the third probe, before sleeping
        assert_eq!(events[2], (3, None));
    }

    #[test]
    fn test_hook_not_fired_on_fatal() {
        let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(1));

        let mut fired = 0u32;
        let result = wait_for_with_hooks::<i32, String, _, _, _>(
            &policy,
            || PollOutcome::Failed("denied".to_string()),
            |_: &WaitEvent<'_, i32, String>| fired += 1,
        );

        assert!(result.is_err());
        assert_eq!(fired, 0);
    }
}
