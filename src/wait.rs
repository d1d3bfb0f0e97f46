//! Async waiter for polling asynchronous jobs.
//!
//! [`wait_for`] is the crate's namesake operation: submit work somewhere,
//! then poll a probe at the policy's cadence until it reports
//! [`PollOutcome::Done`], a fatal error occurs, or the budget runs out.
//! Sleeping uses [`tokio::time::sleep`], so a pending wait suspends its
//! task instead of blocking a thread.
//!
//! There is no cancellation token; the timeout is the built-in cancellation,
//! and dropping the returned future cancels the wait at its next await
//! point.
//!
//! # Quick Start
//!
//! ```rust
//! use slackwater::{wait_for, PollOutcome, WaitPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(5));
//!
//! let mut calls = 0;
//! let result = wait_for::<_, String, _, _, _>(&policy, || {
//!     calls += 1;
//!     let ready = calls >= 3;
//!     async move {
//!         if ready {
//!             PollOutcome::Done("ready")
//!         } else {
//!             PollOutcome::Pending
//!         }
//!     }
//! })
//! .await;
//!
//! assert_eq!(result.unwrap(), "ready");
//! assert_eq!(calls, 3);
//! # });
//! ```

use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::classify::Classify;
use crate::error::WaitError;
use crate::outcome::PollOutcome;
use crate::policy::{WaitEvent, WaitPolicy};
use crate::session::{timeout_event, Step, WaitSession};

/// A type-erased probe, for storing probes in structs or collections.
pub type BoxProbe<'a, T, E> = Box<dyn FnMut() -> BoxFuture<'a, PollOutcome<T, E>> + Send + 'a>;

/// Poll `probe` until it reports `Done`, a fatal error occurs, or the
/// policy's budget runs out.
///
/// The probe is a factory: each attempt calls it for a fresh future, so
/// fresh requests, connections, and request ids per attempt come naturally.
/// The probe always runs at least once, immediately. Total wait time is
/// bounded by the policy timeout plus at most one poll interval, and no
/// probe starts after the deadline has passed.
///
/// # Examples
///
/// Errors the policy classifies as transient are retried like `Pending`:
///
/// ```rust
/// use slackwater::{wait_for, PollOutcome, WaitPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(5))
///     .transient_if(|status: &u16| *status == 404);
///
/// let mut calls = 0;
/// let result = wait_for::<_, u16, _, _, _>(&policy, || {
///     calls += 1;
///     let outcome = if calls < 3 {
///         PollOutcome::Failed(404)
///     } else {
///         PollOutcome::Done("created")
///     };
///     async move { outcome }
/// })
/// .await;
///
/// assert_eq!(result.unwrap(), "created");
/// # });
/// ```
pub async fn wait_for<T, E, C, P, Fut>(
    policy: &WaitPolicy<C>,
    probe: P,
) -> Result<T, WaitError<T, E>>
where
    C: Classify<E>,
    P: FnMut() -> Fut,
    Fut: Future<Output = PollOutcome<T, E>>,
{
    wait_for_with_hooks(policy, probe, |_: &WaitEvent<'_, T, E>| {}).await
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
/// ```rust
/// use slackwater::{wait_for_with_hooks, PollOutcome, WaitEvent, WaitPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(5));
///
/// let mut attempts_seen = Vec::new();
/// let mut calls = 0;
/// let result = wait_for_with_hooks::<_, String, _, _, _, _>(
///     &policy,
///     || {
///         calls += 1;
///         let ready = calls >= 3;
///         async move {
///             if ready {
///                 PollOutcome::Done(())
///             } else {
///                 PollOutcome::Pending
///             }
///         }
///     },
///     |event: &WaitEvent<'_, (), String>| attempts_seen.push(event.attempt),
/// )
/// .await;
///
/// assert!(result.is_ok());
/// assert_eq!(attempts_seen, vec![1, 2]);
/// # });
/// ```
pub async fn wait_for_with_hooks<T, E, C, P, Fut, H>(
    policy: &WaitPolicy<C>,
    mut probe: P,
    mut on_poll: H,
) -> Result<T, WaitError<T, E>>
where
    C: Classify<E>,
    P: FnMut() -> Fut,
    Fut: Future<Output = PollOutcome<T, E>>,
    H: FnMut(&WaitEvent<'_, T, E>),
{
    let mut session = WaitSession::begin();
    loop {
        match session.observe(probe().await, policy) {
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
                tokio::time::sleep(delay).await;
                if let Some(error) = session.resume(policy) {
                    return finish(Err(error), &mut on_poll);
                }
            }
        }
    }
}

/// Await a starting call, then poll for the operation it kicked off.
///
/// This is the submit-then-poll shape of asynchronous job APIs: the start
/// future produces a handle (a job id, a token), and each probe receives a
/// clone of that handle to look up progress. An error from the starting
/// call is always fatal; there is no job to poll yet, so the classifier
/// never sees it.
///
/// # Examples
///
/// ```rust
/// use slackwater::{start_and_wait, PollOutcome, WaitPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(5));
///
/// let result = start_and_wait(
///     &policy,
///     async { Ok::<_, String>("job-17".to_string()) },
///     |job_id| async move { PollOutcome::Done(format!("{job_id}: 42 rows")) },
/// )
/// .await;
///
/// assert_eq!(result.unwrap(), "job-17: 42 rows");
/// # });
/// ```
pub async fn start_and_wait<T, E, C, J, S, P, Fut>(
    policy: &WaitPolicy<C>,
    start: S,
    mut probe: P,
) -> Result<T, WaitError<T, E>>
where
    C: Classify<E>,
    J: Clone,
    S: Future<Output = Result<J, E>>,
    P: FnMut(J) -> Fut,
    Fut: Future<Output = PollOutcome<T, E>>,
{
    let handle = start.await.map_err(WaitError::Fatal)?;
    wait_for(policy, move || probe(handle.clone())).await
}

/// Box a probe, erasing its closure and future types.
///
/// # Examples
///
/// ```rust
/// use slackwater::{boxed_probe, wait_for, BoxProbe, PollOutcome, WaitPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(5));
///
/// let probes: Vec<BoxProbe<'static, u32, String>> = vec![
///     boxed_probe(|| async { PollOutcome::Done(1) }),
///     boxed_probe(|| async { PollOutcome::Done(2) }),
/// ];
///
/// for (index, probe) in probes.into_iter().enumerate() {
///     let value = wait_for(&policy, probe).await.unwrap();
///     assert_eq!(value as usize, index + 1);
/// }
/// # });
/// ```
pub fn boxed_probe<'a, T, E, P, Fut>(mut probe: P) -> BoxProbe<'a, T, E>
where
    P: FnMut() -> Fut + Send + 'a,
    Fut: Future<Output = PollOutcome<T, E>> + Send + 'a,
{
    Box::new(move || probe().boxed())
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
