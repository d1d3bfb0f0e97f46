//! Per-call wait state and the poll-step decision logic.
//!
//! This is the pure core behind both waiters: it owns the clock reading,
//! the attempt counter, and the last observation, and decides after each
//! probe whether the wait finishes or sleeps. The blocking and async shells
//! only run probes, fire hooks, and sleep.

use std::mem;
use std::time::{Duration, Instant};

use crate::classify::{Classify, Verdict};
use crate::error::{LastSeen, TimedOut, WaitError};
use crate::outcome::PollOutcome;
use crate::policy::{WaitEvent, WaitPolicy};

/// What the waiter should do next.
pub(crate) enum Step<T, E> {
    /// The wait is over; return this result.
    Finish(Result<T, WaitError<T, E>>),
    /// Sleep this long, re-check the deadline, then probe again.
    Sleep(Duration),
}

/// State for a single wait call.
///
/// Created when the wait starts, consumed by its terminal outcome, never
/// shared between concurrent waits.
pub(crate) struct WaitSession<T, E> {
    started: Instant,
    attempts: u32,
    last: LastSeen<T, E>,
}

impl<T, E> WaitSession<T, E> {
    pub(crate) fn begin() -> Self {
        Self {
            started: Instant::now(),
            attempts: 0,
            last: LastSeen::Nothing,
        }
    }

    /// Probe attempts completed so far.
    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn last(&self) -> &LastSeen<T, E> {
        &self.last
    }

    /// Fold one probe outcome into the session and decide the next step.
    ///
    /// Bare `Pending` leaves the last observation untouched; `PendingWith`
    /// and transient errors replace it.
    pub(crate) fn observe<C>(
        &mut self,
        outcome: PollOutcome<T, E>,
        policy: &WaitPolicy<C>,
    ) -> Step<T, E>
    where
        C: Classify<E>,
    {
        self.attempts += 1;
        match outcome {
            PollOutcome::Done(value) => return Step::Finish(Ok(value)),
            PollOutcome::Pending => {}
            PollOutcome::PendingWith(value) => self.last = LastSeen::Value(value),
            PollOutcome::Failed(error) => match policy.classifier().classify(&error) {
                Verdict::Fatal => return Step::Finish(Err(WaitError::Fatal(error))),
                Verdict::Transient => self.last = LastSeen::Error(error),
            },
        }

        if self.budget_spent(policy) {
            return Step::Finish(Err(self.timed_out()));
        }
        Step::Sleep(policy.delay_for_attempt(self.attempts))
    }

    /// Deadline re-check after sleeping.
    ///
    /// `Some` ends the wait without another probe; a probe never starts
    /// past the deadline.
    pub(crate) fn resume<C>(&mut self, policy: &WaitPolicy<C>) -> Option<WaitError<T, E>> {
        if self.started.elapsed() >= policy.timeout() {
            Some(self.timed_out())
        } else {
            None
        }
    }

    fn budget_spent<C>(&self, policy: &WaitPolicy<C>) -> bool {
        if self.started.elapsed() >= policy.timeout() {
            return true;
        }
        matches!(policy.max_attempts(), Some(max) if self.attempts >= max)
    }

    fn timed_out(&mut self) -> WaitError<T, E> {
        let last = mem::replace(&mut self.last, LastSeen::Nothing);
        WaitError::TimedOut(TimedOut::new(self.started.elapsed(), self.attempts, last))
    }
}

/// Hook event for a wait that just timed out.
pub(crate) fn timeout_event<T, E>(timed_out: &TimedOut<T, E>) -> WaitEvent<'_, T, E> {
    WaitEvent {
        attempt: timed_out.attempts,
        elapsed: timed_out.waited,
        last: &timed_out.last,
        next_delay: None,
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    fn generous() -> WaitPolicy {
        WaitPolicy::new(Duration::from_secs(600), Duration::from_millis(100))
    }

    fn expect_sleep<T: std::fmt::Debug, E: std::fmt::Debug>(step: Step<T, E>) -> Duration {
        match step {
            Step::Sleep(delay) => delay,
            Step::Finish(result) => panic!("expected sleep, wait finished with {:?}", result),
        }
    }

    fn expect_timed_out<T: std::fmt::Debug, E: std::fmt::Debug>(
        step: Step<T, E>,
    ) -> TimedOut<T, E> {
        match step {
            Step::Finish(Err(WaitError::TimedOut(timed_out))) => timed_out,
            Step::Finish(other) => panic!("expected timeout, got {:?}", other),
            Step::Sleep(delay) => panic!("expected timeout, got sleep of {:?}", delay),
        }
    }

    #[test]
    fn test_done_finishes_on_first_probe() {
        let policy = generous();
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        match session.observe(PollOutcome::Done(5), &policy) {
            Step::Finish(Ok(5)) => {}
            _ => panic!("expected immediate success"),
        }
        assert_eq!(session.attempts(), 1);
    }

    #[test]
    fn test_failed_is_fatal_by_default() {
        let policy = generous();
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        match session.observe(PollOutcome::Failed("denied".to_string()), &policy) {
            Step::Finish(Err(WaitError::Fatal(e))) => assert_eq!(e, "denied"),
            _ => panic!("expected fatal error"),
        }
    }

    #[test]
    fn test_transient_error_sleeps_and_is_recorded() {
        let policy = generous().transient_if(|_: &String| true);
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        let delay = expect_sleep(session.observe(PollOutcome::Failed("flaky".to_string()), &policy));
        assert_eq!(delay, Duration::from_millis(100));
        assert_eq!(session.last().error(), Some(&"flaky".to_string()));
    }

    #[test]
    fn test_partial_value_is_recorded() {
        let policy = generous();
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        expect_sleep(session.observe(PollOutcome::PendingWith(3), &policy));
        assert_eq!(session.last().value(), Some(&3));
    }

    #[test]
    fn test_bare_pending_keeps_previous_observation() {
        let policy = generous();
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        expect_sleep(session.observe(PollOutcome::PendingWith(3), &policy));
        expect_sleep(session.observe(PollOutcome::Pending, &policy));
        assert_eq!(session.last().value(), Some(&3));
    }

    #[test]
    fn test_zero_timeout_times_out_after_one_probe() {
        let policy = WaitPolicy::new(Duration::ZERO, Duration::from_millis(100));
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        let timed_out = expect_timed_out(session.observe(PollOutcome::Pending, &policy));
        assert_eq!(timed_out.attempts, 1);
    }

    #[test]
    fn test_max_attempts_budget() {
        let policy = generous().with_max_attempts(2);
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        expect_sleep(session.observe(PollOutcome::Pending, &policy));
        let timed_out = expect_timed_out(session.observe(PollOutcome::Pending, &policy));
        assert_eq!(timed_out.attempts, 2);
    }

    #[test]
    fn test_timeout_carries_latest_observation() {
        let policy = generous()
            .with_max_attempts(2)
            .transient_if(|_: &String| true);
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        expect_sleep(session.observe(PollOutcome::Failed("flaky".to_string()), &policy));
        let timed_out = expect_timed_out(session.observe(PollOutcome::PendingWith(9), &policy));
        assert_eq!(timed_out.last, LastSeen::Value(9));

        // And the other way around
        let mut session: WaitSession<i32, String> = WaitSession::begin();
        expect_sleep(session.observe(PollOutcome::PendingWith(9), &policy));
        let timed_out =
            expect_timed_out(session.observe(PollOutcome::Failed("flaky".to_string()), &policy));
        assert_eq!(timed_out.last, LastSeen::Error("flaky".to_string()));
    }

    #[test]
    fn test_done_wins_even_when_budget_is_spent() {
        // The probe ran; its answer counts, budget or no budget
        let policy = generous().with_max_attempts(1);
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        match session.observe(PollOutcome::Done(1), &policy) {
            Step::Finish(Ok(1)) => {}
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn test_resume_before_deadline() {
        let policy = generous();
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        expect_sleep(session.observe(PollOutcome::Pending, &policy));
        assert!(session.resume(&policy).is_none());
    }

    #[test]
    fn test_resume_past_deadline() {
        let policy = WaitPolicy::new(Duration::ZERO, Duration::from_millis(100));
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        match session.resume(&policy) {
            Some(WaitError::TimedOut(_)) => {}
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_exponential_delays_step_through_session() {
        let policy =
            WaitPolicy::exponential(Duration::from_secs(600), Duration::from_millis(100));
        let mut session: WaitSession<i32, String> = WaitSession::begin();

        assert_eq!(
            expect_sleep(session.observe(PollOutcome::Pending, &policy)),
            Duration::from_millis(100)
        );
        assert_eq!(
            expect_sleep(session.observe(PollOutcome::Pending, &policy)),
            Duration::from_millis(200)
        );
        assert_eq!(
            expect_sleep(session.observe(PollOutcome::Pending, &policy)),
            Duration::from_millis(400)
        );
    }

    #[test]
    fn test_timeout_event_shape() {
        let timed_out: TimedOut<i32, String> =
            TimedOut::new(Duration::from_secs(2), 4, LastSeen::Value(7));
        let event = timeout_event(&timed_out);

        assert_eq!(event.attempt, 4);
        assert_eq!(event.elapsed, Duration::from_secs(2));
        assert_eq!(event.next_delay, None);
        assert_eq!(event.last.value(), Some(&7));
    }
}
