//! Property tests for the wait loop and the policy math.

use std::time::Duration;

use proptest::prelude::*;

use slackwater::testing::ScriptedProbe;
use slackwater::{blocking, PollOutcome, WaitError, WaitPolicy};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn k_pendings_take_exactly_k_plus_one_probes(k in 0u32..=6) {
        let policy = WaitPolicy::new(Duration::from_secs(60), Duration::from_millis(1));
        let mut probe = ScriptedProbe::<u32, String>::pending_then_done(k, 7);

        let result = blocking::wait_for(&policy, || probe.poll());

        prop_assert_eq!(result, Ok(7));
        prop_assert_eq!(probe.calls(), k + 1);
    }

    #[test]
    fn exhausted_attempt_budget_is_always_a_timeout(n in 1u32..=6) {
        let policy = WaitPolicy::new(Duration::from_secs(60), Duration::from_millis(1))
            .with_max_attempts(n);
        let mut probe = ScriptedProbe::<u32, String>::always_pending();

        let result = blocking::wait_for(&policy, || probe.poll());

        match result {
            Err(WaitError::TimedOut(timed_out)) => {
                prop_assert_eq!(timed_out.attempts, n);
                prop_assert_eq!(probe.calls(), n);
            }
            other => prop_assert!(false, "expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn fatal_errors_abort_after_one_probe(message in "[a-z]{1,12}") {
        let policy = WaitPolicy::new(Duration::from_secs(60), Duration::from_millis(1));
        let mut probe = ScriptedProbe::<u32, String>::new([
            PollOutcome::Failed(message.clone()),
            PollOutcome::Done(1),
        ]);

        let result = blocking::wait_for(&policy, || probe.poll());

        prop_assert_eq!(result, Err(WaitError::Fatal(message)));
        prop_assert_eq!(probe.calls(), 1);
    }

    #[test]
    fn sequential_waits_agree(k in 0u32..=4) {
        let policy = WaitPolicy::new(Duration::from_secs(60), Duration::from_millis(1));

        let run = || {
            let mut probe = ScriptedProbe::<u32, String>::pending_then_done(k, k);
            let result = blocking::wait_for(&policy, || probe.poll());
            (result, probe.calls())
        };

        prop_assert_eq!(run(), run());
    }
}

proptest! {
    #[test]
    fn exponential_delays_never_shrink(initial_ms in 1u64..=100, attempt in 1u32..=10) {
        let policy =
            WaitPolicy::exponential(Duration::from_secs(600), Duration::from_millis(initial_ms));

        prop_assert!(policy.delay_for_attempt(attempt + 1) >= policy.delay_for_attempt(attempt));
    }

    #[test]
    fn max_interval_caps_every_delay(
        initial_ms in 1u64..=100,
        cap_ms in 1u64..=200,
        attempt in 1u32..=12,
    ) {
        let policy =
            WaitPolicy::exponential(Duration::from_secs(600), Duration::from_millis(initial_ms))
                .with_max_interval(Duration::from_millis(cap_ms));

        prop_assert!(policy.delay_for_attempt(attempt) <= Duration::from_millis(cap_ms));
    }

    #[test]
    fn ready_when_agrees_with_the_condition(ready in any::<bool>(), value in any::<u32>()) {
        let outcome: PollOutcome<u32, String> = PollOutcome::ready_when(ready, value);

        prop_assert_eq!(outcome.is_done(), ready);
        if !ready {
            prop_assert_eq!(outcome.partial(), Some(&value));
        }
    }
}
