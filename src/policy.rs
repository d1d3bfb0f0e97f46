//! Wait policy types and configuration.

use std::time::Duration;

use crate::classify::{ClassifyFn, FatalByDefault, TransientIf};
use crate::error::LastSeen;

/// A wait policy describing how long and how often to poll.
///
/// Policies are pure data plus an error classifier - they describe wait
/// behavior but don't execute it. This makes them easy to test, clone, and
/// inspect, and one policy can be shared across many waits.
///
/// The two hard bounds are the `timeout` (total wall-clock budget) and the
/// optional `max_attempts` (probe-count budget). A wait ends as soon as
/// either is exhausted.
///
/// # Examples
///
/// ```rust
/// use slackwater::WaitPolicy;
/// use std::time::Duration;
///
/// // Poll every 500ms for up to 5 seconds
/// let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(500));
/// assert_eq!(policy.timeout(), Duration::from_secs(5));
///
/// // Exponential cadence with a cap on any single delay
/// let policy = WaitPolicy::exponential(Duration::from_secs(60), Duration::from_millis(100))
///     .with_max_interval(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitPolicy<C = FatalByDefault> {
    timeout: Duration,
    cadence: Cadence,
    max_interval: Option<Duration>,
    max_attempts: Option<u32>,
    classifier: C,
}

/// The delay schedule between probe attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cadence {
    /// Fixed delay between probes.
    Fixed(Duration),
    /// Delay doubles after each probe: initial * 2^(attempt - 1).
    Exponential {
        /// Delay after the first probe.
        initial: Duration,
    },
}

/// Information about a wait in progress, passed to hooks.
///
/// Fired after every probe that leaves the wait running, and once more if
/// the wait ends in a timeout (with `next_delay` set to `None`). Fatal
/// probe errors bypass hooks entirely; the caller receives them directly.
#[derive(Debug, Clone)]
pub struct WaitEvent<'a, T, E> {
    /// Which probe attempt just completed (1-indexed).
    pub attempt: u32,
    /// Total elapsed time since the wait began.
    pub elapsed: Duration,
    /// The most recent non-terminal observation.
    pub last: &'a LastSeen<T, E>,
    /// Delay before the next probe, or `None` when the wait just timed out.
    pub next_delay: Option<Duration>,
}

impl WaitPolicy {
    /// Create a policy that polls at a fixed interval.
    ///
    /// Every probe error is fatal until the policy says otherwise; see
    /// [`transient_if`](Self::transient_if) and
    /// [`classify_with`](Self::classify_with).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slackwater::WaitPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(500));
    ///
    /// // Every delay is 500ms
    /// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(500));
    /// assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(500));
    /// ```
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            cadence: Cadence::Fixed(interval),
            max_interval: None,
            max_attempts: None,
            classifier: FatalByDefault,
        }
    }

    /// Create a policy whose delay doubles after each probe.
    ///
    /// Suited to operations that usually finish fast but occasionally take
    /// much longer; early probes are cheap and frequent, later ones back
    /// off. Combine with [`with_max_interval`](Self::with_max_interval) to
    /// cap the growth.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slackwater::WaitPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = WaitPolicy::exponential(Duration::from_secs(60), Duration::from_millis(100));
    ///
    /// // Delay doubles: 100ms, 200ms, 400ms, 800ms, ...
    /// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
    /// assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
    /// ```
    pub fn exponential(timeout: Duration, initial: Duration) -> Self {
        Self {
            timeout,
            cadence: Cadence::Exponential { initial },
            max_interval: None,
            max_attempts: None,
            classifier: FatalByDefault,
        }
    }
}

impl<C> WaitPolicy<C> {
    /// Cap any single delay, regardless of cadence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slackwater::WaitPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = WaitPolicy::exponential(Duration::from_secs(60), Duration::from_millis(100))
    ///     .with_max_interval(Duration::from_millis(500));
    ///
    /// // Without cap: 100ms, 200ms, 400ms, 800ms, 1600ms, ...
    /// // With cap:    100ms, 200ms, 400ms, 500ms, 500ms, ...
    /// assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(500));
    /// assert_eq!(policy.delay_for_attempt(10), Duration::from_millis(500));
    /// ```
    pub fn with_max_interval(mut self, d: Duration) -> Self {
        self.max_interval = Some(d);
        self
    }

    /// Bound the wait by probe count as well as by time.
    ///
    /// The wait ends with a timeout error as soon as `n` probes have run
    /// without a terminal outcome, even if wall-clock budget remains.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slackwater::WaitPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = WaitPolicy::exponential(Duration::from_secs(300), Duration::from_millis(100))
    ///     .with_max_attempts(6);
    ///
    /// assert_eq!(policy.max_attempts(), Some(6));
    /// ```
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n);
        self
    }

    /// Mark probe errors matching the predicate as transient.
    ///
    /// Transient errors are retried like `Pending` outcomes; everything
    /// else stays fatal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slackwater::{Classify, WaitPolicy};
    /// use std::time::Duration;
    ///
    /// let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(100))
    ///     .transient_if(|status: &u16| *status == 404 || *status == 429);
    ///
    /// assert!(policy.classifier().classify(&404).is_transient());
    /// assert!(policy.classifier().classify(&500).is_fatal());
    /// ```
    pub fn transient_if<F>(self, predicate: F) -> WaitPolicy<TransientIf<F>> {
        self.classify_with(TransientIf(predicate))
    }

    /// Replace the error classifier wholesale.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slackwater::{Classify, ClassifyFn, Verdict, WaitPolicy};
    /// use std::time::Duration;
    ///
    /// #[derive(Debug)]
    /// enum JobError {
    ///     StillRunning,
    ///     Cancelled,
    /// }
    ///
    /// let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(100))
    ///     .classify_with(ClassifyFn(|error: &JobError| match error {
    ///         JobError::StillRunning => Verdict::Transient,
    ///         JobError::Cancelled => Verdict::Fatal,
    ///     }));
    ///
    /// assert!(policy.classifier().classify(&JobError::StillRunning).is_transient());
    /// ```
    pub fn classify_with<D>(self, classifier: D) -> WaitPolicy<D> {
        WaitPolicy {
            timeout: self.timeout,
            cadence: self.cadence,
            max_interval: self.max_interval,
            max_attempts: self.max_attempts,
            classifier,
        }
    }

    /// Get the total wall-clock budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the delay schedule.
    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    /// Get the cap on any single delay.
    pub fn max_interval(&self) -> Option<Duration> {
        self.max_interval
    }

    /// Get the probe-count budget.
    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Get the error classifier.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Calculate the delay after the given number of completed probes.
    ///
    /// `attempts_so_far` is 1-indexed: the sleep after the first probe
    /// passes 1. The result is capped by
    /// [`with_max_interval`](Self::with_max_interval) when set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slackwater::WaitPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = WaitPolicy::exponential(Duration::from_secs(60), Duration::from_millis(100));
    ///
    /// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
    /// assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
    /// ```
    pub fn delay_for_attempt(&self, attempts_so_far: u32) -> Duration {
        let base = match &self.cadence {
            Cadence::Fixed(interval) => *interval,
            Cadence::Exponential { initial } => {
                initial.saturating_mul(2u32.saturating_pow(attempts_so_far.saturating_sub(1)))
            }
        };

        match self.max_interval {
            Some(max) => base.min(max),
            None => base,
        }
    }

    /// Validate that the policy's bounds are usable.
    ///
    /// Returns an error message if the timeout or interval is zero, or if
    /// `max_attempts` is zero. The waiters don't call this; degenerate
    /// policies still behave deterministically (a zero timeout yields
    /// exactly one probe and then a timeout error), but they are almost
    /// never what the caller meant.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.timeout.is_zero() {
            return Err("WaitPolicy timeout must be greater than zero");
        }
        let interval = match &self.cadence {
            Cadence::Fixed(interval) => interval,
            Cadence::Exponential { initial } => initial,
        };
        if interval.is_zero() {
            return Err("WaitPolicy poll interval must be greater than zero");
        }
        if self.max_attempts == Some(0) {
            return Err("WaitPolicy max_attempts must be at least 1");
        }
        Ok(())
    }
}
