//! Error types for wait operations.

use std::fmt;
use std::time::Duration;

/// The most recent non-terminal observation made during a wait.
///
/// Timeouts are much easier to diagnose when they say what the probe last
/// saw: a partial value shows how far the system had converged, a transient
/// error shows what kept being retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastSeen<T, E> {
    /// Every probe reported bare `Pending`.
    Nothing,
    /// The most recent observation was a partial value.
    Value(T),
    /// The most recent observation was a transient error.
    Error(E),
}

impl<T, E> LastSeen<T, E> {
    /// Get the partial value if that was the last observation.
    pub fn value(&self) -> Option<&T> {
        match self {
            LastSeen::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Get the transient error if that was the last observation.
    pub fn error(&self) -> Option<&E> {
        match self {
            LastSeen::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Extract the partial value, discarding errors.
    pub fn into_value(self) -> Option<T> {
        match self {
            LastSeen::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Extract the transient error, discarding values.
    pub fn into_error(self) -> Option<E> {
        match self {
            LastSeen::Error(error) => Some(error),
            _ => None,
        }
    }
}

/// Error returned when the wait budget is exhausted.
///
/// Carries metadata about the whole wait, not just the final probe: how long
/// the waiter was willing to wait, how many probes ran, and the last thing a
/// probe observed.
///
/// # Examples
///
/// ```
/// use slackwater::{blocking, LastSeen, PollOutcome, WaitError, WaitPolicy};
/// use std::time::Duration;
///
/// let policy = WaitPolicy::new(Duration::from_millis(30), Duration::from_millis(5));
///
/// let result = blocking::wait_for::<i32, String, _, _>(&policy, || {
///     PollOutcome::PendingWith(7)
/// });
///
/// match result {
///     Err(WaitError::TimedOut(timed_out)) => {
///         assert!(timed_out.attempts >= 1);
///         assert_eq!(timed_out.last, LastSeen::Value(7));
///     }
///     other => panic!("expected timeout, got {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedOut<T, E> {
    /// Total time spent waiting.
    pub waited: Duration,
    /// Total number of probe attempts made.
    pub attempts: u32,
    /// The most recent non-terminal observation.
    pub last: LastSeen<T, E>,
}

impl<T, E> TimedOut<T, E> {
    /// Create a new timeout error.
    pub fn new(waited: Duration, attempts: u32, last: LastSeen<T, E>) -> Self {
        Self {
            waited,
            attempts,
            last,
        }
    }

    /// The partial value the probe last observed, if any.
    pub fn last_value(&self) -> Option<&T> {
        self.last.value()
    }

    /// The transient error the probe last hit, if any.
    pub fn last_error(&self) -> Option<&E> {
        self.last.error()
    }
}

impl<T, E: fmt::Display> fmt::Display for TimedOut<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wait timed out after {:?} ({} probe attempts)",
            self.waited, self.attempts
        )?;
        match &self.last {
            LastSeen::Nothing => Ok(()),
            LastSeen::Value(_) => write!(f, "; last probe saw a partial value"),
            LastSeen::Error(error) => write!(f, "; last transient error: {}", error),
        }
    }
}

impl<T: fmt::Debug, E: std::error::Error + 'static> std::error::Error for TimedOut<T, E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.last {
            LastSeen::Error(error) => Some(error),
            _ => None,
        }
    }
}

/// Error returned by a wait operation.
///
/// Exactly two things can go wrong: the budget ran out (`TimedOut`) or a
/// probe error was classified fatal (`Fatal`). Transient errors never
/// surface on their own; at most they ride along inside `TimedOut`.
///
/// # Examples
///
/// ```
/// use slackwater::{blocking, PollOutcome, WaitError, WaitPolicy};
/// use std::time::Duration;
///
/// let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(5));
///
/// let result = blocking::wait_for::<i32, _, _, _>(&policy, || {
///     PollOutcome::Failed("bad credentials".to_string())
/// });
///
/// match result {
///     Err(error) => {
///         assert!(error.is_fatal());
///         assert_eq!(error.into_fatal(), Some("bad credentials".to_string()));
///     }
///     Ok(_) => panic!("expected failure"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitError<T, E> {
    /// The wait budget was exhausted before the probe reported `Done`.
    TimedOut(TimedOut<T, E>),
    /// A probe error was classified fatal.
    Fatal(E),
}

impl<T, E> WaitError<T, E> {
    /// Create a fatal error.
    pub fn fatal(error: E) -> Self {
        Self::Fatal(error)
    }

    /// Create a timeout error.
    pub fn timed_out(timed_out: TimedOut<T, E>) -> Self {
        Self::TimedOut(timed_out)
    }

    /// Returns true if the wait timed out.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }

    /// Returns true if a probe error was classified fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Get the fatal error if present.
    pub fn into_fatal(self) -> Option<E> {
        match self {
            Self::Fatal(error) => Some(error),
            Self::TimedOut(_) => None,
        }
    }

    /// Get the timeout details if present.
    pub fn into_timed_out(self) -> Option<TimedOut<T, E>> {
        match self {
            Self::TimedOut(timed_out) => Some(timed_out),
            Self::Fatal(_) => None,
        }
    }
}

impl<T, E: fmt::Display> fmt::Display for WaitError<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimedOut(timed_out) => timed_out.fmt(f),
            Self::Fatal(error) => write!(f, "{}", error),
        }
    }
}

impl<T: fmt::Debug, E: std::error::Error + 'static> std::error::Error for WaitError<T, E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TimedOut(timed_out) => timed_out.source(),
            Self::Fatal(error) => Some(error),
        }
    }
}
