//! Probe outcome type for polling operations.
//!
//! A probe inspects some remote or shared state and reports one of four
//! things: the awaited value is ready, it is not ready yet, it is not ready
//! but a partial value was observed, or the probe itself failed.
//!
//! # Examples
//!
//! ## Reporting readiness directly
//!
//! ```
//! use slackwater::PollOutcome;
//!
//! let ready: PollOutcome<i32, String> = PollOutcome::Done(42);
//! let waiting: PollOutcome<i32, String> = PollOutcome::Pending;
//!
//! assert!(ready.is_done());
//! assert!(waiting.is_pending());
//! ```
//!
//! ## Condition plus snapshot
//!
//! Many probes compute a snapshot of the watched state and a readiness
//! condition over it. `ready_when` keeps the snapshot attached either way,
//! so a timeout can report the last thing the probe saw:
//!
//! ```
//! use slackwater::PollOutcome;
//!
//! let rows = vec![1, 2];
//! let outcome: PollOutcome<_, String> = PollOutcome::ready_when(rows.len() >= 3, rows);
//!
//! assert!(outcome.is_pending());
//! assert_eq!(outcome.partial(), Some(&vec![1, 2]));
//! ```

/// The result of one probe attempt.
///
/// `Done` is terminal success. `Pending` and `PendingWith` ask the waiter to
/// try again after the configured delay. `Failed` is routed through the
/// policy's error classification: transient errors are treated like
/// `Pending`, fatal errors abort the wait immediately.
///
/// # Type Parameters
///
/// * `T` - The awaited value type
/// * `E` - The probe's error type
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PollOutcome<T, E> {
    /// The awaited value is ready.
    Done(T),
    /// Not ready yet; nothing observed.
    Pending,
    /// Not ready yet, but the probe observed a partial or stale value.
    PendingWith(T),
    /// The probe failed; the policy decides whether this is transient or fatal.
    Failed(E),
}

impl<T, E> PollOutcome<T, E> {
    /// Build an outcome from a readiness condition and the observed value.
    ///
    /// Returns `Done(value)` when `ready` is true, `PendingWith(value)`
    /// otherwise. Useful for probes that always fetch a snapshot and then
    /// test a condition over it.
    ///
    /// # Examples
    ///
    /// ```
    /// use slackwater::PollOutcome;
    ///
    /// let count = 5;
    /// let outcome: PollOutcome<_, String> = PollOutcome::ready_when(count >= 3, count);
    /// assert_eq!(outcome, PollOutcome::Done(5));
    /// ```
    #[inline]
    pub fn ready_when(ready: bool, value: T) -> Self {
        if ready {
            PollOutcome::Done(value)
        } else {
            PollOutcome::PendingWith(value)
        }
    }

    /// Check if the awaited value is ready.
    ///
    /// # Examples
    ///
    /// ```
    /// use slackwater::PollOutcome;
    ///
    /// let outcome: PollOutcome<_, String> = PollOutcome::Done(42);
    /// assert!(outcome.is_done());
    /// ```
    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self, PollOutcome::Done(_))
    }

    /// Check if the probe reported "not ready yet".
    ///
    /// True for both `Pending` and `PendingWith`.
    ///
    /// # Examples
    ///
    /// ```
    /// use slackwater::PollOutcome;
    ///
    /// let bare: PollOutcome<i32, String> = PollOutcome::Pending;
    /// let partial: PollOutcome<i32, String> = PollOutcome::PendingWith(1);
    ///
    /// assert!(bare.is_pending());
    /// assert!(partial.is_pending());
    /// ```
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, PollOutcome::Pending | PollOutcome::PendingWith(_))
    }

    /// Check if the probe failed.
    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, PollOutcome::Failed(_))
    }

    /// Extract the ready value if present.
    ///
    /// # Examples
    ///
    /// ```
    /// use slackwater::PollOutcome;
    ///
    /// let outcome: PollOutcome<_, String> = PollOutcome::Done(42);
    /// assert_eq!(outcome.into_done(), Some(42));
    ///
    /// let outcome: PollOutcome<i32, String> = PollOutcome::PendingWith(42);
    /// assert_eq!(outcome.into_done(), None);
    /// ```
    #[inline]
    pub fn into_done(self) -> Option<T> {
        match self {
            PollOutcome::Done(value) => Some(value),
            _ => None,
        }
    }

    /// Get the partial value from a `PendingWith` outcome.
    #[inline]
    pub fn partial(&self) -> Option<&T> {
        match self {
            PollOutcome::PendingWith(value) => Some(value),
            _ => None,
        }
    }

    /// Transform the value carried by `Done` or `PendingWith`.
    ///
    /// # Examples
    ///
    /// ```
    /// use slackwater::PollOutcome;
    ///
    /// let outcome: PollOutcome<_, String> = PollOutcome::Done(5);
    /// assert_eq!(outcome.map(|x| x * 2), PollOutcome::Done(10));
    ///
    /// let outcome: PollOutcome<_, String> = PollOutcome::PendingWith(5);
    /// assert_eq!(outcome.map(|x| x * 2), PollOutcome::PendingWith(10));
    /// ```
    #[inline]
    pub fn map<U, F>(self, f: F) -> PollOutcome<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            PollOutcome::Done(value) => PollOutcome::Done(f(value)),
            PollOutcome::Pending => PollOutcome::Pending,
            PollOutcome::PendingWith(value) => PollOutcome::PendingWith(f(value)),
            PollOutcome::Failed(error) => PollOutcome::Failed(error),
        }
    }

    /// Transform the error carried by `Failed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use slackwater::PollOutcome;
    ///
    /// let outcome: PollOutcome<i32, _> = PollOutcome::Failed("boom");
    /// assert_eq!(
    ///     outcome.map_failed(|e| e.to_string()),
    ///     PollOutcome::Failed("boom".to_string())
    /// );
    /// ```
    #[inline]
    pub fn map_failed<F2, F>(self, f: F) -> PollOutcome<T, F2>
    where
        F: FnOnce(E) -> F2,
    {
        match self {
            PollOutcome::Done(value) => PollOutcome::Done(value),
            PollOutcome::Pending => PollOutcome::Pending,
            PollOutcome::PendingWith(value) => PollOutcome::PendingWith(value),
            PollOutcome::Failed(error) => PollOutcome::Failed(f(error)),
        }
    }
}

/// Bridge for clients that signal "not ready" through a typed error.
///
/// `Ok` becomes `Done`, `Err` becomes `Failed`. Pair this with a policy
/// classifier that marks the not-ready error transient.
///
/// # Examples
///
/// ```
/// use slackwater::PollOutcome;
///
/// let outcome: PollOutcome<i32, String> = Ok::<_, String>(42).into();
/// assert_eq!(outcome, PollOutcome::Done(42));
///
/// let outcome: PollOutcome<i32, String> = Err::<i32, _>("not ready".to_string()).into();
/// assert!(outcome.is_failed());
/// ```
impl<T, E> From<Result<T, E>> for PollOutcome<T, E> {
    #[inline]
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => PollOutcome::Done(value),
            Err(error) => PollOutcome::Failed(error),
        }
    }
}
