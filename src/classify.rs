//! Error classification for probe failures.
//!
//! A probe that returns [`PollOutcome::Failed`](crate::PollOutcome::Failed)
//! has not necessarily failed for good. A 404 from a service that creates
//! resources asynchronously usually means "not there yet"; a 403 means the
//! wait will never succeed. The classifier turns that judgement into an
//! explicit, testable mapping instead of scattering it across call sites.
//!
//! The default classifier, [`FatalByDefault`], treats every error as fatal.
//! Opt errors into retrying with
//! [`WaitPolicy::transient_if`](crate::WaitPolicy::transient_if) or supply a
//! full mapping with [`ClassifyFn`].
//!
//! # Examples
//!
//! ```
//! use slackwater::{Classify, ClassifyFn, Verdict};
//!
//! #[derive(Debug)]
//! enum ApiError {
//!     NotFound,
//!     RateLimited,
//!     Forbidden,
//! }
//!
//! let classifier = ClassifyFn(|error: &ApiError| match error {
//!     ApiError::NotFound | ApiError::RateLimited => Verdict::Transient,
//!     ApiError::Forbidden => Verdict::Fatal,
//! });
//!
//! assert_eq!(classifier.classify(&ApiError::NotFound), Verdict::Transient);
//! assert_eq!(classifier.classify(&ApiError::Forbidden), Verdict::Fatal);
//! ```

use std::fmt;

/// The classification of a probe error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verdict {
    /// Expected while the system converges; retry after the next delay.
    Transient,
    /// Unrecoverable; abort the wait and surface the error immediately.
    Fatal,
}

impl Verdict {
    /// Check if this verdict allows another attempt.
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Verdict::Transient)
    }

    /// Check if this verdict aborts the wait.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Verdict::Fatal)
    }
}

/// Maps probe errors to a [`Verdict`].
///
/// Implementations should be cheap and side-effect free; the waiter calls
/// `classify` once per failed probe.
pub trait Classify<E> {
    /// Judge a probe error.
    fn classify(&self, error: &E) -> Verdict;
}

impl<E, C> Classify<E> for &C
where
    C: Classify<E> + ?Sized,
{
    fn classify(&self, error: &E) -> Verdict {
        (**self).classify(error)
    }
}

/// The default classifier: every probe error is fatal.
///
/// Silent retries on unexpected errors hide real failures until the timeout
/// fires, so nothing is retried unless the policy says so.
///
/// # Examples
///
/// ```
/// use slackwater::{Classify, FatalByDefault, Verdict};
///
/// assert_eq!(FatalByDefault.classify(&"anything"), Verdict::Fatal);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FatalByDefault;

impl<E> Classify<E> for FatalByDefault {
    fn classify(&self, _error: &E) -> Verdict {
        Verdict::Fatal
    }
}

/// Classifier built from a "this error is transient" predicate.
///
/// Errors matching the predicate are retried; everything else is fatal.
/// Usually constructed through
/// [`WaitPolicy::transient_if`](crate::WaitPolicy::transient_if).
///
/// # Examples
///
/// ```
/// use slackwater::{Classify, TransientIf, Verdict};
///
/// let classifier = TransientIf(|error: &u16| *error == 404 || *error == 429);
///
/// assert_eq!(classifier.classify(&404), Verdict::Transient);
/// assert_eq!(classifier.classify(&500), Verdict::Fatal);
/// ```
#[derive(Clone, Copy)]
pub struct TransientIf<F>(pub F);

impl<E, F> Classify<E> for TransientIf<F>
where
    F: Fn(&E) -> bool,
{
    fn classify(&self, error: &E) -> Verdict {
        if (self.0)(error) {
            Verdict::Transient
        } else {
            Verdict::Fatal
        }
    }
}

impl<F> fmt::Debug for TransientIf<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TransientIf").finish()
    }
}

/// Classifier built from a full error-to-verdict mapping.
///
/// Use this when the transient set is easier to express as a match over the
/// error type than as a predicate.
#[derive(Clone, Copy)]
pub struct ClassifyFn<F>(pub F);

impl<E, F> Classify<E> for ClassifyFn<F>
where
    F: Fn(&E) -> Verdict,
{
    fn classify(&self, error: &E) -> Verdict {
        (self.0)(error)
    }
}

impl<F> fmt::Debug for ClassifyFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassifyFn").finish()
    }
}

#[cfg(test)]
mod classify_tests {
    use super::*;

    #[test]
    fn test_fatal_by_default() {
        let classifier = FatalByDefault;
        assert_eq!(classifier.classify(&"err"), Verdict::Fatal);
        assert_eq!(classifier.classify(&0u8), Verdict::Fatal);
    }

    #[test]
    fn test_transient_if_predicate() {
        let classifier = TransientIf(|e: &i32| *e < 0);
        assert_eq!(classifier.classify(&-1), Verdict::Transient);
        assert_eq!(classifier.classify(&1), Verdict::Fatal);
    }

    #[test]
    fn test_classify_fn_mapping() {
        #[derive(Debug)]
        enum E {
            Soft,
            Hard,
        }

        let classifier = ClassifyFn(|e: &E| match e {
            E::Soft => Verdict::Transient,
            E::Hard => Verdict::Fatal,
        });

        assert_eq!(classifier.classify(&E::Soft), Verdict::Transient);
        assert_eq!(classifier.classify(&E::Hard), Verdict::Fatal);
    }

    #[test]
    fn test_classify_through_reference() {
        let classifier = TransientIf(|e: &i32| *e == 0);
        let by_ref = &classifier;
        assert_eq!(by_ref.classify(&0), Verdict::Transient);
    }

    #[test]
    fn test_verdict_predicates() {
        assert!(Verdict::Transient.is_transient());
        assert!(!Verdict::Transient.is_fatal());
        assert!(Verdict::Fatal.is_fatal());
        assert!(!Verdict::Fatal.is_transient());
    }
}
