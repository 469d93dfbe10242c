use std::fmt;

use thiserror::Error;

use crate::platform::PlatformError;

/// Why the guard pipeline refused a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A guard called `abort`.
    Aborted,
    /// A guard finished without deciding.
    NextNotCalled,
    /// A guard did not decide within the guard timeout.
    TimedOut,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Aborted => write!(f, "aborted by guard"),
            RejectReason::NextNotCalled => write!(f, "guard did not call next"),
            RejectReason::TimedOut => write!(f, "guard timed out"),
        }
    }
}

/// Failure exits of a navigation attempt.
///
/// Every variant leaves the current route and history exactly as they were
/// before the attempt started. After `Redirected`, the redirect push runs
/// as its own queued attempt.
#[derive(Debug, Clone, Error)]
pub enum NavigationError {
    #[error("No route matches {location}")]
    ResolutionFailed { location: String },

    #[error("Navigation to '{route}' rejected: {reason}")]
    GuardRejected { route: String, reason: RejectReason },

    #[error("Navigation to '{from}' redirected to {to}")]
    Redirected { from: String, to: String },

    /// Returned by a redirect push once the chain grew too long.
    #[error("Redirect limit of {limit} exceeded")]
    RedirectLimit { limit: u32 },

    #[error("Transition to '{url}' failed: {source}")]
    TransitionFailed {
        url: String,
        #[source]
        source: PlatformError,
    },

    #[error("Back navigation needs a delta of at least 1")]
    InvalidDelta,
}

impl NavigationError {
    /// Whether the attempt was stopped by the guard pipeline.
    pub fn is_guard_failure(&self) -> bool {
        matches!(
            self,
            NavigationError::GuardRejected { .. }
                | NavigationError::Redirected { .. }
                | NavigationError::RedirectLimit { .. }
        )
    }
}
