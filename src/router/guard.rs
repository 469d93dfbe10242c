//! Navigation guards and the sequential guard pipeline.
//!
//! ```text
//! to, from ──→ guard 1 ──→ guard 2 ──→ ... ──→ Proceed
//!                 │            │
//!                 └── abort / redirect / no decision ──→ stop
//! ```
//!
//! Each guard receives a [`Next`] handle and must spend it exactly once.
//! Because `Next` is consumed by value, a second decision cannot be made;
//! a guard that drops it without deciding rejects the navigation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::oneshot;

use crate::router::error::RejectReason;
use crate::router::route::{Route, RouteLocation};

/// Future returned by a navigation guard.
pub type GuardFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// What a guard decided about the navigation in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Continue with the following guard.
    Proceed,
    /// Abort the whole navigation.
    Abort,
    /// Abort and start a new push to this location.
    Redirect(RouteLocation),
}

/// One-shot continuation handed to every guard.
pub struct Next {
    tx: oneshot::Sender<GuardDecision>,
}

impl Next {
    fn channel() -> (Self, oneshot::Receiver<GuardDecision>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn proceed(self) {
        self.call(GuardDecision::Proceed);
    }

    pub fn abort(self) {
        self.call(GuardDecision::Abort);
    }

    pub fn redirect(self, location: impl Into<RouteLocation>) {
        self.call(GuardDecision::Redirect(location.into()));
    }

    pub fn call(self, decision: GuardDecision) {
        // The pipeline may have stopped listening after a timeout.
        let _ = self.tx.send(decision);
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// A check that runs before a navigation is handed to the platform.
///
/// `to` and `from` are snapshots owned by the guard.
pub trait NavigationGuard: Send + Sync {
    fn check<'a>(&'a self, to: Route, from: Option<Route>, next: Next) -> GuardFuture<'a>;
}

impl<F, Fut> NavigationGuard for F
where
    F: Fn(Route, Option<Route>, Next) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn check<'a>(&'a self, to: Route, from: Option<Route>, next: Next) -> GuardFuture<'a> {
        Box::pin(self(to, from, next))
    }
}

/// Pins down closure argument types for use as a [`NavigationGuard`].
///
/// ```ignore
/// router.register_before_guard(guard_fn(|to, _from, next| async move {
///     if to.meta.auth { next.abort() } else { next.proceed() }
/// }));
/// ```
pub fn guard_fn<F, Fut>(f: F) -> F
where
    F: Fn(Route, Option<Route>, Next) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    f
}

/// An observer run after a navigation has been committed.
pub trait AfterGuard: Send + Sync {
    fn after(&self, to: &Route, from: Option<&Route>);
}

impl<F> AfterGuard for F
where
    F: Fn(&Route, Option<&Route>) + Send + Sync,
{
    fn after(&self, to: &Route, from: Option<&Route>) {
        self(to, from)
    }
}

/// Pins down closure argument types for use as an [`AfterGuard`].
pub fn after_fn<F>(f: F) -> F
where
    F: Fn(&Route, Option<&Route>) + Send + Sync,
{
    f
}

/// Disposer returned by guard registration.
///
/// Dropping the handle keeps the guard registered; call [`GuardHandle::dispose`]
/// to remove it.
pub struct GuardHandle {
    remove: Box<dyn FnOnce() -> bool + Send + Sync>,
}

impl GuardHandle {
    /// Unregister the guard. Returns false if it was already gone.
    pub fn dispose(self) -> bool {
        (self.remove)()
    }
}

impl fmt::Debug for GuardHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardHandle").finish_non_exhaustive()
    }
}

/// Ordered, mutable list of registered guards.
pub(crate) struct GuardList<T: ?Sized> {
    next_id: AtomicU64,
    entries: RwLock<Vec<(u64, Arc<T>)>>,
}

impl<T: ?Sized + Send + Sync + 'static> GuardList<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(0),
            entries: RwLock::new(Vec::new()),
        })
    }

    pub(crate) fn add(self: &Arc<Self>, guard: Arc<T>) -> GuardHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.write().push((id, guard));

        let list: Weak<Self> = Arc::downgrade(self);
        GuardHandle {
            remove: Box::new(move || list.upgrade().is_some_and(|list| list.remove(id))),
        }
    }

    fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.write();
        match entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Guards in registration order, detached from later changes.
    pub(crate) fn snapshot(&self) -> Vec<Arc<T>> {
        self.entries
            .read()
            .iter()
            .map(|(_, guard)| Arc::clone(guard))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// Result of running the before-guard chain.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    Proceed,
    Reject(RejectReason),
    Redirect(RouteLocation),
}

/// Run guards one at a time, in order.
///
/// Each guard's future is awaited to completion before its decision is
/// read, and the next guard only starts afterwards. A guard that hands
/// `Next` to another task is given until `timeout` to decide.
pub async fn run_guards(
    to: &Route,
    from: Option<&Route>,
    guards: &[Arc<dyn NavigationGuard>],
    timeout: Duration,
) -> GuardOutcome {
    for (index, guard) in guards.iter().enumerate() {
        let (next, decision) = Next::channel();

        let settled = tokio::time::timeout(timeout, async {
            guard.check(to.clone(), from.cloned(), next).await;
            decision.await
        })
        .await;

        match settled {
            Ok(Ok(GuardDecision::Proceed)) => continue,
            Ok(Ok(GuardDecision::Abort)) => {
                tracing::debug!(guard = index, to = %to.path, "Navigation aborted by guard");
                return GuardOutcome::Reject(RejectReason::Aborted);
            }
            Ok(Ok(GuardDecision::Redirect(location))) => {
                tracing::debug!(guard = index, to = %to.path, redirect = %location, "Guard redirected navigation");
                return GuardOutcome::Redirect(location);
            }
            Ok(Err(_)) => {
                tracing::warn!(guard = index, to = %to.path, "Navigation guard finished without calling next");
                return GuardOutcome::Reject(RejectReason::NextNotCalled);
            }
            Err(_) => {
                tracing::warn!(
                    guard = index,
                    to = %to.path,
                    timeout_ms = timeout.as_millis() as u64,
                    "Navigation guard timed out"
                );
                return GuardOutcome::Reject(RejectReason::TimedOut);
            }
        }
    }

    GuardOutcome::Proceed
}
