//! The navigation engine.
//!
//! Every navigation attempt moves through
//! `Resolving -> GuardApproval -> PlatformTransition -> Committed` and
//! either commits completely or leaves the current route and history
//! untouched. Attempts are serialized by a FIFO lock, so overlapping calls
//! queue up instead of interleaving their side effects. A guard redirect
//! ends its attempt and joins that queue as a new push.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{ConfigError, RouterConfig, RouterSettings};
use crate::platform::memory::MemoryCredentialStore;
use crate::platform::{CredentialStore, LogNotifier, Notifier, Platform, PlatformError};
use crate::router::error::NavigationError;
use crate::router::guard::{
    run_guards, AfterGuard, GuardHandle, GuardList, GuardOutcome, NavigationGuard,
};
use crate::router::guards::{has_token, AuthGuard, TitleGuard, TransitionLogger};
use crate::router::history::History;
use crate::router::route::{Route, RouteLocation};
use crate::router::table::{RouteTable, RouteTableError};

type NavigationFuture<'a> = Pin<Box<dyn Future<Output = Result<Route, NavigationError>> + Send + 'a>>;

/// Errors raised while building a router.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    RouteTable(#[from] RouteTableError),

    #[error("A host platform must be provided")]
    MissingPlatform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavigationKind {
    Push,
    Replace,
    Relaunch,
}

impl NavigationKind {
    fn as_str(self) -> &'static str {
        match self {
            NavigationKind::Push => "push",
            NavigationKind::Replace => "replace",
            NavigationKind::Relaunch => "relaunch",
        }
    }
}

/// How an attempt that held the navigation lock ended.
enum Attempt {
    Committed(Route),
    Failed(NavigationError),
    Redirect { interrupted: Route, target: RouteLocation },
}

/// Assembles a [`Router`] from configuration and host collaborators.
pub struct RouterBuilder {
    config: RouterConfig,
    platform: Option<Arc<dyn Platform>>,
    credentials: Option<Arc<dyn CredentialStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    global_guards: bool,
}

impl RouterBuilder {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            platform: None,
            credentials: None,
            notifier: None,
            global_guards: true,
        }
    }

    pub fn platform(mut self, platform: Arc<dyn Platform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Defaults to an empty in-memory store.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Defaults to a notifier that only logs.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Skip the authentication, title and transition-log guards.
    pub fn without_global_guards(mut self) -> Self {
        self.global_guards = false;
        self
    }

    /// Validate the configuration, register the global guards and seed the
    /// current route from the host page stack.
    ///
    /// The page-stack probe is awaited here, so the returned router never
    /// navigates against an uninitialized current route. A failing probe is
    /// logged and leaves the current route empty.
    pub async fn build(self) -> Result<Router, BuildError> {
        let platform = self.platform.ok_or(BuildError::MissingPlatform)?;
        self.config.validate()?;
        let table = RouteTable::new(self.config.routes)?;
        let settings = self.config.router;

        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));
        let (current, _) = watch::channel(None);

        let router = Router {
            inner: Arc::new(RouterInner {
                history: RwLock::new(History::new(settings.history_limit)),
                table,
                platform: Arc::clone(&platform),
                credentials: Arc::clone(&credentials),
                notifier: Arc::clone(&notifier),
                before_guards: GuardList::new(),
                after_guards: GuardList::new(),
                current,
                navigation: Mutex::new(()),
                pending_redirects: watch::channel(0).0,
                settings,
            }),
        };

        if self.global_guards {
            let _ = router.register_before_guard(AuthGuard::new(
                credentials,
                notifier,
                router.inner.settings.login.clone(),
                router.inner.settings.auth_message.clone(),
            ));
            let _ = router.register_before_guard(TitleGuard::new(platform));
            let _ = router.register_after_guard(TransitionLogger);
        }

        if let Err(e) = router.probe().await {
            tracing::warn!(error = %e, "Initial page stack probe failed");
        }

        tracing::info!(
            routes = router.inner.table.len(),
            current = router.current_route().map(|r| r.path).unwrap_or_default(),
            "Router initialized"
        );

        Ok(router)
    }
}

struct RouterInner {
    table: RouteTable,
    settings: RouterSettings,
    platform: Arc<dyn Platform>,
    credentials: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    before_guards: Arc<GuardList<dyn NavigationGuard>>,
    after_guards: Arc<GuardList<dyn AfterGuard>>,
    history: RwLock<History>,
    /// Published current route. Only navigation operations write to it.
    current: watch::Sender<Option<Route>>,
    /// Held for the whole duration of a navigation attempt.
    navigation: Mutex<()>,
    /// Redirect pushes queued by guards and not finished yet.
    pending_redirects: watch::Sender<usize>,
}

/// Navigation router.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    pub fn builder(config: RouterConfig) -> RouterBuilder {
        RouterBuilder::new(config)
    }

    /// Open the target as a new screen (or switch to it if it is a tab page).
    pub async fn push(&self, location: impl Into<RouteLocation>) -> Result<Route, NavigationError> {
        self.navigate(NavigationKind::Push, location.into(), 0).await
    }

    /// Replace the current screen with the target.
    pub async fn replace(
        &self,
        location: impl Into<RouteLocation>,
    ) -> Result<Route, NavigationError> {
        self.navigate(NavigationKind::Replace, location.into(), 0).await
    }

    /// Reset the whole screen stack to the target. Guards do not run.
    pub async fn relaunch(
        &self,
        location: impl Into<RouteLocation>,
    ) -> Result<Route, NavigationError> {
        self.navigate(NavigationKind::Relaunch, location.into(), 0).await
    }

    /// Relaunch to the configured home route.
    pub async fn relaunch_home(&self) -> Result<Route, NavigationError> {
        let home = RouteLocation::named(self.inner.settings.home.clone());
        self.relaunch(home).await
    }

    /// Pop `delta` screens.
    ///
    /// Returns the route now on top, or `None` when history ran out and the
    /// host page stack showed no known route.
    pub async fn back(&self, delta: usize) -> Result<Option<Route>, NavigationError> {
        if delta == 0 {
            return Err(NavigationError::InvalidDelta);
        }

        let span = tracing::info_span!("navigate", nav_id = %Uuid::new_v4(), kind = "back", delta);
        async {
            let _permit = self.inner.navigation.lock().await;

            if let Err(source) = self.inner.platform.navigate_back(delta).await {
                return Err(self.transition_failed(format!("back:{}", delta), source));
            }

            let tail = self.inner.history.write().truncate_back(delta).cloned();
            match tail {
                Some(route) => {
                    self.inner.current.send_replace(Some(route.clone()));
                    Ok(Some(route))
                }
                None => match self.probe().await {
                    Ok(route) => Ok(route),
                    Err(e) => {
                        tracing::warn!(error = %e, "Page stack probe after back failed");
                        Ok(self.current_route())
                    }
                },
            }
        }
        .instrument(span)
        .await
    }

    /// Re-read the current route from the host page stack.
    pub async fn sync_from_platform(&self) -> Result<Option<Route>, PlatformError> {
        let _permit = self.inner.navigation.lock().await;
        self.probe().await
    }

    /// Wait until every redirect queued by a guard has finished, including
    /// redirects those redirects queued in turn.
    pub async fn settle(&self) {
        let mut pending = self.inner.pending_redirects.subscribe();
        let _ = pending.wait_for(|pending| *pending == 0).await;
    }

    /// Register a before-guard at the end of the chain.
    pub fn register_before_guard(&self, guard: impl NavigationGuard + 'static) -> GuardHandle {
        self.inner.before_guards.add(Arc::new(guard))
    }

    /// Register an after-guard at the end of the chain.
    pub fn register_after_guard(&self, guard: impl AfterGuard + 'static) -> GuardHandle {
        self.inner.after_guards.add(Arc::new(guard))
    }

    pub fn before_guard_count(&self) -> usize {
        self.inner.before_guards.len()
    }

    pub fn after_guard_count(&self) -> usize {
        self.inner.after_guards.len()
    }

    /// Snapshot of the current route, if one is known.
    pub fn current_route(&self) -> Option<Route> {
        self.inner.current.borrow().clone()
    }

    /// Observe the current route. A new value is published on every commit.
    pub fn subscribe(&self) -> watch::Receiver<Option<Route>> {
        self.inner.current.subscribe()
    }

    /// Committed routes, oldest first.
    pub fn history(&self) -> Vec<Route> {
        self.inner.history.read().to_vec()
    }

    pub fn is_logged_in(&self) -> bool {
        has_token(self.inner.credentials.as_ref())
    }

    pub fn table(&self) -> &RouteTable {
        &self.inner.table
    }

    fn navigate(
        &self,
        kind: NavigationKind,
        location: RouteLocation,
        depth: u32,
    ) -> NavigationFuture<'_> {
        let span = tracing::info_span!(
            "navigate",
            nav_id = %Uuid::new_v4(),
            kind = kind.as_str(),
            depth
        );
        Box::pin(
            async move {
                let attempt = {
                    let _permit = self.inner.navigation.lock().await;
                    self.attempt(kind, location).await
                };

                match attempt {
                    Attempt::Committed(route) => Ok(route),
                    Attempt::Failed(e) => Err(e),
                    Attempt::Redirect {
                        interrupted,
                        target,
                    } => Err(self.queue_redirect(interrupted, target, depth)),
                }
            }
            .instrument(span),
        )
    }

    /// One attempt, with the navigation lock already held.
    async fn attempt(&self, kind: NavigationKind, location: RouteLocation) -> Attempt {
        let Some(to) = self.inner.table.resolve(&location) else {
            tracing::error!(location = %location, "No route matches location");
            return Attempt::Failed(NavigationError::ResolutionFailed {
                location: location.to_string(),
            });
        };
        let from = self.current_route();

        if kind != NavigationKind::Relaunch {
            let guards = self.inner.before_guards.snapshot();
            let timeout = Duration::from_millis(self.inner.settings.guard_timeout_ms);

            match run_guards(&to, from.as_ref(), &guards, timeout).await {
                GuardOutcome::Proceed => {}
                GuardOutcome::Reject(reason) => {
                    return Attempt::Failed(NavigationError::GuardRejected {
                        route: to.name,
                        reason,
                    });
                }
                GuardOutcome::Redirect(target) => {
                    return Attempt::Redirect {
                        interrupted: to,
                        target,
                    };
                }
            }
        }

        if let Err(e) = self.transition(kind, &to).await {
            return Attempt::Failed(e);
        }
        self.commit(kind, &to, from.as_ref());
        Attempt::Committed(to)
    }

    /// Queue the redirect push as a separate attempt and produce the error
    /// the interrupted attempt reports.
    ///
    /// The push starts only after the interrupted attempt released the
    /// navigation lock, so its caller sees the state the attempt started with.
    fn queue_redirect(
        &self,
        interrupted: Route,
        target: RouteLocation,
        depth: u32,
    ) -> NavigationError {
        let limit = self.inner.settings.max_redirects;
        if depth >= limit {
            tracing::warn!(limit, to = %interrupted.name, "Redirect limit exceeded");
            return NavigationError::RedirectLimit { limit };
        }

        let description = target.to_string();
        let router = self.clone();
        self.inner.pending_redirects.send_modify(|pending| *pending += 1);
        tokio::spawn(async move {
            match router.navigate(NavigationKind::Push, target, depth + 1).await {
                Ok(route) => tracing::debug!(to = %route.name, "Redirect committed"),
                Err(NavigationError::Redirected { .. }) => {}
                Err(e) => tracing::warn!(error = %e, "Redirect failed"),
            }
            router
                .inner
                .pending_redirects
                .send_modify(|pending| *pending -= 1);
        });

        NavigationError::Redirected {
            from: interrupted.name,
            to: description,
        }
    }

    async fn transition(&self, kind: NavigationKind, to: &Route) -> Result<(), NavigationError> {
        let platform = &self.inner.platform;
        let (url, result) = match kind {
            NavigationKind::Push | NavigationKind::Replace if to.meta.tab_bar => {
                (to.path.clone(), platform.switch_tab(&to.path).await)
            }
            NavigationKind::Push => (to.full_path.clone(), platform.navigate_to(&to.full_path).await),
            NavigationKind::Replace => (to.full_path.clone(), platform.redirect_to(&to.full_path).await),
            NavigationKind::Relaunch => (to.full_path.clone(), platform.relaunch(&to.full_path).await),
        };

        result.map_err(|source| self.transition_failed(url, source))
    }

    fn transition_failed(&self, url: String, source: PlatformError) -> NavigationError {
        tracing::error!(url = %url, error = %source, "Platform transition failed");
        if self.inner.settings.notify_transition_failures {
            self.inner
                .notifier
                .show_message(&self.inner.settings.transition_failed_message);
        }
        NavigationError::TransitionFailed { url, source }
    }

    fn commit(&self, kind: NavigationKind, to: &Route, from: Option<&Route>) {
        {
            let mut history = self.inner.history.write();
            match kind {
                NavigationKind::Push => history.push(to.clone()),
                NavigationKind::Replace => history.replace_last(to.clone()),
                NavigationKind::Relaunch => history.reset(to.clone()),
            }
        }
        self.inner.current.send_replace(Some(to.clone()));

        if kind != NavigationKind::Relaunch {
            for guard in self.inner.after_guards.snapshot() {
                guard.after(to, from);
            }
        }
    }

    async fn probe(&self) -> Result<Option<Route>, PlatformError> {
        let pages = self.inner.platform.current_pages().await?;
        let Some(page) = pages.last() else {
            tracing::debug!("Host page stack is empty");
            return Ok(None);
        };

        let path = page.path();
        match self.inner.table.resolve_page(&path, page.query.clone()) {
            Some(route) => {
                self.inner.current.send_replace(Some(route.clone()));
                Ok(Some(route))
            }
            None => {
                tracing::debug!(path = %path, "Top page is not in the route table");
                Ok(None)
            }
        }
    }
}
