//! Guards the router registers globally at build time.

use std::sync::Arc;

use crate::platform::{CredentialStore, Notifier, Platform};
use crate::router::guard::{AfterGuard, GuardFuture, NavigationGuard, Next};
use crate::router::route::{Route, RouteLocation};

/// Whether the store holds a usable session token.
pub fn has_token(store: &dyn CredentialStore) -> bool {
    store.token().is_some_and(|token| !token.is_empty())
}

/// Sends protected routes to the login screen when no token is stored.
///
/// The login location carries `redirect=<intended route name>` so the
/// login screen can return the user afterwards.
pub struct AuthGuard {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    login_route: String,
    message: String,
}

impl AuthGuard {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        login_route: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            login_route: login_route.into(),
            message: message.into(),
        }
    }
}

impl NavigationGuard for AuthGuard {
    fn check<'a>(&'a self, to: Route, _from: Option<Route>, next: Next) -> GuardFuture<'a> {
        Box::pin(async move {
            if !to.meta.auth || has_token(self.store.as_ref()) {
                next.proceed();
                return;
            }

            tracing::info!(route = %to.name, "Protected route requested without token");
            self.notifier.show_message(&self.message);
            next.redirect(
                RouteLocation::named(self.login_route.clone()).with_query("redirect", to.name),
            );
        })
    }
}

/// Applies `meta.title` to the host navigation bar.
///
/// A rejected title update is logged and does not block the navigation.
pub struct TitleGuard {
    platform: Arc<dyn Platform>,
}

impl TitleGuard {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }
}

impl NavigationGuard for TitleGuard {
    fn check<'a>(&'a self, to: Route, _from: Option<Route>, next: Next) -> GuardFuture<'a> {
        Box::pin(async move {
            if let Some(title) = &to.meta.title {
                if let Err(e) = self.platform.set_navigation_bar_title(title).await {
                    tracing::warn!(error = %e, route = %to.name, "Failed to set navigation bar title");
                }
            }
            next.proceed();
        })
    }
}

/// Logs every committed page switch.
pub struct TransitionLogger;

impl AfterGuard for TransitionLogger {
    fn after(&self, to: &Route, from: Option<&Route>) {
        tracing::info!(
            from = from.map(|r| r.path.as_str()).unwrap_or("(initial)"),
            to = %to.path,
            "Page switched"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteMeta;
    use crate::platform::memory::{MemoryCredentialStore, MemoryPlatform, RecordingNotifier};
    use crate::router::guard::{run_guards, GuardOutcome};
    use std::time::Duration;

    fn route(name: &str, meta: RouteMeta) -> Route {
        Route {
            path: format!("/pages/{}/index", name),
            full_path: format!("/pages/{}/index", name),
            name: name.to_string(),
            meta,
            query: Default::default(),
            params: Default::default(),
        }
    }

    fn auth_meta() -> RouteMeta {
        RouteMeta {
            auth: true,
            ..RouteMeta::default()
        }
    }

    #[tokio::test]
    async fn test_auth_guard_redirects_without_token() {
        let notifier = Arc::new(RecordingNotifier::new());
        let guard: Arc<dyn NavigationGuard> = Arc::new(AuthGuard::new(
            Arc::new(MemoryCredentialStore::new()),
            notifier.clone(),
            "login",
            "Please log in first",
        ));

        let outcome = run_guards(
            &route("profile", auth_meta()),
            None,
            &[guard],
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(
            outcome,
            GuardOutcome::Redirect(RouteLocation::named("login").with_query("redirect", "profile"))
        );
        assert_eq!(notifier.messages(), vec!["Please log in first".to_string()]);
    }

    #[tokio::test]
    async fn test_auth_guard_treats_empty_token_as_missing() {
        let guard: Arc<dyn NavigationGuard> = Arc::new(AuthGuard::new(
            Arc::new(MemoryCredentialStore::with_token("")),
            Arc::new(RecordingNotifier::new()),
            "login",
            "msg",
        ));
        let outcome = run_guards(&route("profile", auth_meta()), None, &[guard], Duration::from_secs(1)).await;
        assert!(matches!(outcome, GuardOutcome::Redirect(_)));
    }

    #[tokio::test]
    async fn test_auth_guard_passes_with_token() {
        let notifier = Arc::new(RecordingNotifier::new());
        let guard: Arc<dyn NavigationGuard> = Arc::new(AuthGuard::new(
            Arc::new(MemoryCredentialStore::with_token("abc")),
            notifier.clone(),
            "login",
            "msg",
        ));
        let outcome = run_guards(&route("profile", auth_meta()), None, &[guard], Duration::from_secs(1)).await;
        assert_eq!(outcome, GuardOutcome::Proceed);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_title_guard_sets_title_and_tolerates_failure() {
        let platform = Arc::new(MemoryPlatform::new());
        let guard: Arc<dyn NavigationGuard> = Arc::new(TitleGuard::new(platform.clone()));
        let meta = RouteMeta {
            title: Some("Messages".into()),
            ..RouteMeta::default()
        };

        let outcome = run_guards(&route("message", meta.clone()), None, &[guard.clone()], Duration::from_secs(1)).await;
        assert_eq!(outcome, GuardOutcome::Proceed);
        assert_eq!(platform.title().as_deref(), Some("Messages"));

        platform.fail_on("setNavigationBarTitle");
        let outcome = run_guards(&route("message", meta), None, &[guard], Duration::from_secs(1)).await;
        assert_eq!(outcome, GuardOutcome::Proceed);
        assert_eq!(platform.title().as_deref(), Some("Messages"));
    }
}
