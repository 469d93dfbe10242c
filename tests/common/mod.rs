//! Shared test utilities: a small route table and a router wired to
//! in-memory collaborators.

#![allow(dead_code, unused_imports)]

use std::path::PathBuf;
use std::sync::Arc;

use pagerouter::config::{RouteDefinition, RouteMeta, RouterConfig, RouterSettings};
use pagerouter::platform::memory::{MemoryCredentialStore, MemoryPlatform, RecordingNotifier};
use pagerouter::platform::PageInfo;
use pagerouter::router::Router;
use tempfile::TempDir;

pub const HOME: &str = "/pages/index/index";
pub const LOGIN: &str = "/pages/login/index";
pub const PROFILE: &str = "/pages/profile/index";
pub const DETAIL: &str = "/pages/detail/index";
pub const SEARCH: &str = "/pages/search/index";
pub const MESSAGE: &str = "/pages/message/index";

fn meta(title: Option<&str>, auth: bool, tab_bar: bool) -> RouteMeta {
    RouteMeta {
        title: title.map(str::to_string),
        auth,
        tab_bar,
        keep_alive: false,
    }
}

/// Route table used across the integration tests.
pub fn test_config() -> RouterConfig {
    RouterConfig {
        router: RouterSettings {
            guard_timeout_ms: 500,
            ..RouterSettings::default()
        },
        routes: vec![
            RouteDefinition::new("home", HOME, meta(Some("Home"), false, true)),
            RouteDefinition::new("login", LOGIN, meta(Some("Log In"), false, false)),
            RouteDefinition::new("profile", PROFILE, meta(Some("Profile"), true, false)),
            RouteDefinition::new("detail", DETAIL, meta(Some("Detail"), false, false)),
            RouteDefinition::new("search", SEARCH, meta(None, false, false)),
            RouteDefinition::new("message", MESSAGE, meta(Some("Messages"), false, true)),
        ],
    }
}

pub fn page(path: &str) -> PageInfo {
    PageInfo {
        route: path.trim_start_matches('/').to_string(),
        query: Default::default(),
    }
}

/// A router plus handles to every collaborator it talks to.
pub struct Harness {
    pub router: Router,
    pub platform: Arc<MemoryPlatform>,
    pub credentials: Arc<MemoryCredentialStore>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Router over a host that starts on the home screen.
pub async fn harness() -> Harness {
    harness_with(test_config(), MemoryPlatform::with_pages(vec![page(HOME)])).await
}

/// Router with no global guards, over a host that starts on the home screen.
pub async fn bare_harness() -> Harness {
    let platform = Arc::new(MemoryPlatform::with_pages(vec![page(HOME)]));
    let credentials = Arc::new(MemoryCredentialStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let router = Router::builder(test_config())
        .platform(platform.clone())
        .credentials(credentials.clone())
        .notifier(notifier.clone())
        .without_global_guards()
        .build()
        .await
        .expect("router should build");

    Harness {
        router,
        platform,
        credentials,
        notifier,
    }
}

pub async fn harness_with(config: RouterConfig, platform: MemoryPlatform) -> Harness {
    let platform = Arc::new(platform);
    let credentials = Arc::new(MemoryCredentialStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let router = Router::builder(config)
        .platform(platform.clone())
        .credentials(credentials.clone())
        .notifier(notifier.clone())
        .build()
        .await
        .expect("router should build");

    Harness {
        router,
        platform,
        credentials,
        notifier,
    }
}

/// Write a route table file into a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("routes.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

pub fn history_paths(router: &Router) -> Vec<String> {
    router.history().into_iter().map(|r| r.full_path).collect()
}
