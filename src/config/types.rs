use serde::{Deserialize, Serialize};

/// Root configuration container: router settings plus the static route table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub router: RouterSettings,
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteDefinition>,
}

/// Behavioural settings for the router engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSettings {
    /// Route name used by `relaunch` when no target is given.
    #[serde(default = "default_home")]
    pub home: String,
    /// Route name the authentication guard redirects to.
    #[serde(default = "default_login")]
    pub login: String,
    /// Upper bound for a single guard to reach a decision (default: 5000).
    #[serde(default = "default_guard_timeout_ms")]
    pub guard_timeout_ms: u64,
    /// Maximum chained redirects within one navigation (default: 5).
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
    /// Maximum number of history entries kept (default: 10).
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Message shown when a protected route is requested without a token.
    #[serde(default = "default_auth_message")]
    pub auth_message: String,
    /// Message shown when the platform rejects a transition.
    #[serde(default = "default_transition_failed_message")]
    pub transition_failed_message: String,
    /// Whether platform rejections are reported through the notifier.
    #[serde(default = "default_notify_transition_failures")]
    pub notify_transition_failures: bool,
}

/// Static metadata attached to a route definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMeta {
    /// Navigation bar title for the screen.
    #[serde(default)]
    pub title: Option<String>,
    /// Screen requires a stored credential token.
    #[serde(default)]
    pub auth: bool,
    /// Screen is a tab page, reached through the tab-switch primitive.
    #[serde(default)]
    pub tab_bar: bool,
    /// Screen should be kept alive by the host when hidden.
    #[serde(default)]
    pub keep_alive: bool,
}

/// One navigable destination of the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Platform screen path (e.g., "/pages/index/index").
    pub path: String,
    /// Unique symbolic name (e.g., "home").
    pub name: String,
    #[serde(default)]
    pub meta: RouteMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteDefinition>,
}

impl RouteDefinition {
    pub fn new(name: impl Into<String>, path: impl Into<String>, meta: RouteMeta) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            meta,
            children: Vec::new(),
        }
    }
}

fn default_home() -> String {
    "home".to_string()
}

fn default_login() -> String {
    "login".to_string()
}

fn default_guard_timeout_ms() -> u64 {
    5000
}

fn default_max_redirects() -> u32 {
    5
}

fn default_history_limit() -> usize {
    10
}

fn default_auth_message() -> String {
    "Please log in first".to_string()
}

fn default_transition_failed_message() -> String {
    "Navigation failed".to_string()
}

fn default_notify_transition_failures() -> bool {
    true
}

fn tab(name: &str, path: &str, title: &str, auth: bool) -> RouteDefinition {
    RouteDefinition::new(
        name,
        path,
        RouteMeta {
            title: Some(title.to_string()),
            auth,
            tab_bar: true,
            keep_alive: false,
        },
    )
}

fn default_routes() -> Vec<RouteDefinition> {
    vec![
        tab("home", "/pages/index/index", "Home", false),
        tab("findHouse", "/pages/findHouse/index", "Find a Home", false),
        tab("friendCircle", "/pages/friendCircle/index", "Friend Circle", true),
        tab("message", "/pages/message/index", "Messages", true),
        tab("profile", "/pages/profile/index", "Profile", false),
        RouteDefinition::new(
            "login",
            "/pages/login/index",
            RouteMeta {
                title: Some("Log In".to_string()),
                ..RouteMeta::default()
            },
        ),
    ]
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            home: default_home(),
            login: default_login(),
            guard_timeout_ms: default_guard_timeout_ms(),
            max_redirects: default_max_redirects(),
            history_limit: default_history_limit(),
            auth_message: default_auth_message(),
            transition_failed_message: default_transition_failed_message(),
            notify_transition_failures: default_notify_transition_failures(),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            router: RouterSettings::default(),
            routes: default_routes(),
        }
    }
}
