mod common;

use common::temp_config;
use pagerouter::config::{ConfigError, RouterConfig};

/// Test that RouterConfig::default() carries the stock tab layout.
#[test]
fn test_config_default_values() {
    let config = RouterConfig::default();

    assert_eq!(config.router.home, "home");
    assert_eq!(config.router.login, "login");
    assert_eq!(config.router.guard_timeout_ms, 5000);
    assert_eq!(config.router.max_redirects, 5);
    assert_eq!(config.router.history_limit, 10);
    assert_eq!(config.router.auth_message, "Please log in first");
    assert!(config.router.notify_transition_failures);

    let names: Vec<&str> = config.routes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["home", "findHouse", "friendCircle", "message", "profile", "login"]
    );
    let login = config.routes.iter().find(|r| r.name == "login").unwrap();
    assert!(!login.meta.tab_bar);
    assert!(config
        .routes
        .iter()
        .filter(|r| r.name != "login")
        .all(|r| r.meta.tab_bar));
}

#[test]
fn test_config_path_ends_with_expected() {
    let path = RouterConfig::config_path();
    assert!(path.ends_with("pagerouter/routes.toml"));
}

#[test]
fn test_load_from_full_file() {
    let (_dir, path) = temp_config(
        r#"
[router]
home = "start"
login = "signin"
history_limit = 3
auth_message = "Sign in to continue"

[[routes]]
name = "start"
path = "/pages/start/index"
meta = { title = "Start", tab_bar = true }

[[routes]]
name = "signin"
path = "/pages/signin/index"

[[routes]]
name = "account"
path = "/pages/account/index"
meta = { auth = true, keep_alive = true }

[[routes.children]]
name = "accountEdit"
path = "/pages/account/edit"
"#,
    );

    let config = RouterConfig::load_from(&path).unwrap();

    assert_eq!(config.router.home, "start");
    assert_eq!(config.router.history_limit, 3);
    assert_eq!(config.router.auth_message, "Sign in to continue");
    assert_eq!(config.router.max_redirects, 5);
    assert_eq!(config.routes.len(), 3);

    let account = &config.routes[2];
    assert!(account.meta.auth);
    assert!(account.meta.keep_alive);
    assert_eq!(account.children.len(), 1);
    assert_eq!(account.children[0].name, "accountEdit");
    assert_eq!(config.routes[0].meta.title.as_deref(), Some("Start"));
}

#[test]
fn test_load_from_settings_only_keeps_default_routes() {
    let (_dir, path) = temp_config("[router]\nguard_timeout_ms = 250\n");

    let config = RouterConfig::load_from(&path).unwrap();

    assert_eq!(config.router.guard_timeout_ms, 250);
    assert_eq!(config.routes, RouterConfig::default().routes);
}

#[test]
fn test_load_from_invalid_toml() {
    let (_dir, path) = temp_config("[[routes]\nname = ");

    match RouterConfig::load_from(&path) {
        Err(ConfigError::ParseError { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

#[test]
fn test_load_from_missing_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        RouterConfig::load_from(&path),
        Err(ConfigError::ReadError { .. })
    ));
}

#[test]
fn test_duplicate_route_name_fails_validation() {
    let (_dir, path) = temp_config(
        r#"
[[routes]]
name = "home"
path = "/pages/index/index"

[[routes]]
name = "login"
path = "/pages/login/index"

[[routes.children]]
name = "home"
path = "/pages/login/other"
"#,
    );

    match RouterConfig::load_from(&path) {
        Err(ConfigError::ValidationError { message }) => {
            assert!(message.contains("Duplicate route name 'home'"));
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[test]
fn test_relative_path_fails_validation() {
    let (_dir, path) = temp_config(
        r#"
[[routes]]
name = "home"
path = "pages/index/index"

[[routes]]
name = "login"
path = "/pages/login/index"
"#,
    );

    assert!(matches!(
        RouterConfig::load_from(&path),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn test_unknown_home_route_fails_validation() {
    let (_dir, path) = temp_config("[router]\nhome = \"dashboard\"\n");

    let err = RouterConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("home route 'dashboard'"));
}

#[test]
fn test_zero_max_redirects_fails_validation() {
    let (_dir, path) = temp_config("[router]\nmax_redirects = 0\n");

    match RouterConfig::load_from(&path) {
        Err(ConfigError::ValidationError { message }) => {
            assert!(message.contains("max_redirects"));
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}
