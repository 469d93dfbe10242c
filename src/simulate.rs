//! Scripted navigation against the in-memory host.
//!
//! The simulated app starts on the home screen, exactly as a freshly
//! launched mini-program would, and then replays the given steps.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::RouterConfig;
use crate::platform::memory::{MemoryCredentialStore, MemoryPlatform, PlatformCall, RecordingNotifier};
use crate::platform::PageInfo;
use crate::router::{BuildError, Router, RouteLocation};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StepParseError {
    #[error("Unknown step '{0}'")]
    UnknownStep(String),

    #[error("Step '{step}' needs a target")]
    MissingTarget { step: String },

    #[error("Invalid back delta '{0}'")]
    InvalidDelta(String),
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Push(RouteLocation),
    Replace(RouteLocation),
    Back(usize),
    Relaunch(Option<RouteLocation>),
    Login(String),
    Logout,
}

impl FromStr for Step {
    type Err = StepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verb, arg) = match s.split_once(':') {
            Some((verb, arg)) => (verb, Some(arg).filter(|a| !a.is_empty())),
            None => (s, None),
        };

        let target = |step: &str| {
            arg.map(RouteLocation::parse)
                .ok_or_else(|| StepParseError::MissingTarget {
                    step: step.to_string(),
                })
        };

        match verb {
            "push" => Ok(Step::Push(target("push")?)),
            "replace" => Ok(Step::Replace(target("replace")?)),
            "back" => match arg {
                None => Ok(Step::Back(1)),
                Some(n) => n
                    .parse()
                    .map(Step::Back)
                    .map_err(|_| StepParseError::InvalidDelta(n.to_string())),
            },
            "relaunch" => Ok(Step::Relaunch(arg.map(RouteLocation::parse))),
            "login" => Ok(Step::Login(
                arg.ok_or_else(|| StepParseError::MissingTarget {
                    step: "login".to_string(),
                })?
                .to_string(),
            )),
            "logout" => Ok(Step::Logout),
            _ => Err(StepParseError::UnknownStep(s.to_string())),
        }
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub ok: bool,
    /// Full path of the route on top after the step, if known.
    pub route: Option<String>,
    pub error: Option<String>,
}

/// Everything observed during a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub steps: Vec<StepReport>,
    pub current: Option<String>,
    pub history: Vec<String>,
    pub notifications: Vec<String>,
    pub title: Option<String>,
    pub platform_calls: Vec<String>,
}

/// Build a router over a fresh in-memory host and replay `steps`.
pub async fn run(
    config: RouterConfig,
    token: Option<String>,
    steps: &[(String, Step)],
) -> Result<SimulationReport, BuildError> {
    let home_path = config
        .routes
        .iter()
        .find(|r| r.name == config.router.home)
        .map(|r| r.path.clone())
        .unwrap_or_default();

    let platform = Arc::new(MemoryPlatform::with_pages(vec![PageInfo {
        route: home_path.trim_start_matches('/').to_string(),
        query: Default::default(),
    }]));
    let credentials = Arc::new(match token {
        Some(token) => MemoryCredentialStore::with_token(token),
        None => MemoryCredentialStore::new(),
    });
    let notifier = Arc::new(RecordingNotifier::new());

    let router = Router::builder(config)
        .platform(platform.clone())
        .credentials(credentials.clone())
        .notifier(notifier.clone())
        .build()
        .await?;

    let mut reports = Vec::with_capacity(steps.len());
    for (raw, step) in steps {
        let result = match step {
            Step::Push(location) => router.push(location.clone()).await.map(Some),
            Step::Replace(location) => router.replace(location.clone()).await.map(Some),
            Step::Back(delta) => router.back(*delta).await,
            Step::Relaunch(Some(location)) => router.relaunch(location.clone()).await.map(Some),
            Step::Relaunch(None) => router.relaunch_home().await.map(Some),
            Step::Login(token) => {
                credentials.set_token(token.clone());
                Ok(router.current_route())
            }
            Step::Logout => {
                credentials.clear();
                Ok(router.current_route())
            }
        };
        // A guard redirect finishes in the background; the next step must see it.
        router.settle().await;

        reports.push(match result {
            Ok(route) => StepReport {
                step: raw.clone(),
                ok: true,
                route: route.map(|r| r.full_path),
                error: None,
            },
            Err(e) => StepReport {
                step: raw.clone(),
                ok: false,
                route: router.current_route().map(|r| r.full_path),
                error: Some(e.to_string()),
            },
        });
    }

    Ok(SimulationReport {
        steps: reports,
        current: router.current_route().map(|r| r.full_path),
        history: router.history().into_iter().map(|r| r.full_path).collect(),
        notifications: notifier.messages(),
        title: platform.title(),
        platform_calls: platform
            .transitions()
            .iter()
            .map(describe_call)
            .collect(),
    })
}

fn describe_call(call: &PlatformCall) -> String {
    match call {
        PlatformCall::NavigateTo(url)
        | PlatformCall::RedirectTo(url)
        | PlatformCall::SwitchTab(url)
        | PlatformCall::Relaunch(url)
        | PlatformCall::SetTitle(url) => format!("{}({})", call.operation(), url),
        PlatformCall::NavigateBack(delta) => format!("{}({})", call.operation(), delta),
        PlatformCall::CurrentPages => call.operation().to_string(),
    }
}

impl SimulationReport {
    /// Plain-text rendering for terminal output.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            let status = if step.ok { "ok" } else { "failed" };
            out.push_str(&format!("{:<24} {}", step.step, status));
            if let Some(route) = &step.route {
                out.push_str(&format!("  [{}]", route));
            }
            if let Some(error) = &step.error {
                out.push_str(&format!("  {}", error));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "current: {}\n",
            self.current.as_deref().unwrap_or("(none)")
        ));
        out.push_str(&format!("history: {}\n", self.history.join(" -> ")));
        if let Some(title) = &self.title {
            out.push_str(&format!("title: {}\n", title));
        }
        for message in &self.notifications {
            out.push_str(&format!("notification: {}\n", message));
        }
        out.push_str(&format!("platform: {}\n", self.platform_calls.join(", ")));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps() {
        assert_eq!(
            "push:profile".parse::<Step>().unwrap(),
            Step::Push(RouteLocation::named("profile"))
        );
        assert_eq!("back".parse::<Step>().unwrap(), Step::Back(1));
        assert_eq!("back:3".parse::<Step>().unwrap(), Step::Back(3));
        assert_eq!("relaunch".parse::<Step>().unwrap(), Step::Relaunch(None));
        assert_eq!("logout".parse::<Step>().unwrap(), Step::Logout);
        assert_eq!(
            "replace:/pages/message/index?id=7".parse::<Step>().unwrap(),
            Step::Replace(RouteLocation::path("/pages/message/index").with_query("id", "7"))
        );
    }

    #[test]
    fn rejects_bad_steps() {
        assert!(matches!(
            "push".parse::<Step>(),
            Err(StepParseError::MissingTarget { .. })
        ));
        assert!(matches!(
            "back:x".parse::<Step>(),
            Err(StepParseError::InvalidDelta(_))
        ));
        assert!(matches!(
            "jump:home".parse::<Step>(),
            Err(StepParseError::UnknownStep(_))
        ));
    }

    #[tokio::test]
    async fn protected_tab_redirects_to_login() {
        let steps = vec![("push:message".to_string(), Step::Push(RouteLocation::named("message")))];
        let report = run(RouterConfig::default(), None, &steps).await.unwrap();

        assert!(!report.steps[0].ok);
        assert_eq!(
            report.current.as_deref(),
            Some("/pages/login/index?redirect=message")
        );
        assert_eq!(report.notifications, vec!["Please log in first".to_string()]);
    }

    #[tokio::test]
    async fn render_lists_each_step() {
        let steps = vec![
            ("push:findHouse".to_string(), Step::Push(RouteLocation::named("findHouse"))),
            ("relaunch".to_string(), Step::Relaunch(None)),
        ];
        let report = run(RouterConfig::default(), None, &steps).await.unwrap();
        let text = report.render();
        assert!(text.contains("push:findHouse"));
        assert!(text.contains("current: /pages/index/index"));
        assert!(text.contains("switchTab(/pages/findHouse/index)"));
    }
}
