//! Host collaborators the router talks to.
//!
//! The router never performs a screen transition itself. It asks a
//! [`Platform`] to do it and only commits state once the platform reports
//! success. Credential storage and user notifications are reached through
//! their own small traits so each can be swapped independently.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::router::Query;

/// A platform primitive rejected the request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct PlatformError {
    pub operation: &'static str,
    pub message: String,
}

impl PlatformError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// One entry of the host's live page stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Screen route as reported by the host, usually without a leading `/`.
    pub route: String,
    /// Query the page was opened with.
    pub query: Query,
}

impl PageInfo {
    /// Screen path with exactly one leading `/`.
    pub fn path(&self) -> String {
        format!("/{}", self.route.trim_start_matches('/'))
    }
}

/// Screen-stack manipulation primitives of the host environment.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Open a new screen on top of the stack.
    async fn navigate_to(&self, url: &str) -> Result<(), PlatformError>;

    /// Replace the top screen.
    async fn redirect_to(&self, url: &str) -> Result<(), PlatformError>;

    /// Switch to a tab page.
    async fn switch_tab(&self, url: &str) -> Result<(), PlatformError>;

    /// Pop `delta` screens.
    async fn navigate_back(&self, delta: usize) -> Result<(), PlatformError>;

    /// Replace the entire stack with a single screen.
    async fn relaunch(&self, url: &str) -> Result<(), PlatformError>;

    /// Live page stack, bottom first.
    async fn current_pages(&self) -> Result<Vec<PageInfo>, PlatformError>;

    async fn set_navigation_bar_title(&self, title: &str) -> Result<(), PlatformError>;
}

/// Key-value persistence used for the session token.
pub trait CredentialStore: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// User-facing toast surface.
pub trait Notifier: Send + Sync {
    fn show_message(&self, text: &str);
}

/// Notifier that only writes messages to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_message(&self, text: &str) {
        tracing::info!(message = %text, "User notification");
    }
}
