//! In-memory host collaborators.
//!
//! `MemoryPlatform` keeps a page stack the way a mini-program host does,
//! records every primitive it receives and can be told to reject specific
//! operations. It backs the CLI simulator and the test suite.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use super::{CredentialStore, Notifier, PageInfo, Platform, PlatformError};
use crate::router::RouteLocation;

/// Page stack depth enforced by mini-program hosts.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// A primitive received by [`MemoryPlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    NavigateTo(String),
    RedirectTo(String),
    SwitchTab(String),
    NavigateBack(usize),
    Relaunch(String),
    CurrentPages,
    SetTitle(String),
}

impl PlatformCall {
    /// Name of the primitive, as used for failure injection.
    pub fn operation(&self) -> &'static str {
        match self {
            PlatformCall::NavigateTo(_) => "navigateTo",
            PlatformCall::RedirectTo(_) => "redirectTo",
            PlatformCall::SwitchTab(_) => "switchTab",
            PlatformCall::NavigateBack(_) => "navigateBack",
            PlatformCall::Relaunch(_) => "reLaunch",
            PlatformCall::CurrentPages => "getCurrentPages",
            PlatformCall::SetTitle(_) => "setNavigationBarTitle",
        }
    }
}

#[derive(Default)]
struct MemoryPlatformInner {
    stack: Vec<PageInfo>,
    calls: Vec<PlatformCall>,
    failing: HashSet<&'static str>,
    title: Option<String>,
}

/// Simulated host page stack.
pub struct MemoryPlatform {
    inner: Mutex<MemoryPlatformInner>,
    delay: Option<Duration>,
    max_depth: usize,
}

impl MemoryPlatform {
    /// Empty page stack.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryPlatformInner::default()),
            delay: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Page stack already holding the given pages (bottom first).
    pub fn with_pages(pages: Vec<PageInfo>) -> Self {
        let platform = Self::new();
        platform.inner.lock().stack = pages;
        platform
    }

    /// Sleep before answering each transition primitive.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Reject every future call of `operation` (e.g. "navigateTo").
    pub fn fail_on(&self, operation: &'static str) {
        self.inner.lock().failing.insert(operation);
    }

    pub fn clear_failures(&self) {
        self.inner.lock().failing.clear();
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.inner.lock().calls.clone()
    }

    /// Calls excluding stack probes and title updates.
    pub fn transitions(&self) -> Vec<PlatformCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, PlatformCall::CurrentPages | PlatformCall::SetTitle(_)))
            .collect()
    }

    pub fn stack(&self) -> Vec<PageInfo> {
        self.inner.lock().stack.clone()
    }

    pub fn title(&self) -> Option<String> {
        self.inner.lock().title.clone()
    }

    async fn record(&self, call: PlatformCall) -> Result<(), PlatformError> {
        if let Some(delay) = self.delay {
            if !matches!(call, PlatformCall::CurrentPages | PlatformCall::SetTitle(_)) {
                tokio::time::sleep(delay).await;
            }
        }

        let operation = call.operation();
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        if inner.failing.contains(operation) {
            return Err(PlatformError::new(operation, "rejected by host"));
        }
        Ok(())
    }
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

fn page_from_url(url: &str) -> PageInfo {
    let location = RouteLocation::parse(url);
    let path = location.path.or(location.name).unwrap_or_default();
    PageInfo {
        route: path.trim_start_matches('/').to_string(),
        query: location.query,
    }
}

#[async_trait]
impl Platform for MemoryPlatform {
    async fn navigate_to(&self, url: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::NavigateTo(url.to_string())).await?;
        let mut inner = self.inner.lock();
        if inner.stack.len() >= self.max_depth {
            return Err(PlatformError::new("navigateTo", "page stack limit reached"));
        }
        inner.stack.push(page_from_url(url));
        Ok(())
    }

    async fn redirect_to(&self, url: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::RedirectTo(url.to_string())).await?;
        let mut inner = self.inner.lock();
        inner.stack.pop();
        inner.stack.push(page_from_url(url));
        Ok(())
    }

    async fn switch_tab(&self, url: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::SwitchTab(url.to_string())).await?;
        self.inner.lock().stack = vec![page_from_url(url)];
        Ok(())
    }

    async fn navigate_back(&self, delta: usize) -> Result<(), PlatformError> {
        self.record(PlatformCall::NavigateBack(delta)).await?;
        let mut inner = self.inner.lock();
        if inner.stack.len() <= 1 {
            return Err(PlatformError::new("navigateBack", "no page to return to"));
        }
        let keep = inner.stack.len().saturating_sub(delta).max(1);
        inner.stack.truncate(keep);
        Ok(())
    }

    async fn relaunch(&self, url: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::Relaunch(url.to_string())).await?;
        self.inner.lock().stack = vec![page_from_url(url)];
        Ok(())
    }

    async fn current_pages(&self) -> Result<Vec<PageInfo>, PlatformError> {
        self.record(PlatformCall::CurrentPages).await?;
        Ok(self.inner.lock().stack.clone())
    }

    async fn set_navigation_bar_title(&self, title: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::SetTitle(title.to_string())).await?;
        self.inner.lock().title = Some(title.to_string());
        Ok(())
    }
}

/// Token storage held in memory.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_token(token);
        store
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write() = None;
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }
}

/// Notifier that keeps every message it was asked to show.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show_message(&self, text: &str) {
        tracing::debug!(message = %text, "Notification shown");
        self.messages.lock().push(text.to_string());
    }
}
