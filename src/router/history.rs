//! Bounded record of committed routes.

use std::collections::VecDeque;

use crate::router::route::Route;

/// Committed routes, oldest first, capped at `limit` entries.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Route>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Append, dropping the oldest entry when full.
    pub fn push(&mut self, route: Route) {
        if self.entries.len() == self.limit {
            let dropped = self.entries.pop_front();
            tracing::debug!(
                dropped = dropped.as_ref().map(|r| r.path.as_str()).unwrap_or(""),
                "History limit reached, dropping oldest entry"
            );
        }
        self.entries.push_back(route);
    }

    /// Overwrite the newest entry, or append if empty.
    pub fn replace_last(&mut self, route: Route) {
        match self.entries.back_mut() {
            Some(last) => *last = route,
            None => self.entries.push_back(route),
        }
    }

    /// Remove the newest `delta` entries (saturating) and return the new tail.
    pub fn truncate_back(&mut self, delta: usize) -> Option<&Route> {
        let keep = self.entries.len().saturating_sub(delta);
        self.entries.truncate(keep);
        self.entries.back()
    }

    pub fn reset(&mut self, route: Route) {
        self.entries.clear();
        self.entries.push_back(route);
    }

    pub fn to_vec(&self) -> Vec<Route> {
        self.entries.iter().cloned().collect()
    }
}
