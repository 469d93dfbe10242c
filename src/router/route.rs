//! Navigation targets: caller intents and resolved routes.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::config::RouteMeta;

/// Query parameters in insertion order.
pub type Query = IndexMap<String, String>;

/// Free-form route parameters.
pub type Params = HashMap<String, serde_json::Value>;

/// Characters left unescaped by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds `path?k=v&...` from a path and query.
///
/// Entries are serialized in insertion order and are not sorted, so two
/// logically equal queries built in different orders produce different
/// strings. The result is not a canonical key.
pub fn full_path(path: &str, query: &Query) -> String {
    if query.is_empty() {
        return path.to_string();
    }

    let query_string = query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, COMPONENT),
                utf8_percent_encode(value, COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", path, query_string)
}

/// A fully resolved navigation target.
///
/// Routes are snapshots: they are cloned into history, into observers and
/// into guards, never shared mutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub path: String,
    pub full_path: String,
    pub name: String,
    pub meta: RouteMeta,
    pub query: Query,
    pub params: Params,
}

/// A navigation intent supplied by the caller.
///
/// `name` takes precedence over `path` during resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteLocation {
    pub name: Option<String>,
    pub path: Option<String>,
    pub query: Query,
    pub params: Params,
}

impl RouteLocation {
    /// Location addressing a route by its symbolic name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Location addressing a route by its screen path.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Parses `name`, `/path`, optionally followed by `?k=v&...`.
    ///
    /// Query keys and values are taken verbatim; no percent-decoding is done.
    pub fn parse(target: &str) -> Self {
        let (base, query) = match target.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (target, None),
        };

        let mut location = if base.starts_with('/') {
            Self::path(base)
        } else {
            Self::named(base)
        };

        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            location.query.insert(key.to_string(), value.to_string());
        }

        location
    }
}

impl From<&str> for RouteLocation {
    fn from(target: &str) -> Self {
        Self::parse(target)
    }
}

impl From<&Route> for RouteLocation {
    fn from(route: &Route) -> Self {
        Self {
            name: Some(route.name.clone()),
            path: Some(route.path.clone()),
            query: route.query.clone(),
            params: route.params.clone(),
        }
    }
}

impl fmt::Display for RouteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.path) {
            (Some(name), _) => write!(f, "name '{}'", name),
            (None, Some(path)) => write!(f, "path '{}'", full_path(path, &self.query)),
            (None, None) => write!(f, "<empty location>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_path_without_query_has_no_separator() {
        assert_eq!(full_path("/pages/index/index", &Query::new()), "/pages/index/index");
    }

    #[test]
    fn full_path_keeps_insertion_order() {
        let mut query = Query::new();
        query.insert("b".to_string(), "2".to_string());
        query.insert("a".to_string(), "1".to_string());
        assert_eq!(full_path("/p", &query), "/p?b=2&a=1");
    }

    #[test]
    fn full_path_encodes_like_uri_components() {
        let mut query = Query::new();
        query.insert("q x".to_string(), "a&b=c/d".to_string());
        query.insert("keep".to_string(), "-_.!~*'()".to_string());
        assert_eq!(
            full_path("/p", &query),
            "/p?q%20x=a%26b%3Dc%2Fd&keep=-_.!~*'()"
        );
    }

    #[test]
    fn full_path_encodes_utf8() {
        let mut query = Query::new();
        query.insert("city".to_string(), "上海".to_string());
        assert_eq!(full_path("/p", &query), "/p?city=%E4%B8%8A%E6%B5%B7");
    }

    #[test]
    fn parse_distinguishes_names_and_paths() {
        let by_name = RouteLocation::parse("profile");
        assert_eq!(by_name.name.as_deref(), Some("profile"));
        assert!(by_name.path.is_none());

        let by_path = RouteLocation::parse("/pages/profile/index?tab=2&flag");
        assert_eq!(by_path.path.as_deref(), Some("/pages/profile/index"));
        assert_eq!(by_path.query.get("tab").map(String::as_str), Some("2"));
        assert_eq!(by_path.query.get("flag").map(String::as_str), Some(""));
    }
}
