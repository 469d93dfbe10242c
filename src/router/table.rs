//! Immutable route table and location resolution.

use std::collections::HashMap;

use thiserror::Error;

use crate::config::RouteDefinition;
use crate::router::route::{full_path, Query, Route, RouteLocation};

/// Errors raised while building a route table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("Route table is empty")]
    Empty,

    #[error("Duplicate route name '{name}'")]
    DuplicateName { name: String },

    #[error("Duplicate route path '{path}'")]
    DuplicatePath { path: String },

    #[error("Route '{name}' has relative path '{path}' (paths must start with '/')")]
    RelativePath { name: String, path: String },
}

/// The known navigable destinations.
///
/// Children are flattened into the lookup indexes, so nested definitions
/// resolve exactly like top-level ones.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
    by_name: HashMap<String, usize>,
    by_path: HashMap<String, usize>,
}

impl RouteTable {
    /// Build a table from definitions.
    ///
    /// # Errors
    /// Returns error if the table is empty, if any name or path repeats
    /// (children included), or if a path does not start with `/`.
    pub fn new(routes: Vec<RouteDefinition>) -> Result<Self, RouteTableError> {
        if routes.is_empty() {
            return Err(RouteTableError::Empty);
        }

        let mut flat = Vec::new();
        flatten(&routes, &mut flat);

        let mut by_name = HashMap::with_capacity(flat.len());
        let mut by_path = HashMap::with_capacity(flat.len());

        for (index, route) in flat.iter().enumerate() {
            if !route.path.starts_with('/') {
                return Err(RouteTableError::RelativePath {
                    name: route.name.clone(),
                    path: route.path.clone(),
                });
            }
            if by_name.insert(route.name.clone(), index).is_some() {
                return Err(RouteTableError::DuplicateName {
                    name: route.name.clone(),
                });
            }
            if by_path.insert(route.path.clone(), index).is_some() {
                return Err(RouteTableError::DuplicatePath {
                    path: route.path.clone(),
                });
            }
        }

        Ok(Self {
            routes: flat,
            by_name,
            by_path,
        })
    }

    pub fn by_name(&self, name: &str) -> Option<&RouteDefinition> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }

    pub fn by_path(&self, path: &str) -> Option<&RouteDefinition> {
        self.by_path.get(path).map(|&i| &self.routes[i])
    }

    /// Find the definition a location points at.
    ///
    /// A location carrying a name is looked up by name only.
    pub fn lookup(&self, location: &RouteLocation) -> Option<&RouteDefinition> {
        if let Some(name) = &location.name {
            return self.by_name(name);
        }
        location.path.as_deref().and_then(|path| self.by_path(path))
    }

    /// Resolve a location into a concrete route.
    pub fn resolve(&self, location: &RouteLocation) -> Option<Route> {
        let definition = self.lookup(location)?;
        Some(materialize(
            definition,
            location.query.clone(),
            location.params.clone(),
        ))
    }

    /// Resolve a platform screen path with the query the host reported.
    pub fn resolve_page(&self, path: &str, query: Query) -> Option<Route> {
        self.by_path(path)
            .map(|definition| materialize(definition, query, Default::default()))
    }

    /// Number of definitions, children included.
    pub(crate) fn len(&self) -> usize {
        self.routes.len()
    }
}

fn flatten(routes: &[RouteDefinition], out: &mut Vec<RouteDefinition>) {
    for route in routes {
        out.push(RouteDefinition {
            children: Vec::new(),
            ..route.clone()
        });
        flatten(&route.children, out);
    }
}

fn materialize(
    definition: &RouteDefinition,
    query: Query,
    params: crate::router::route::Params,
) -> Route {
    Route {
        path: definition.path.clone(),
        full_path: full_path(&definition.path, &query),
        name: definition.name.clone(),
        meta: definition.meta.clone(),
        query,
        params,
    }
}
