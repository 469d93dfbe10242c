//! Router configuration: engine settings and the static route table.
//!
//! The route table is the pluggable configuration input of the router.
//! It is read from TOML once at startup and never changes afterwards.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{RouteDefinition, RouteMeta, RouterConfig, RouterSettings};
