//! Page navigation router for mini-program style hosts.
//!
//! The [`router::Router`] keeps the current route and a bounded history,
//! runs ordered guard chains that can approve, abort or redirect a
//! navigation, and drives a host [`platform::Platform`] to perform the
//! actual screen transitions.

pub mod cli;
pub mod config;
pub mod logging;
pub mod platform;
pub mod router;
pub mod simulate;
