//! Navigation router: route table, guard pipeline, history and the
//! navigation engine that ties them to the host platform.
//!
//! ```text
//! RouteLocation ──→ RouteTable ──→ guards ──→ Platform ──→ commit
//!                   (resolve)      (approve)  (transition)  (history, current route, after-guards)
//! ```

mod engine;
mod error;
mod guard;
mod guards;
mod history;
mod route;
mod table;

pub use engine::{BuildError, Router, RouterBuilder};
pub use error::{NavigationError, RejectReason};
pub use guard::{
    after_fn, guard_fn, run_guards, AfterGuard, GuardDecision, GuardFuture, GuardHandle,
    GuardOutcome, NavigationGuard, Next,
};
pub use guards::{has_token, AuthGuard, TitleGuard, TransitionLogger};
pub use route::{full_path, Params, Query, Route, RouteLocation};
pub use table::{RouteTable, RouteTableError};
