mod base;
mod context;
mod executor;

pub use base::{ActionError, ActionOrigin, RouteError, Router};
pub use context::Context;
