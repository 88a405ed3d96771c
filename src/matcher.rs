mod core;
mod model;

pub(crate) use self::core::match_path;
pub use model::CommandNode;
pub(crate) use model::{CommandAction, MatchChain, MatchError};
