mod core;
mod flag;
pub mod validators;

pub use self::core::{Command, CommandLineRouter};
pub use flag::Flag;
