//! `cmdroute` is a command tree router for Rust command line programs.
//!
//! Rather than parsing the command line into a struct, `cmdroute` routes it: the program declares a tree of commands, each with its own flags and action, and the router runs the actions of the command the input matches.
//! Specifically, `cmdroute` is built around the following concerns:
//! * *Command paths*:
//! A command is addressed by one or more words (ex: `greet bind`).
//! A word may be a *binder* (ex: `{{person}}`), which matches any token and records it as the value of a flag.
//! * *Prefix groups*:
//! Flags are recognized by their prefix (ex: `--person` or `-p`).
//! Prefixes are grouped, so that a shorthand prefix addresses the same flags as its canonical one, and any number of groups may coexist (ex: `#setting`).
//! * *Scoped flags*:
//! A flag is visible to the command declaring it and every command below it.
//! Flags that are not declared anywhere on the matched chain are not errors; they are passed through as *unknown* flags.
//! * *Outer to inner execution*:
//! The actions of the matched chain run from the root down, each command's flag actions before its own action.
//! This lets a global flag (ex: `--log file`) configure state used by the inner command.
//!
//! Help and usage output are not part of `cmdroute`.
//!
//! # Usage
//! More examples are outlined in the `demos` directory of the source.
//! ```no_run
#![doc = include_str!("../demos/greet.rs")]
//! ```
//!
//! ```console
//! $ greet greet bind someone
//! [console] Hello, someone.
//!
//! $ greet --log file greet default
//! [file] defaultHello, you.
//!
//! $ greet greet default --count many
//! Validation error: --count 'many': Must be a valid int.
//!
//! $ greet wave
//! Command not found: 'wave'.
//! ```
//!
//! # Processing
//! Each invocation of [`Router::run_tokens`] is processed in four phases:
//! 1. The tokens are split into the command path and the flags.
//! A token starting with a registered prefix is a flag; the token following it is its value, unless it is itself a flag.
//! `--key=value` is also accepted.
//! 2. The command path is matched against the tree, sibling commands in declaration order.
//! 3. The flags are resolved against the flags visible on the matched chain: defaults are filled, and validators are run.
//! 4. The actions are executed.
//!
//! # Features
//! * `unit_test`: For features that help with unit testing.
//! * `tracing_debug`: Emit `tracing` debug events for each phase.
#![deny(missing_docs)]
mod api;
mod constant;
mod flags;
mod matcher;
mod model;
mod resolver;
mod router;
mod tokens;

pub use api::{validators, Command, CommandLineRouter, Flag};
pub use flags::{
    default_validation_formatter, ActionResult, ConversionError, FlagType, InvalidValue,
    ProcessedFlags, ValidationFormatter,
};
pub use matcher::CommandNode;
pub use model::{ConfigError, FlagKey, FlagPrefix, Segment};
pub use resolver::ValidationError;
pub use router::{ActionError, ActionOrigin, Context, RouteError, Router};
pub use tokens::{FlagArg, Tokens};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
pub(crate) mod test {
    macro_rules! assert_contains {
        ($base:expr, $sub:expr) => {
            assert!(
                $base.contains($sub),
                "'{b}' does not contain '{s}'",
                b = $base,
                s = $sub,
            );
        };
    }

    pub(crate) use assert_contains;
}
