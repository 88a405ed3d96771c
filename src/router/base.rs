use std::env;
use std::fmt;
use thiserror::Error;

use crate::flags::{ProcessedFlags, ValidationFormatter};
use crate::matcher::{match_path, CommandNode, MatchChain, MatchError};
use crate::model::FlagKey;
use crate::resolver::{FlagResolver, ValidationError};
use crate::router::executor::execute;
use crate::router::Context;
use crate::tokens::{FlagArg, PrefixTable, Tokenizer, Tokens};

/// The action that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOrigin {
    /// The action of this flag.
    Flag(FlagKey),
    /// The action of the command with this name.
    Command(String),
}

/// A flag or command action returned an error.
///
/// Displays as the action's own error.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct ActionError {
    origin: ActionOrigin,
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl ActionError {
    pub(crate) fn new(
        origin: ActionOrigin,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self { origin, source }
    }

    /// Which action failed.
    pub fn origin(&self) -> &ActionOrigin {
        &self.origin
    }

    /// The error returned by the action.
    pub fn into_source(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.source
    }
}

/// An error from [`Router::run_tokens`].
/// None of these are retried; the invocation stops at the first one.
#[derive(Debug, Error)]
pub enum RouteError {
    /// No command (with an action) matches the full command path.
    #[error("Command not found: '{}'.", path.join(" "))]
    CommandNotFound {
        /// The full command path.
        path: Vec<String>,
        /// The tokens left unmatched where matching failed (empty when the matched command has no action).
        remaining: Vec<String>,
    },

    /// One or more flag values were rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A flag or command action failed.
    #[error(transparent)]
    Action(#[from] ActionError),
}

impl From<MatchError> for RouteError {
    fn from(error: MatchError) -> Self {
        match error {
            MatchError::CommandNotFound { path, remaining } => {
                RouteError::CommandNotFound { path, remaining }
            }
        }
    }
}

/// The configured command router.
/// Built via [`crate::CommandLineRouter::build`].
///
/// A router is immutable, and may be shared across threads to run many invocations.
pub struct Router {
    program: String,
    version: Option<String>,
    prefixes: PrefixTable,
    root: CommandNode,
    formatter: ValidationFormatter,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("program", &self.program)
            .field("version", &self.version)
            .field("prefixes", &self.prefixes)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Router {
    pub(crate) fn new(
        program: impl Into<String>,
        version: Option<String>,
        prefixes: PrefixTable,
        root: CommandNode,
        formatter: ValidationFormatter,
    ) -> Self {
        Self {
            program: program.into(),
            version,
            prefixes,
            root,
            formatter,
        }
    }

    /// The program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The program version, if one was configured.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The root of the command tree.
    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// Split the input tokens into the command path and the flags.
    ///
    /// ### Example
    /// ```
    /// use cmdroute::{CommandLineRouter, FlagPrefix};
    ///
    /// let router = CommandLineRouter::new("program")
    ///     .prefix(FlagPrefix::new("option", "--").shorthand("-"))
    ///     .build()
    ///     .unwrap();
    ///
    /// let tokens = router.tokenize(&["greet", "--person", "alice", "now", "-v"]);
    /// assert_eq!(tokens.path(), &["greet".to_string(), "now".to_string()]);
    /// assert_eq!(tokens.flags()[0].key().name(), "person");
    /// assert_eq!(tokens.flags()[0].value(), Some("alice"));
    /// assert_eq!(tokens.flags()[1].prefix(), "-");
    /// assert_eq!(tokens.flags()[1].value_or_true(), "true");
    /// ```
    pub fn tokenize<S: AsRef<str>>(&self, args: &[S]) -> Tokens {
        Tokenizer::split(&self.prefixes, args)
    }

    /// Match and resolve the input tokens, without running any action.
    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Result<ProcessedFlags, RouteError> {
        let (path, flag_args) = self.tokenize(args).into_parts();
        let chain = match_path(&self.root, &path)?;
        self.resolve_chain(&chain, &flag_args)
    }

    fn resolve_chain(
        &self,
        chain: &MatchChain<'_>,
        flag_args: &[FlagArg],
    ) -> Result<ProcessedFlags, RouteError> {
        let flags = FlagResolver::new(chain.visible_flags(), &self.formatter)
            .resolve(flag_args, chain.bindings())?;
        Ok(flags)
    }

    /// Run the router against the input tokens.
    ///
    /// The tokens are processed in four phases:
    /// 1. Tokenizing splits the command path from the flags.
    /// 2. Matching walks the command tree with the command path, binding any binder segments.
    /// 3. Resolving classifies each flag as known or unknown, applying defaults and validators.
    /// 4. Executing runs the flag and command actions of the matched chain, from the root down.
    ///
    /// ### Example
    /// ```
    /// use cmdroute::{CommandLineRouter, Flag, FlagPrefix};
    ///
    /// let router = CommandLineRouter::new("program")
    ///     .prefix(FlagPrefix::new("option", "--").shorthand("-"))
    ///     .command("greet {{person}}", |greet| {
    ///         greet
    ///             .flag(Flag::new("option", "person p"))
    ///             .action(|ctx| {
    ///                 assert_eq!(ctx.value("option", "person"), Some("alice"));
    ///                 Ok(())
    ///             })
    ///     })
    ///     .build()
    ///     .unwrap();
    ///
    /// router.run_tokens(&["greet", "alice"]).unwrap();
    /// assert!(router.run_tokens(&["wave"]).is_err());
    /// ```
    pub fn run_tokens<S: AsRef<str>>(&self, args: &[S]) -> Result<(), RouteError> {
        let (path, flag_args) = self.tokenize(args).into_parts();
        let chain = match_path(&self.root, &path)?;
        let flags = self.resolve_chain(&chain, &flag_args)?;
        let mut ctx = Context::new(path, flags);
        execute(&chain, &mut ctx)?;
        Ok(())
    }

    /// Run the router against the Cli [`env::args`] (skipping the program name).
    pub fn run(&self) -> Result<(), RouteError> {
        let args: Vec<String> = env::args().skip(1).collect();
        self.run_tokens(&args)
    }
}
