use crate::api::Flag;
use crate::flags::{
    default_validation_formatter, ActionResult, FlagType, InvalidValue, ValidationFormatter,
};
use crate::matcher::{CommandAction, CommandNode};
use crate::model::{ConfigError, FlagKey, FlagPrefix, PathPattern, Segment, SegmentSpec};
use crate::router::{Context, Router};
use crate::tokens::PrefixTable;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

// (group, name or shorthand) of every flag visible at a node.
type Visible = Vec<(String, String)>;

/// The command line router builder.
///
/// The router is the root of a command tree: flags declared directly on it are global (visible to every command), and its action runs when the command path is empty.
///
/// ### Example
/// ```
/// use cmdroute::{CommandLineRouter, Flag, FlagPrefix};
/// use std::sync::{Arc, Mutex};
///
/// let log = Arc::new(Mutex::new(Vec::<String>::new()));
/// let greet_log = log.clone();
/// let bind_log = log.clone();
///
/// let router = CommandLineRouter::new("app")
///     .about("Greets people.")
///     .prefix(FlagPrefix::new("option", "--").shorthand("-"))
///     .command("greet", |greet| {
///         greet
///             .flag(Flag::new("option", "person p"))
///             .action(move |_| {
///                 greet_log.lock().unwrap().push("greet".to_string());
///                 Ok(())
///             })
///             .command("bind {{person}}", |bind| {
///                 bind.action(move |ctx| {
///                     let person = ctx.value("option", "person").unwrap_or_default().to_string();
///                     bind_log.lock().unwrap().push(person);
///                     Ok(())
///                 })
///             })
///     })
///     .build()
///     .unwrap();
///
/// router.run_tokens(&["greet", "bind", "someone"]).unwrap();
/// assert_eq!(*log.lock().unwrap(), vec!["greet".to_string(), "someone".to_string()]);
/// ```
pub struct CommandLineRouter {
    program: String,
    version: Option<String>,
    prefixes: Vec<FlagPrefix>,
    root: Command,
    formatter: Option<ValidationFormatter>,
}

impl CommandLineRouter {
    /// Create a router builder for the `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            version: None,
            prefixes: Vec::default(),
            root: Command::new(String::default()),
            formatter: None,
        }
    }

    /// Document the about message for the program.
    /// If repeated, only the final message will apply.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.root = self.root.about(description);
        self
    }

    /// Set the program version, available via [`Router::version`].
    /// If repeated, only the final version will apply.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version.replace(version.into());
        self
    }

    /// Register a prefix group.
    ///
    /// Prefixes are matched longest first, so `--` and `-` may be registered side by side.
    pub fn prefix(mut self, prefix: FlagPrefix) -> Self {
        self.prefixes.push(prefix);
        self
    }

    /// Declare a global flag, visible to every command.
    pub fn flag(mut self, flag: Flag) -> Self {
        self.root = self.root.flag(flag);
        self
    }

    /// Add a command under the root.
    ///
    /// The `path` is one or more whitespace separated words, each either a literal or a binder (ex: `"bind {{person}}"`).
    /// The `setup_fn` configures the command (its flags, action and sub-commands).
    pub fn command(mut self, path: impl Into<String>, setup_fn: impl FnOnce(Command) -> Command) -> Self {
        self.root = self.root.command(path, setup_fn);
        self
    }

    /// Set the action to run when the command path is empty.
    /// If repeated, only the final action will apply.
    pub fn action(
        mut self,
        action: impl Fn(&mut Context) -> ActionResult + Send + Sync + 'static,
    ) -> Self {
        self.root = self.root.action(action);
        self
    }

    /// Set the formatter for validation failures, in place of [`default_validation_formatter`].
    /// If repeated, only the final formatter will apply.
    ///
    /// ### Example
    /// ```
    /// use cmdroute::{CommandLineRouter, Flag, FlagPrefix, validators};
    ///
    /// let router = CommandLineRouter::new("program")
    ///     .prefix(FlagPrefix::new("option", "--"))
    ///     .flag(Flag::new("option", "count").validator(validators::int))
    ///     .validation_formatter(|flag_type, value, error| {
    ///         format!("bad {}: {value} ({error})", flag_type.name())
    ///     })
    ///     .action(|_| Ok(()))
    ///     .build()
    ///     .unwrap();
    ///
    /// let error = router.run_tokens(&["--count", "x"]).unwrap_err();
    /// assert_eq!(error.to_string(), "Validation error: bad count: x (Must be a valid int.)");
    /// ```
    pub fn validation_formatter(
        mut self,
        formatter: impl Fn(&FlagType, &str, &InvalidValue) -> String + Send + Sync + 'static,
    ) -> Self {
        self.formatter.replace(Box::new(formatter));
        self
    }

    /// Build the router.
    /// This finalizes the configuration and checks for errors (ex: a repeated flag within one command chain).
    pub fn build(self) -> Result<Router, ConfigError> {
        let prefixes = PrefixTable::new(&self.prefixes)?;
        let root = self
            .root
            .finalize(&prefixes, Vec::default(), &self.program, &Visible::default())?;
        let formatter = self
            .formatter
            .unwrap_or_else(|| Box::new(default_validation_formatter));

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Built router: {root:?}.");
        }

        Ok(Router::new(
            self.program,
            self.version,
            prefixes,
            root,
            formatter,
        ))
    }
}

/// A command of the tree.
///
/// Used with [`CommandLineRouter::command`] and [`Command::command`].
pub struct Command {
    path: String,
    about: Option<String>,
    flags: Vec<Flag>,
    commands: Vec<Command>,
    action: Option<CommandAction>,
}

impl Command {
    fn new(path: String) -> Self {
        Self {
            path,
            about: None,
            flags: Vec::default(),
            commands: Vec::default(),
            action: None,
        }
    }

    /// *Available using 'unit_test' crate feature only.*</br></br>
    /// Build a [`Command`] for use in testing.
    ///
    /// ### Example
    /// ```
    /// use cmdroute::{Command, Flag};
    /// use std::sync::{Arc, Mutex};
    ///
    /// // Function under test.
    /// // We want to make sure the setup_fn is wired up correctly.
    /// pub fn setup_fn(seen: Arc<Mutex<Option<String>>>) -> impl FnOnce(Command) -> Command {
    ///     move |command| {
    ///         command
    ///             .flag(Flag::new("option", "person"))
    ///             .action(move |ctx| {
    ///                 *seen.lock().unwrap() = ctx.value("option", "person").map(ToString::to_string);
    ///                 Ok(())
    ///             })
    ///     }
    /// }
    ///
    /// let seen = Arc::new(Mutex::new(None));
    /// let router = setup_fn(seen.clone())(Command::test_dummy()).build_router().unwrap();
    /// router.run_tokens(&["--person", "alice"]).unwrap();
    /// assert_eq!(*seen.lock().unwrap(), Some("alice".to_string()));
    /// ```
    #[cfg(feature = "unit_test")]
    pub fn test_dummy() -> Self {
        Command::new("test-dummy".to_string())
    }

    /// *Available using 'unit_test' crate feature only.*</br></br>
    /// Build a [`Router`] rooted at this command, with the prefix group `option` (`--`, shorthand `-`).
    /// See [`Command::test_dummy`] for an example.
    #[cfg(feature = "unit_test")]
    pub fn build_router(self) -> Result<Router, ConfigError> {
        let program = self.path.clone();
        let prefixes = PrefixTable::new(&[FlagPrefix::new("option", "--").shorthand("-")])?;
        let root = self
            .finalize(&prefixes, Vec::default(), &program, &Visible::default())?;
        Ok(Router::new(
            program,
            None,
            prefixes,
            root,
            Box::new(default_validation_formatter),
        ))
    }

    /// Document the about message for this command.
    /// If repeated, only the final message will apply.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Declare a flag on this command, visible to it and every command below it.
    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    /// Add a sub-command.
    /// See [`CommandLineRouter::command`].
    pub fn command(mut self, path: impl Into<String>, setup_fn: impl FnOnce(Command) -> Command) -> Self {
        self.commands.push(setup_fn(Command::new(path.into())));
        self
    }

    /// Set the action to run when this command is matched.
    /// A command without an action cannot be the end of a command path.
    /// If repeated, only the final action will apply.
    pub fn action(
        mut self,
        action: impl Fn(&mut Context) -> ActionResult + Send + Sync + 'static,
    ) -> Self {
        self.action.replace(Box::new(action));
        self
    }

    // The root has no segments, and is named by `parent` alone.
    fn finalize(
        self,
        prefixes: &PrefixTable,
        segments: Vec<SegmentSpec>,
        parent: &str,
        visible: &Visible,
    ) -> Result<CommandNode, ConfigError> {
        let Command {
            path: _,
            about,
            flags,
            commands,
            action,
        } = self;

        let mut flag_types = Vec::with_capacity(flags.len());

        for flag in flags {
            let mut flag_type = flag.consume()?;
            let prefix = prefixes
                .canonical(flag_type.group())
                .ok_or_else(|| ConfigError::UnknownPrefixGroup(flag_type.group().to_string()))?;
            flag_type.set_prefix(prefix);
            flag_types.push(flag_type);
        }

        let mut inner_visible = visible.clone();
        inner_visible.extend(flag_types.iter().flat_map(|flag_type| {
            flag_type
                .aliases()
                .map(|alias| (flag_type.group().to_string(), alias.to_string()))
                .collect::<Vec<_>>()
        }));

        let pattern = PathPattern::new(
            segments
                .into_iter()
                .map(|spec| resolve_segment(spec, prefixes, &inner_visible))
                .collect::<Result<Vec<_>, _>>()?,
        );
        let name = if pattern.segments().is_empty() {
            parent.to_string()
        } else {
            format!("{parent} {pattern}")
        };

        check_duplicates(&flag_types, visible, &name)?;

        let mut children = Vec::with_capacity(commands.len());

        for command in commands {
            let segments = SegmentSpec::parse_path(&command.path)?;
            children.push(command.finalize(prefixes, segments, &name, &inner_visible)?);
        }

        check_ambiguity(&children, &name)?;

        Ok(CommandNode::new(
            name,
            pattern,
            about,
            children,
            flag_types,
            action,
        ))
    }
}

fn resolve_segment(
    spec: SegmentSpec,
    prefixes: &PrefixTable,
    visible: &Visible,
) -> Result<Segment, ConfigError> {
    match spec {
        SegmentSpec::Literal(word) => Ok(Segment::Literal(word)),
        SegmentSpec::Binder {
            group: Some(group),
            name,
        } => {
            if prefixes.contains_group(&group) {
                Ok(Segment::Binder(FlagKey::new(group, name)))
            } else {
                Err(ConfigError::UnknownPrefixGroup(group))
            }
        }
        SegmentSpec::Binder { group: None, name } => {
            // The innermost declaration wins.
            let group = visible
                .iter()
                .rev()
                .find(|(_, alias)| alias == &name)
                .map(|(group, _)| group.as_str())
                .or_else(|| prefixes.default_group())
                .ok_or_else(|| ConfigError::NoPrefixGroups(name.clone()))?
                .to_string();

            Ok(Segment::Binder(FlagKey::new(group, name)))
        }
    }
}

fn check_duplicates(
    flag_types: &[FlagType],
    visible: &Visible,
    name: &str,
) -> Result<(), ConfigError> {
    let mut seen = visible.clone();

    for flag_type in flag_types {
        for alias in flag_type.aliases() {
            let entry = (flag_type.group().to_string(), alias.to_string());

            if seen.contains(&entry) {
                return Err(ConfigError::DuplicateFlag(
                    alias.to_string(),
                    name.to_string(),
                ));
            }

            seen.push(entry);
        }
    }

    Ok(())
}

fn check_ambiguity(children: &[CommandNode], name: &str) -> Result<(), ConfigError> {
    for (i, left) in children.iter().enumerate() {
        for right in &children[i + 1..] {
            if left.pattern().overlaps(right.pattern()) {
                return Err(ConfigError::AmbiguousCommands(
                    left.name().to_string(),
                    right.name().to_string(),
                    name.to_string(),
                ));
            }
        }
    }

    Ok(())
}
