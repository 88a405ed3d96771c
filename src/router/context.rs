use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::flags::{ConversionError, ProcessedFlags};

/// The per-invocation state handed to every flag and command action.
///
/// Besides the resolved flags, the context holds typed state so that an outer action (ex: a global `--log` flag) can configure something an inner command action uses.
///
/// ### Example
/// ```
/// use cmdroute::{CommandLineRouter, Flag, FlagPrefix};
///
/// #[derive(Debug, PartialEq)]
/// enum LogTarget {
///     Console,
///     File,
/// }
///
/// let router = CommandLineRouter::new("program")
///     .prefix(FlagPrefix::new("option", "--"))
///     .flag(Flag::new("option", "log").default("console").action(|value, ctx| {
///         let target = if value == "file" { LogTarget::File } else { LogTarget::Console };
///         ctx.insert(target);
///         Ok(())
///     }))
///     .command("work", |work| {
///         work.action(|ctx| {
///             assert_eq!(ctx.get::<LogTarget>(), Some(&LogTarget::File));
///             assert_eq!(ctx.path(), &["work".to_string()]);
///             Ok(())
///         })
///     })
///     .build()
///     .unwrap();
///
/// router.run_tokens(&["work", "--log", "file"]).unwrap();
/// ```
pub struct Context {
    path: Vec<String>,
    flags: ProcessedFlags,
    state: HashMap<TypeId, Box<dyn Any>>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("path", &self.path)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl Context {
    pub(crate) fn new(path: Vec<String>, flags: ProcessedFlags) -> Self {
        Self {
            path,
            flags,
            state: HashMap::default(),
        }
    }

    /// The command path tokens of this invocation (binder values included).
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The resolved flags.
    pub fn flags(&self) -> &ProcessedFlags {
        &self.flags
    }

    /// Shortcut for [`ProcessedFlags::value`].
    pub fn value(&self, group: &str, name: &str) -> Option<&str> {
        self.flags.value(group, name)
    }

    /// Shortcut for [`ProcessedFlags::parse`].
    pub fn parse<T: FromStr>(&self, group: &str, name: &str) -> Result<Option<T>, ConversionError> {
        self.flags.parse(group, name)
    }

    /// Store a value of type `T`, returning the previous one (if any).
    pub fn insert<T: Any>(&mut self, value: T) -> Option<T> {
        self.state
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    /// The stored value of type `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.state
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// The stored value of type `T`, mutably.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.state
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Take the stored value of type `T` out of the context.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.state
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }
}
