use crate::flags::{ActionResult, FlagType, InvalidValue};
use crate::model::{ConfigError, FlagKey};
use crate::router::Context;

/// A flag declaration.
///
/// The declaration names the flag's key, optionally followed by its shorthand (ex: `"person p"`).
/// Used with [`crate::CommandLineRouter::flag`] and [`crate::Command::flag`].
///
/// ### Example
/// ```
/// use cmdroute::{CommandLineRouter, Flag, FlagPrefix, validators};
///
/// let router = CommandLineRouter::new("program")
///     .prefix(FlagPrefix::new("option", "--").shorthand("-"))
///     .flag(
///         Flag::new("option", "count c")
///             .description("How many times.")
///             .default("1")
///             .validator(validators::int),
///     )
///     .action(|ctx| {
///         assert_eq!(ctx.parse::<i64>("option", "count")?, Some(5));
///         Ok(())
///     })
///     .build()
///     .unwrap();
///
/// router.run_tokens(&["-c", "5"]).unwrap();
/// ```
pub struct Flag {
    inner: FlagType,
    deferred_error: Option<ConfigError>,
}

impl Flag {
    /// Declare a flag under the prefix `group`.
    /// The `declaration` is the flag key, optionally followed by a shorthand (separated by whitespace).
    pub fn new(group: impl Into<String>, declaration: impl AsRef<str>) -> Self {
        let declaration = declaration.as_ref();
        let words: Vec<&str> = declaration.split_whitespace().collect();
        let group = group.into();

        match words.as_slice() {
            [key] => Self {
                inner: FlagType::new(FlagKey::new(group, *key), None),
                deferred_error: None,
            },
            [key, shorthand] => Self {
                inner: FlagType::new(FlagKey::new(group, *key), Some(shorthand.to_string())),
                deferred_error: None,
            },
            _ => Self {
                inner: FlagType::new(FlagKey::new(group, String::default()), None),
                deferred_error: Some(ConfigError::InvalidFlagDeclaration(
                    declaration.to_string(),
                )),
            },
        }
    }

    /// Set the value used when the flag is not given, or given without a value.
    /// If repeated, only the final default will apply.
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.inner.set_default(value.into());
        self
    }

    /// Require the flag to resolve to a value.
    pub fn required(mut self) -> Self {
        self.inner.set_required();
        self
    }

    /// Document the flag.
    /// If repeated, only the final description will apply.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.set_description(description.into());
        self
    }

    /// Add a validator for the flag's value.
    /// Every validator is run; each rejection is reported.
    pub fn validator(
        mut self,
        validator: impl Fn(&str) -> Result<(), InvalidValue> + Send + Sync + 'static,
    ) -> Self {
        self.inner.push_validator(Box::new(validator));
        self
    }

    /// Set the action to run with the flag's resolved value, before the action of the command declaring it.
    /// If repeated, only the final action will apply.
    pub fn action(
        mut self,
        action: impl Fn(&str, &mut Context) -> ActionResult + Send + Sync + 'static,
    ) -> Self {
        self.inner.set_action(Box::new(action));
        self
    }

    pub(crate) fn consume(self) -> Result<FlagType, ConfigError> {
        match self.deferred_error {
            Some(error) => Err(error),
            None => Ok(self.inner),
        }
    }
}
