use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::FlagKey;
use crate::router::Context;

/// The result of a flag or command action.
pub type ActionResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub(crate) type Validator = Box<dyn Fn(&str) -> Result<(), InvalidValue> + Send + Sync>;
pub(crate) type FlagAction = Box<dyn Fn(&str, &mut Context) -> ActionResult + Send + Sync>;

/// Renders one validation failure into a message.
/// Receives the flag, the rejected value, and the validator's error.
pub type ValidationFormatter =
    Box<dyn Fn(&FlagType, &str, &InvalidValue) -> String + Send + Sync>;

/// The error a validator returns to reject a value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct InvalidValue(String);

impl InvalidValue {
    /// Create a validation failure with the message to display.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// A typed read of a resolved flag value failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot convert '{value}' of flag '{key}' to {type_name}.")]
pub struct ConversionError {
    key: FlagKey,
    value: String,
    type_name: &'static str,
}

/// A flag declared on a command.
///
/// Built from a [`crate::Flag`] when the router is built.
pub struct FlagType {
    key: FlagKey,
    shorthand: Option<String>,
    prefix: String,
    default: Option<String>,
    required: bool,
    description: Option<String>,
    validators: Vec<Validator>,
    action: Option<FlagAction>,
}

impl fmt::Debug for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagType")
            .field("key", &self.key)
            .field("shorthand", &self.shorthand)
            .field("prefix", &self.prefix)
            .field("default", &self.default)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

impl FlagType {
    pub(crate) fn new(key: FlagKey, shorthand: Option<String>) -> Self {
        Self {
            key,
            shorthand,
            prefix: String::default(),
            default: None,
            required: false,
            description: None,
            validators: Vec::default(),
            action: None,
        }
    }

    /// The canonical key, under which the resolved value is recorded.
    pub fn key(&self) -> &FlagKey {
        &self.key
    }

    /// The prefix group.
    pub fn group(&self) -> &str {
        self.key.group()
    }

    /// The flag name.
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// The shorthand name, if any.
    pub fn shorthand(&self) -> Option<&str> {
        self.shorthand.as_deref()
    }

    /// The canonical prefix of the flag's group (ex: `--`).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The default value, if any.
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Whether the flag must be resolved to a value.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The flag description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether `name` is this flag's name or shorthand.
    pub fn answers_to(&self, name: &str) -> bool {
        self.key.name() == name || self.shorthand.as_deref() == Some(name)
    }

    pub(crate) fn aliases(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.name()).chain(self.shorthand.as_deref())
    }

    /// Run every validator, collecting all of the failures.
    pub(crate) fn validate(&self, value: &str) -> Vec<InvalidValue> {
        self.validators
            .iter()
            .filter_map(|validator| validator(value).err())
            .collect()
    }

    pub(crate) fn action(&self) -> Option<&FlagAction> {
        self.action.as_ref()
    }

    pub(crate) fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub(crate) fn set_default(&mut self, value: String) {
        self.default.replace(value);
    }

    pub(crate) fn set_required(&mut self) {
        self.required = true;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description.replace(description);
    }

    pub(crate) fn push_validator(&mut self, validator: Validator) {
        self.validators.push(validator);
    }

    pub(crate) fn set_action(&mut self, action: FlagAction) {
        self.action.replace(action);
    }
}

/// The formatter used unless the router is configured with another.
///
/// ### Example
/// ```
/// use cmdroute::{default_validation_formatter, CommandLineRouter, Flag, FlagPrefix, validators};
///
/// let router = CommandLineRouter::new("program")
///     .prefix(FlagPrefix::new("option", "--"))
///     .flag(Flag::new("option", "count").validator(validators::int))
///     .action(|_| Ok(()))
///     .build()
///     .unwrap();
///
/// let error = router.run_tokens(&["--count", "many"]).unwrap_err();
/// assert_eq!(error.to_string(), "Validation error: --count 'many': Must be a valid int.");
/// ```
pub fn default_validation_formatter(
    flag_type: &FlagType,
    value: &str,
    error: &InvalidValue,
) -> String {
    format!(
        "{prefix}{name} '{value}': {error}",
        prefix = flag_type.prefix(),
        name = flag_type.name(),
    )
}

/// The resolved flags of one invocation.
///
/// Known flags are those declared on the matched command chain, keyed by their canonical [`FlagKey`].
/// Unknown flags are everything else that was given with a registered prefix, keyed by their group and the name as typed.
/// The literal prefix is not kept: `-x 1 --x 2` (both in one group) is the single unknown flag `x` with the value `2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedFlags {
    known: HashMap<FlagKey, String>,
    unknown: HashMap<FlagKey, String>,
}

impl ProcessedFlags {
    pub(crate) fn new(known: HashMap<FlagKey, String>, unknown: HashMap<FlagKey, String>) -> Self {
        Self { known, unknown }
    }

    /// The declared flags.
    pub fn known(&self) -> &HashMap<FlagKey, String> {
        &self.known
    }

    /// The undeclared flags.
    pub fn unknown(&self) -> &HashMap<FlagKey, String> {
        &self.unknown
    }

    /// The raw value of a flag, looking first at known and then at unknown flags.
    pub fn value(&self, group: &str, name: &str) -> Option<&str> {
        let key = FlagKey::new(group, name);
        self.known
            .get(&key)
            .or_else(|| self.unknown.get(&key))
            .map(String::as_str)
    }

    /// The value of a flag converted via [`std::str::FromStr`].
    ///
    /// Returns `Ok(None)` when the flag has no value.
    ///
    /// ### Example
    /// ```
    /// use cmdroute::{CommandLineRouter, Flag, FlagPrefix};
    ///
    /// let router = CommandLineRouter::new("program")
    ///     .prefix(FlagPrefix::new("option", "--"))
    ///     .flag(Flag::new("option", "count").default("3"))
    ///     .action(|ctx| {
    ///         assert_eq!(ctx.flags().parse::<u32>("option", "count")?, Some(3));
    ///         assert_eq!(ctx.flags().parse::<bool>("option", "verbose")?, Some(true));
    ///         assert_eq!(ctx.flags().parse::<u32>("option", "moot")?, None);
    ///         Ok(())
    ///     })
    ///     .build()
    ///     .unwrap();
    ///
    /// router.run_tokens(&["--verbose"]).unwrap();
    /// ```
    pub fn parse<T: FromStr>(&self, group: &str, name: &str) -> Result<Option<T>, ConversionError> {
        match self.value(group, name) {
            Some(value) => T::from_str(value)
                .map(Some)
                .map_err(|_| ConversionError {
                    key: FlagKey::new(group, name),
                    value: value.to_string(),
                    type_name: std::any::type_name::<T>(),
                }),
            None => Ok(None),
        }
    }

    /// The names of every flag (known or unknown) resolved under `group`, sorted.
    pub fn names_in(&self, group: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .known
            .keys()
            .chain(self.unknown.keys())
            .filter(|key| key.group() == group)
            .map(FlagKey::name)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn processed() -> ProcessedFlags {
        ProcessedFlags::new(
            HashMap::from([
                (FlagKey::new("option", "user"), "richard".to_string()),
                (FlagKey::new("option", "count"), "3".to_string()),
            ]),
            HashMap::from([
                (FlagKey::new("setting", "dynamic"), "flag".to_string()),
                (FlagKey::new("option", "extra"), "true".to_string()),
            ]),
        )
    }

    #[rstest]
    #[case("option", "user", Some("richard"))]
    #[case("option", "extra", Some("true"))]
    #[case("setting", "dynamic", Some("flag"))]
    #[case("option", "unknown", None)]
    #[case("setting", "user", None)]
    fn value(#[case] group: &str, #[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(processed().value(group, name), expected);
    }

    #[test]
    fn parse() {
        let flags = processed();

        assert_eq!(flags.parse::<u32>("option", "count").unwrap(), Some(3));
        assert_eq!(flags.parse::<bool>("option", "extra").unwrap(), Some(true));
        assert_eq!(flags.parse::<u32>("option", "moot").unwrap(), None);
        assert_eq!(
            flags.parse::<u32>("option", "user").unwrap_err().to_string(),
            "cannot convert 'richard' of flag 'option:user' to u32."
        );
    }

    #[test]
    fn names_in() {
        let flags = processed();

        assert_eq!(flags.names_in("option"), vec!["count", "extra", "user"]);
        assert_eq!(flags.names_in("setting"), vec!["dynamic"]);
        assert!(flags.names_in("moot").is_empty());
    }

    #[rstest]
    #[case("person", true)]
    #[case("p", true)]
    #[case("q", false)]
    fn answers_to(#[case] name: &str, #[case] expected: bool) {
        let flag_type = FlagType::new(FlagKey::new("option", "person"), Some("p".to_string()));
        assert_eq!(flag_type.answers_to(name), expected);
    }

    #[test]
    fn validate_collects() {
        let mut flag_type = FlagType::new(FlagKey::new("option", "count"), None);
        flag_type.push_validator(Box::new(|_: &str| Err(InvalidValue::new("first"))));
        flag_type.push_validator(Box::new(|_: &str| Ok(())));
        flag_type.push_validator(Box::new(|_: &str| Err(InvalidValue::new("second"))));

        assert_eq!(
            flag_type.validate("x"),
            vec![InvalidValue::new("first"), InvalidValue::new("second")]
        );
    }

    #[test]
    fn default_formatter() {
        let mut flag_type = FlagType::new(FlagKey::new("option", "count"), None);
        flag_type.set_prefix("--");

        assert_eq!(
            default_validation_formatter(&flag_type, "x", &InvalidValue::new("Must be a valid int.")),
            "--count 'x': Must be a valid int."
        );
    }
}
