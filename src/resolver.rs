use std::collections::HashMap;
use thiserror::Error;

use crate::constant::TRUE_SENTINEL;
use crate::flags::{FlagType, InvalidValue, ProcessedFlags, ValidationFormatter};
use crate::model::FlagKey;
use crate::tokens::FlagArg;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

const REQUIRED_MESSAGE: &str = "Required.";

/// One or more flag values were rejected by their validators.
///
/// Every rejected value is reported, not just the first.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Validation error: {}", .0.join("\n"))]
pub struct ValidationError(Vec<String>);

impl ValidationError {
    /// The formatted message of each failure, in the order they were found.
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

/// Classifies flags against the flags visible from a matched command chain.
pub(crate) struct FlagResolver<'t> {
    visible: Vec<&'t FlagType>,
    formatter: &'t ValidationFormatter,
}

#[derive(Default)]
struct Resolution<'t> {
    // The final value of each known flag, in order of first assignment.
    assigned: Vec<(&'t FlagType, String)>,
    unknown: HashMap<FlagKey, String>,
}

impl<'t> Resolution<'t> {
    // A later write to the same flag replaces the value in place.
    fn assign(&mut self, flag_type: &'t FlagType, value: &str) {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Known flag '{}' = '{value}'.", flag_type.key());
        }

        match self
            .assigned
            .iter_mut()
            .find(|(assigned, _)| assigned.key() == flag_type.key())
        {
            Some((_, previous)) => *previous = value.to_string(),
            None => self.assigned.push((flag_type, value.to_string())),
        }
    }
}

impl<'t> FlagResolver<'t> {
    pub(crate) fn new(
        visible: impl IntoIterator<Item = &'t FlagType>,
        formatter: &'t ValidationFormatter,
    ) -> Self {
        Self {
            visible: visible.into_iter().collect(),
            formatter,
        }
    }

    /// Resolve the flag arguments, followed by the path bindings (so a binding overwrites an explicit flag of the same key).
    /// Only the final value of each flag is validated.
    pub(crate) fn resolve(
        &self,
        flag_args: &[FlagArg],
        bindings: &[(FlagKey, String)],
    ) -> Result<ProcessedFlags, ValidationError> {
        let mut resolution = Resolution::default();

        for flag_arg in flag_args {
            match self.lookup(flag_arg.key()) {
                Some(flag_type) => {
                    // A flag without a value falls back to its default, and then to the sentinel.
                    let value = flag_arg
                        .value()
                        .or_else(|| flag_type.default_value())
                        .unwrap_or(TRUE_SENTINEL);
                    resolution.assign(flag_type, value);
                }
                None => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Unknown flag '{}{}'.", flag_arg.prefix(), flag_arg.key().name());
                    }

                    resolution
                        .unknown
                        .insert(flag_arg.key().clone(), flag_arg.value_or_true().to_string());
                }
            }
        }

        for (key, value) in bindings {
            match self.lookup(key) {
                Some(flag_type) => resolution.assign(flag_type, value),
                None => {
                    resolution.unknown.insert(key.clone(), value.clone());
                }
            }
        }

        let Resolution { assigned, unknown } = resolution;
        let mut known = HashMap::default();
        let mut messages = Vec::default();

        for (flag_type, value) in assigned {
            self.validate(&mut messages, flag_type, &value);
            known.insert(flag_type.key().clone(), value);
        }

        self.fill_defaults(&mut known, &mut messages);

        if messages.is_empty() {
            Ok(ProcessedFlags::new(known, unknown))
        } else {
            Err(ValidationError(messages))
        }
    }

    // Duplicates are rejected when the router is built, so at most one flag answers.
    fn lookup(&self, key: &FlagKey) -> Option<&'t FlagType> {
        self.visible
            .iter()
            .copied()
            .find(|flag_type| flag_type.group() == key.group() && flag_type.answers_to(key.name()))
    }

    fn validate(&self, messages: &mut Vec<String>, flag_type: &FlagType, value: &str) {
        for error in flag_type.validate(value) {
            messages.push((self.formatter)(flag_type, value, &error));
        }
    }

    fn fill_defaults(&self, known: &mut HashMap<FlagKey, String>, messages: &mut Vec<String>) {
        for flag_type in self.visible.iter().copied() {
            if known.contains_key(flag_type.key()) {
                continue;
            }

            match flag_type.default_value() {
                Some(default) => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Filling default for '{}'.", flag_type.key());
                    }

                    self.validate(messages, flag_type, default);
                    known.insert(flag_type.key().clone(), default.to_string());
                }
                None if flag_type.is_required() => {
                    messages.push((self.formatter)(
                        flag_type,
                        "",
                        &InvalidValue::new(REQUIRED_MESSAGE),
                    ));
                }
                None => {}
            }
        }
    }
}
