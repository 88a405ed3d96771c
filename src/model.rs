use std::fmt;
use thiserror::Error;

use crate::constant::*;

/// The identity of a flag: the prefix group it belongs to and its name within that group.
///
/// Keys are structural: `FlagKey::new("option", "person")` is the same flag whether it was typed as `--person` or `-person`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlagKey {
    group: String,
    name: String,
}

impl FlagKey {
    /// Create a flag key.
    ///
    /// ### Example
    /// ```
    /// use cmdroute::FlagKey;
    ///
    /// let key = FlagKey::new("option", "person");
    /// assert_eq!(key.group(), "option");
    /// assert_eq!(key.name(), "person");
    /// assert_eq!(key.to_string(), "option:person");
    /// ```
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }

    /// The prefix group of this key.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The flag name (without any prefix).
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{BINDER_GROUP_DELIMITER}{}", self.group, self.name)
    }
}

/// A group of flag prefixes.
///
/// The `key` prefix is canonical (ex: `--`), while the optional `shorthand` prefix (ex: `-`) is an alternate spelling of the same group.
///
/// ### Example
/// ```
/// use cmdroute::FlagPrefix;
///
/// let prefix = FlagPrefix::new("option", "--").shorthand("-");
/// assert_eq!(prefix.group(), "option");
/// assert_eq!(prefix.key(), "--");
/// assert_eq!(prefix.shorthand_key(), Some("-"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagPrefix {
    group: String,
    key: String,
    shorthand: Option<String>,
}

impl FlagPrefix {
    /// Create a prefix group with its canonical prefix.
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
            shorthand: None,
        }
    }

    /// Add the shorthand prefix for this group.
    /// If repeated, only the final shorthand will apply.
    pub fn shorthand(mut self, shorthand: impl Into<String>) -> Self {
        self.shorthand.replace(shorthand.into());
        self
    }

    /// The name of the group.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The canonical prefix.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The shorthand prefix, if any.
    pub fn shorthand_key(&self) -> Option<&str> {
        self.shorthand.as_deref()
    }

    pub(crate) fn prefixes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.shorthand.as_deref())
    }
}

/// One element of a command path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches precisely this word.
    Literal(String),
    /// Matches any word, binding it as the value of the flag.
    Binder(FlagKey),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(word) => write!(f, "{word}"),
            Segment::Binder(key) => write!(f, "{BINDER_OPEN_DOUBLE}{key}{BINDER_CLOSE_DOUBLE}"),
        }
    }
}

/// A segment as written by the user, before binder groups have been resolved against the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SegmentSpec {
    Literal(String),
    Binder { group: Option<String>, name: String },
}

impl SegmentSpec {
    pub(crate) fn parse(word: &str) -> Result<Self, ConfigError> {
        let inner = if let Some(inner) = word
            .strip_prefix(BINDER_OPEN_DOUBLE)
            .and_then(|w| w.strip_suffix(BINDER_CLOSE_DOUBLE))
        {
            inner
        } else if let Some(inner) = word
            .strip_prefix(BINDER_OPEN)
            .and_then(|w| w.strip_suffix(BINDER_CLOSE))
        {
            inner
        } else if word.contains(BINDER_OPEN) || word.contains(BINDER_CLOSE) {
            return Err(ConfigError::MalformedBinder(word.to_string()));
        } else {
            return Ok(SegmentSpec::Literal(word.to_string()));
        };

        let (group, name) = match inner.split_once(BINDER_GROUP_DELIMITER) {
            Some((group, name)) => (Some(group.to_string()), name),
            None => (None, inner),
        };

        if name.is_empty()
            || group.as_ref().map_or(false, |g| g.is_empty())
            || name.contains(BINDER_OPEN)
            || name.contains(BINDER_CLOSE)
        {
            return Err(ConfigError::MalformedBinder(word.to_string()));
        }

        Ok(SegmentSpec::Binder {
            group,
            name: name.to_string(),
        })
    }

    /// Split a whitespace separated command path into its segments.
    pub(crate) fn parse_path(path: &str) -> Result<Vec<Self>, ConfigError> {
        let segments = path
            .split_whitespace()
            .map(SegmentSpec::parse)
            .collect::<Result<Vec<_>, _>>()?;

        if segments.is_empty() {
            return Err(ConfigError::EmptyCommandPath);
        }

        Ok(segments)
    }
}

/// The full path pattern of one command node, relative to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct PathPattern(Vec<Segment>);

impl PathPattern {
    pub(crate) fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Walk the pattern against the head of `path`.
    /// Returns the bindings when every segment is consumed, or `None` when a literal mismatches or the path runs out.
    pub(crate) fn admit(&self, path: &[String]) -> Option<Vec<(FlagKey, String)>> {
        if path.len() < self.0.len() {
            return None;
        }

        let mut bindings = Vec::default();

        for (segment, token) in self.0.iter().zip(path) {
            match segment {
                Segment::Literal(word) => {
                    if word != token {
                        return None;
                    }
                }
                Segment::Binder(key) => bindings.push((key.clone(), token.clone())),
            }
        }

        Some(bindings)
    }

    /// Whether some input could be admitted by both `self` and `other`.
    pub(crate) fn overlaps(&self, other: &PathPattern) -> bool {
        self.0.iter().zip(other.0.iter()).all(|pair| match pair {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            _ => true,
        })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", words.join(" "))
    }
}

/// An error in the router configuration, detected by [`crate::CommandLineRouter::build`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A prefix was empty.
    #[error("Config error: prefix group '{0}' contains an empty prefix.")]
    EmptyPrefix(String),

    /// The same prefix string was registered twice.
    #[error("Config error: cannot duplicate the prefix '{0}'.")]
    DuplicatePrefix(String),

    /// The same prefix group was registered twice.
    #[error("Config error: cannot duplicate the prefix group '{0}'.")]
    DuplicatePrefixGroup(String),

    /// A flag or binder references a group that has not been registered.
    #[error("Config error: prefix group '{0}' does not exist.")]
    UnknownPrefixGroup(String),

    /// No prefix group is registered, but a binder needs one.
    #[error("Config error: binder '{0}' needs a prefix group, but none are registered.")]
    NoPrefixGroups(String),

    /// A flag declaration was empty or had too many words.
    #[error("Config error: invalid flag declaration '{0}' (expected 'key' or 'key shorthand').")]
    InvalidFlagDeclaration(String),

    /// Two visible flags share a key or shorthand within one group.
    #[error("Config error: cannot duplicate the flag '{0}' within the command '{1}'.")]
    DuplicateFlag(String, String),

    /// A command path contained no words.
    #[error("Config error: command path cannot be empty.")]
    EmptyCommandPath,

    /// A command path word looked like a binder but could not be parsed as one.
    #[error("Config error: malformed binder segment '{0}'.")]
    MalformedBinder(String),

    /// Two sibling commands could both match the same input.
    #[error("Config error: commands '{0}' and '{1}' are ambiguous under '{2}'.")]
    AmbiguousCommands(String, String, String),
}
