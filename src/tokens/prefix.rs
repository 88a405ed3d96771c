use std::collections::HashSet;

use crate::model::{ConfigError, FlagPrefix};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Lookup from a literal prefix to its group, computed once when the router is built.
#[derive(Debug, Clone, Default)]
pub(crate) struct PrefixTable {
    // (prefix, group), longest prefix first.
    entries: Vec<(String, String)>,
    // (group, canonical prefix), in registration order.
    groups: Vec<(String, String)>,
}

impl PrefixTable {
    pub(crate) fn new(prefixes: &[FlagPrefix]) -> Result<Self, ConfigError> {
        let mut entries: Vec<(String, String)> = Vec::default();
        let mut groups: Vec<(String, String)> = Vec::default();
        let mut seen_prefixes = HashSet::new();

        for flag_prefix in prefixes {
            if groups.iter().any(|(g, _)| g == flag_prefix.group()) {
                return Err(ConfigError::DuplicatePrefixGroup(
                    flag_prefix.group().to_string(),
                ));
            }

            for prefix in flag_prefix.prefixes() {
                if prefix.is_empty() {
                    return Err(ConfigError::EmptyPrefix(flag_prefix.group().to_string()));
                }

                if !seen_prefixes.insert(prefix.to_string()) {
                    return Err(ConfigError::DuplicatePrefix(prefix.to_string()));
                }

                entries.push((prefix.to_string(), flag_prefix.group().to_string()));
            }

            groups.push((
                flag_prefix.group().to_string(),
                flag_prefix.key().to_string(),
            ));
        }

        // Stable, so equal length prefixes keep their registration order.
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Prefix table (longest first): {entries:?}.");
        }

        Ok(Self { entries, groups })
    }

    /// Split a token into `(group, literal prefix, name)` when it starts with a registered prefix.
    ///
    /// Only the longest matching prefix is considered.
    /// A token made up of nothing but that prefix is not a flag.
    pub(crate) fn split<'a>(&'a self, token: &'a str) -> Option<(&'a str, &'a str, &'a str)> {
        let (prefix, group) = self
            .entries
            .iter()
            .find(|(prefix, _)| token.starts_with(prefix.as_str()))?;
        let name = &token[prefix.len()..];

        if name.is_empty() {
            None
        } else {
            Some((group.as_str(), prefix.as_str(), name))
        }
    }

    pub(crate) fn contains_group(&self, group: &str) -> bool {
        self.groups.iter().any(|(g, _)| g == group)
    }

    /// The group of the first registered prefix.
    pub(crate) fn default_group(&self) -> Option<&str> {
        self.groups.first().map(|(g, _)| g.as_str())
    }

    /// The canonical prefix of a group.
    pub(crate) fn canonical(&self, group: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, prefix)| prefix.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn option_table() -> PrefixTable {
        PrefixTable::new(&[
            FlagPrefix::new("option", "-").shorthand("--"),
            FlagPrefix::new("setting", "#"),
        ])
        .unwrap()
    }

    #[rstest]
    #[case("--x", Some(("option", "--", "x")))]
    #[case("-x", Some(("option", "-", "x")))]
    #[case("---x", Some(("option", "--", "-x")))]
    #[case("#x", Some(("setting", "#", "x")))]
    #[case("x", None)]
    #[case("--", None)]
    #[case("-", None)]
    #[case("#", None)]
    fn split(#[case] token: &str, #[case] expected: Option<(&str, &str, &str)>) {
        assert_eq!(option_table().split(token), expected);
    }

    #[test]
    fn groups() {
        let table = option_table();

        assert!(table.contains_group("option"));
        assert!(table.contains_group("setting"));
        assert!(!table.contains_group("moot"));
        assert_eq!(table.default_group(), Some("option"));
        assert_eq!(table.canonical("option"), Some("-"));
        assert_eq!(table.canonical("setting"), Some("#"));
        assert_eq!(table.canonical("moot"), None);
    }

    #[test]
    fn empty() {
        let table = PrefixTable::new(&[]).unwrap();

        assert_eq!(table.split("--x"), None);
        assert_eq!(table.default_group(), None);
    }

    #[rstest]
    #[case(vec![FlagPrefix::new("option", "")], ConfigError::EmptyPrefix("option".to_string()))]
    #[case(vec![FlagPrefix::new("option", "--").shorthand("")], ConfigError::EmptyPrefix("option".to_string()))]
    #[case(vec![FlagPrefix::new("option", "--").shorthand("--")], ConfigError::DuplicatePrefix("--".to_string()))]
    #[case(vec![FlagPrefix::new("option", "--"), FlagPrefix::new("other", "--")], ConfigError::DuplicatePrefix("--".to_string()))]
    #[case(vec![FlagPrefix::new("option", "--"), FlagPrefix::new("option", "-")], ConfigError::DuplicatePrefixGroup("option".to_string()))]
    fn invalid(#[case] prefixes: Vec<FlagPrefix>, #[case] expected: ConfigError) {
        assert_eq!(PrefixTable::new(&prefixes).unwrap_err(), expected);
    }
}
