// The value given to a flag that is specified without one (and has no default).
pub(crate) const TRUE_SENTINEL: &str = "true";

// Separates the key from its value in the single-token form `--key=value`.
pub(crate) const VALUE_DELIMITER: char = '=';

// Separates the group from the flag name inside a binder: `{{group:name}}`.
pub(crate) const BINDER_GROUP_DELIMITER: char = ':';

pub(crate) const BINDER_OPEN: &str = "{";
pub(crate) const BINDER_CLOSE: &str = "}";
pub(crate) const BINDER_OPEN_DOUBLE: &str = "{{";
pub(crate) const BINDER_CLOSE_DOUBLE: &str = "}}";
