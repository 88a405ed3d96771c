//! Stock validators for use with [`crate::Flag::validator`].
//!
//! ### Example
//! ```
//! use cmdroute::{CommandLineRouter, Flag, FlagPrefix, validators};
//!
//! let router = CommandLineRouter::new("program")
//!     .prefix(FlagPrefix::new("option", "--"))
//!     .flag(Flag::new("option", "ratio").validator(validators::number))
//!     .flag(Flag::new("option", "dry").validator(validators::boolean))
//!     .action(|_| Ok(()))
//!     .build()
//!     .unwrap();
//!
//! router.run_tokens(&["--ratio", "0.5", "--dry"]).unwrap();
//!
//! let error = router.run_tokens(&["--ratio", "half", "--dry", "maybe"]).unwrap_err();
//! assert_eq!(
//!     error.to_string(),
//!     "Validation error: --ratio 'half': Must be a valid number.\n--dry 'maybe': Must be a valid boolean value."
//! );
//! ```
use crate::flags::InvalidValue;

/// Reject the empty value.
pub fn required(value: &str) -> Result<(), InvalidValue> {
    if value.is_empty() {
        Err(InvalidValue::new("Required."))
    } else {
        Ok(())
    }
}

/// Accept values that parse as an `i64`.
pub fn int(value: &str) -> Result<(), InvalidValue> {
    value
        .parse::<i64>()
        .map(|_| ())
        .map_err(|_| InvalidValue::new("Must be a valid int."))
}

/// Accept values that parse as an `f64`.
pub fn number(value: &str) -> Result<(), InvalidValue> {
    value
        .parse::<f64>()
        .map(|_| ())
        .map_err(|_| InvalidValue::new("Must be a valid number."))
}

/// Accept `true` or `false`.
pub fn boolean(value: &str) -> Result<(), InvalidValue> {
    value
        .parse::<bool>()
        .map(|_| ())
        .map_err(|_| InvalidValue::new("Must be a valid boolean value."))
}
