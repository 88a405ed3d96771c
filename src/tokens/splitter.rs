use crate::constant::*;
use crate::model::FlagKey;
use crate::tokens::PrefixTable;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// One flag found in the input tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagArg {
    key: FlagKey,
    prefix: String,
    value: Option<String>,
}

impl FlagArg {
    pub(crate) fn new(key: FlagKey, prefix: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key,
            prefix: prefix.into(),
            value,
        }
    }

    /// The flag's group and name, as typed.
    pub fn key(&self) -> &FlagKey {
        &self.key
    }

    /// The literal prefix used on the command line (ex: `-` for `-p`).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The value given to the flag, if one followed it.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The value given to the flag, or the boolean sentinel `"true"` when none followed it.
    pub fn value_or_true(&self) -> &str {
        self.value.as_deref().unwrap_or(TRUE_SENTINEL)
    }
}

/// The input tokens, split into the command path and the flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    path: Vec<String>,
    flags: Vec<FlagArg>,
}

impl Tokens {
    /// The non-flag tokens, in order.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The flags, in order.
    pub fn flags(&self) -> &[FlagArg] {
        &self.flags
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<FlagArg>) {
        (self.path, self.flags)
    }
}

#[derive(Debug)]
pub(crate) struct Tokenizer<'t> {
    prefixes: &'t PrefixTable,
    tokens: Tokens,
    open: Option<FlagArg>,
}

impl<'t> Tokenizer<'t> {
    pub(crate) fn new(prefixes: &'t PrefixTable) -> Self {
        Self {
            prefixes,
            tokens: Tokens::default(),
            open: None,
        }
    }

    pub(crate) fn split<S: AsRef<str>>(prefixes: &'t PrefixTable, args: &[S]) -> Tokens {
        let mut tokenizer = Tokenizer::new(prefixes);

        for arg in args {
            tokenizer.feed(arg.as_ref());
        }

        tokenizer.close()
    }

    pub(crate) fn feed(&mut self, token: &str) {
        // 1. A prefixed token always opens a flag, such as:
        //  --person
        //  --person=..
        //  -p
        // 2. Otherwise, the token is the value of the open flag.
        // 3. Otherwise, the token belongs to the command path.
        if let Some((group, prefix, name)) = self.prefixes.split(token) {
            // The previous flag (if any) is left without a value.
            self.close_open(None);

            match name.split_once(VALUE_DELIMITER) {
                Some((name, value)) if !name.is_empty() => {
                    self.push(FlagArg::new(
                        FlagKey::new(group, name),
                        prefix,
                        Some(value.to_string()),
                    ));
                }
                _ => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Opening flag '{prefix}{name}' ({group}).");
                    }

                    self.open
                        .replace(FlagArg::new(FlagKey::new(group, name), prefix, None));
                }
            }
        } else if self.open.is_some() {
            self.close_open(Some(token.to_string()));
        } else {
            self.tokens.path.push(token.to_string());
        }
    }

    pub(crate) fn close(mut self) -> Tokens {
        self.close_open(None);
        self.tokens
    }

    fn close_open(&mut self, value: Option<String>) {
        if let Some(mut flag_arg) = self.open.take() {
            flag_arg.value = value;
            self.push(flag_arg);
        }
    }

    fn push(&mut self, flag_arg: FlagArg) {
        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Closing flag '{}{}' with value {:?}.",
                flag_arg.prefix,
                flag_arg.key.name(),
                flag_arg.value
            );
        }

        self.tokens.flags.push(flag_arg);
    }
}
