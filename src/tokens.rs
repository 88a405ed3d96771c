mod prefix;
mod splitter;

pub(crate) use prefix::PrefixTable;
pub use splitter::{FlagArg, Tokens};
pub(crate) use splitter::Tokenizer;
