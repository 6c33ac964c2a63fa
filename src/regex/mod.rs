pub mod ast;
pub mod parser;

pub use ast::{AnchorKind, CategoryKind, Token, Unsupported};
pub use parser::{Pattern, parse_regex, parse_with_flags};
