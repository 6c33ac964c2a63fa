use thiserror::Error;

use crate::regex::ast::Unsupported;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("nothing to repeat")]
    NothingToRepeat,
    #[error("multiple repeat")]
    MultipleRepeat,
    #[error("min repeat greater than max repeat")]
    RepeatBounds,
    #[error("missing ), unterminated subpattern")]
    UnterminatedGroup,
    #[error("unbalanced parenthesis")]
    UnbalancedParenthesis,
    #[error("unterminated character set")]
    UnterminatedClass,
    #[error("bad character range {0}-{1}")]
    BadRange(char, char),
    #[error("bad escape {0}")]
    BadEscape(String),
    #[error("unknown extension ?{0}")]
    UnknownExtension(char),
    #[error("bad inline flag {0:?}")]
    BadFlag(char),
    #[error("bad group name {0:?}")]
    BadGroupName(String),
    #[error("unexpected end of pattern")]
    UnexpectedEnd,
    #[error("too many nested parentheses")]
    TooDeep,
}

/// A pattern could not be turned into a token tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at position {offset}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset into the pattern text.
    pub offset: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("cannot render {0}")]
    Unsupported(Unsupported),
    #[error("malformed token tree: {0}")]
    Malformed(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_names_offset() {
        let err = ParseError::new(ParseErrorKind::NothingToRepeat, 3);
        assert_eq!(err.to_string(), "nothing to repeat at position 3");
    }

    #[test]
    fn nesting_error_display() {
        let err = ParseError::new(ParseErrorKind::TooDeep, 200);
        assert_eq!(err.to_string(), "too many nested parentheses at position 200");
    }

    #[test]
    fn render_error_wraps_parse_error() {
        let err: RenderError = ParseError::new(ParseErrorKind::UnterminatedClass, 0).into();
        assert_eq!(err.to_string(), "unterminated character set at position 0");
    }

    #[test]
    fn unsupported_display() {
        let err = RenderError::Unsupported(Unsupported::Lookaround {
            ahead: false,
            negative: true,
        });
        assert_eq!(err.to_string(), "cannot render negative lookbehind assertion");
    }
}
