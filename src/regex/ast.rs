use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    StartOfString,    // ^
    EndOfString,      // $
    StartOfStringAbs, // \A
    EndOfStringAbs,   // \Z
    WordBoundary,     // \b
    NotWordBoundary,  // \B
}

impl AnchorKind {
    pub fn symbol(self) -> &'static str {
        match self {
            AnchorKind::StartOfString => "^",
            AnchorKind::EndOfString => "$",
            AnchorKind::StartOfStringAbs => r"\A",
            AnchorKind::EndOfStringAbs => r"\Z",
            AnchorKind::WordBoundary => r"\b",
            AnchorKind::NotWordBoundary => r"\B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Digit,    // \d
    NotDigit, // \D
    Space,    // \s
    NotSpace, // \S
    Word,     // \w
    NotWord,  // \W
}

impl CategoryKind {
    pub fn symbol(self) -> &'static str {
        match self {
            CategoryKind::Digit => r"\d",
            CategoryKind::NotDigit => r"\D",
            CategoryKind::Space => r"\s",
            CategoryKind::NotSpace => r"\S",
            CategoryKind::Word => r"\w",
            CategoryKind::NotWord => r"\W",
        }
    }
}

/// Constructs the parser understands but which have no rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unsupported {
    Backreference(String), // \1, (?P=name)
    // (?=...), (?!...), (?<=...), (?<!...)
    Lookaround { ahead: bool, negative: bool },
    // [^abc]; the whole class is left out, items included
    NegatedClass,
    Conditional(String), // (?(1)yes|no)
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsupported::Backreference(group) => write!(f, "backreference to group {group}"),
            Unsupported::Lookaround { ahead, negative } => {
                let polarity = if *negative { "negative" } else { "positive" };
                let direction = if *ahead { "lookahead" } else { "lookbehind" };
                write!(f, "{polarity} {direction} assertion")
            }
            Unsupported::NegatedClass => write!(f, "negated character class"),
            Unsupported::Conditional(group) => write!(f, "conditional on group {group}"),
        }
    }
}

/// One node of a parsed pattern.
///
/// A pattern is a `Vec<Token>`; concatenation is implicit in the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(char),
    Anchor(AnchorKind),
    Group(Vec<Token>),     // (...), numbering and naming dropped
    CharClass(Vec<Token>), // [...]
    CharRange(char, char), // a-z, only inside a CharClass
    Category(CategoryKind),
    Repeat {
        min: u32,
        max: Option<u32>, // None is unbounded
        lazy: bool,
        body: Box<Token>,
    },
    Alternation(Vec<Vec<Token>>), // |
    Wildcard,                     // .
    Unsupported(Unsupported),
}

impl Token {
    pub fn is_space(&self) -> bool {
        matches!(self, Token::Literal(' '))
    }
}
