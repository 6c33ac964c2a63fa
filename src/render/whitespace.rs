//! Pulls leading and trailing spaces out of a pattern so they can be shown
//! explicitly instead of disappearing at the edges of a rendered sample.
//!
//! Spaces are measured on the pattern text first and, for an end where the
//! text shows none, on the parsed tokens. The two can disagree: `[ ]a` has no
//! leading space in its text but starts with a space token.

use tracing::debug;

use crate::error::ParseError;
use crate::flags::RegexFlags;
use crate::regex::parser::scan_count;
use crate::regex::{Pattern, Token};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceRuns {
    pub leading: usize,
    pub trailing: usize,
}

/// A pattern body with its edge spaces removed and counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub tokens: Vec<Token>,
    pub spaces: SpaceRuns,
    pub flags: RegexFlags,
}

/// Count the runs of `' '` at either end of `text`. The trailing run is
/// measured on what the leading run leaves, so an all-space text is all
/// leading.
pub fn count_from_text(text: &str) -> SpaceRuns {
    let mut leading = text.bytes().take_while(|&b| b == b' ').count();
    let rest = &text[leading..];
    // the last space must stay in the body if a quantifier applies to it
    let quantified = rest.starts_with(['*', '+', '?']) || scan_count(rest).is_some();
    if leading > 0 && quantified {
        leading -= 1;
    }
    let rest = &text[leading..];

    let mut trailing = rest.bytes().rev().take_while(|&b| b == b' ').count();
    let before = &rest[..rest.len() - trailing];
    let backslashes = before.bytes().rev().take_while(|&b| b == b'\\').count();
    if trailing > 0 && backslashes % 2 == 1 {
        trailing -= 1;
    }
    SpaceRuns { leading, trailing }
}

/// Count the `Literal(' ')` tokens at either end of a top-level sequence.
pub fn count_from_tokens(tokens: &[Token]) -> SpaceRuns {
    let leading = tokens.iter().take_while(|t| t.is_space()).count();
    let trailing = tokens[leading..]
        .iter()
        .rev()
        .take_while(|t| t.is_space())
        .count();
    SpaceRuns { leading, trailing }
}

/// Strip and count edge spaces, then parse what remains.
pub fn normalize(text: &str, flags: impl Into<RegexFlags>) -> Result<Normalized, ParseError> {
    let text = text.replace('\t', r"\t");
    let mut spaces = count_from_text(&text);
    let body = &text[spaces.leading..text.len() - spaces.trailing];

    let pattern = Pattern::compile(body, flags)?;
    let flags = pattern.flags();
    if flags.contains(RegexFlags::VERBOSE) {
        // raw whitespace means nothing to a verbose pattern
        spaces = SpaceRuns::default();
    }

    let mut tokens = pattern.into_tokens();
    let from_tokens = count_from_tokens(&tokens);
    if spaces.leading == 0 {
        spaces.leading = from_tokens.leading;
        tokens.drain(..from_tokens.leading);
    }
    if spaces.trailing == 0 {
        spaces.trailing = from_tokens.trailing;
        tokens.truncate(tokens.len() - from_tokens.trailing);
    }

    debug!(
        leading = spaces.leading,
        trailing = spaces.trailing,
        "extracted edge spaces"
    );
    Ok(Normalized {
        tokens,
        spaces,
        flags,
    })
}
