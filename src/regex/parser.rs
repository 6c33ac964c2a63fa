use std::iter::Peekable;
use std::str::CharIndices;

use tracing::trace;

use crate::error::{ParseError, ParseErrorKind};
use crate::flags::RegexFlags;
use crate::regex::ast::{AnchorKind, CategoryKind, Token, Unsupported};

const MAX_NESTING: usize = 200;

/// A pattern together with its flags and parsed token tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    text: String,
    flags: RegexFlags,
    tokens: Vec<Token>,
}

impl Pattern {
    /// Parse `text` with the given flags. Inline global flags such as `(?i)`
    /// are folded into [`Pattern::flags`].
    pub fn compile(text: &str, flags: impl Into<RegexFlags>) -> Result<Self, ParseError> {
        let (tokens, flags) = parse_with_flags(text, flags.into())?;
        Ok(Pattern {
            text: text.to_owned(),
            flags,
            tokens,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn flags(&self) -> RegexFlags {
        self.flags
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

pub fn parse_regex(pattern: &str) -> Result<Vec<Token>, ParseError> {
    parse_with_flags(pattern, RegexFlags::EMPTY).map(|(tokens, _)| tokens)
}

/// Parse a pattern, returning its tokens and the flags in effect after any
/// inline global flags.
pub fn parse_with_flags(
    pattern: &str,
    flags: RegexFlags,
) -> Result<(Vec<Token>, RegexFlags), ParseError> {
    let (tokens, found) = parse_once(pattern, flags)?;

    // (?x) anywhere changes how the whole pattern reads
    if found.contains(RegexFlags::VERBOSE) && !flags.contains(RegexFlags::VERBOSE) {
        return parse_once(pattern, found);
    }

    trace!(pattern, flags = found.bits(), count = tokens.len(), "parsed pattern");
    Ok((tokens, found))
}

fn parse_once(pattern: &str, flags: RegexFlags) -> Result<(Vec<Token>, RegexFlags), ParseError> {
    let mut parser = Parser::new(pattern, flags);
    let tokens = parser.parse_alternation()?;
    if parser.peek().is_some() {
        return Err(parser.error(ParseErrorKind::UnbalancedParenthesis));
    }
    Ok((tokens, parser.global_flags))
}

struct Parser<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    // flags in scope at the cursor, including (?flags:...) groups
    flags: RegexFlags,
    global_flags: RegexFlags,
    // open groups around the cursor
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, flags: RegexFlags) -> Self {
        Parser {
            src,
            chars: src.char_indices().peekable(),
            flags,
            global_flags: flags,
            depth: 0,
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.src.len(), |&(i, _)| i)
    }

    fn error(&mut self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.offset())
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn expect_close(&mut self, open_at: usize) -> Result<(), ParseError> {
        if self.eat(')') {
            Ok(())
        } else {
            Err(ParseError::new(ParseErrorKind::UnterminatedGroup, open_at))
        }
    }

    fn parse_alternation(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut branches = vec![self.parse_sequence()?];
        while self.eat('|') {
            branches.push(self.parse_sequence()?);
        }
        if branches.len() == 1 {
            Ok(branches.swap_remove(0))
        } else {
            Ok(vec![Token::Alternation(branches)])
        }
    }

    fn parse_sequence(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            if self.flags.contains(RegexFlags::VERBOSE) {
                if c.is_whitespace() {
                    self.bump();
                    continue;
                }
                if c == '#' {
                    while let Some(skipped) = self.bump() {
                        if skipped == '\n' {
                            break;
                        }
                    }
                    continue;
                }
            }

            match c {
                '|' | ')' => break,
                '*' | '+' | '?' | '{' => {
                    let at = self.offset();
                    let Some((min, max)) = self.parse_quantifier()? else {
                        // a brace that doesn't form a count is just a brace
                        self.bump();
                        tokens.push(Token::Literal('{'));
                        continue;
                    };
                    let lazy = self.eat('?');
                    let body = match tokens.pop() {
                        None | Some(Token::Anchor(_)) => {
                            return Err(ParseError::new(ParseErrorKind::NothingToRepeat, at));
                        }
                        Some(Token::Repeat { .. }) => {
                            return Err(ParseError::new(ParseErrorKind::MultipleRepeat, at));
                        }
                        Some(body) => body,
                    };
                    tokens.push(Token::Repeat {
                        min,
                        max,
                        lazy,
                        body: Box::new(body),
                    });
                }
                _ => {
                    if let Some(token) = self.parse_atom()? {
                        tokens.push(token);
                    }
                }
            }
        }
        Ok(tokens)
    }

    /// Consume a quantifier, returning its bounds. Returns `None` without
    /// consuming anything for a `{` that isn't a valid count.
    fn parse_quantifier(&mut self) -> Result<Option<(u32, Option<u32>)>, ParseError> {
        let at = self.offset();
        match self.peek() {
            Some('*') => {
                self.bump();
                return Ok(Some((0, None)));
            }
            Some('+') => {
                self.bump();
                return Ok(Some((1, None)));
            }
            Some('?') => {
                self.bump();
                return Ok(Some((0, Some(1))));
            }
            _ => {}
        }

        let src = self.src;
        let Some((len, lo, hi)) = scan_count(&src[at..]) else {
            return Ok(None);
        };
        for _ in 0..len {
            self.chars.next();
        }

        let number = |digits: &str| {
            digits
                .parse::<u32>()
                .map_err(|_| ParseError::new(ParseErrorKind::RepeatBounds, at))
        };
        let min = if lo.is_empty() { 0 } else { number(lo)? };
        let max = match hi {
            None => Some(min),
            Some("") => None,
            Some(hi) => Some(number(hi)?),
        };
        if max.is_some_and(|max| max < min) {
            return Err(ParseError::new(ParseErrorKind::RepeatBounds, at));
        }
        Ok(Some((min, max)))
    }

    fn parse_atom(&mut self) -> Result<Option<Token>, ParseError> {
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        match c {
            '(' => self.parse_group(),
            '[' => self.parse_class().map(Some),
            '\\' => self.parse_escape().map(Some),
            _ => {
                self.bump();
                Ok(Some(match c {
                    '.' => Token::Wildcard,
                    '^' => Token::Anchor(AnchorKind::StartOfString),
                    '$' => Token::Anchor(AnchorKind::EndOfString),
                    _ => Token::Literal(c),
                }))
            }
        }
    }

    fn parse_group(&mut self) -> Result<Option<Token>, ParseError> {
        if self.depth == MAX_NESTING {
            return Err(self.error(ParseErrorKind::TooDeep));
        }
        self.depth += 1;
        let group = self.parse_group_body();
        self.depth -= 1;
        group
    }

    fn parse_group_body(&mut self) -> Result<Option<Token>, ParseError> {
        let open_at = self.offset();
        self.bump(); // (

        if !self.eat('?') {
            let inner = self.parse_alternation()?;
            self.expect_close(open_at)?;
            return Ok(Some(Token::Group(inner)));
        }

        let Some(kind) = self.peek() else {
            return Err(self.error(ParseErrorKind::UnexpectedEnd));
        };
        match kind {
            ':' => {
                self.bump();
                let inner = self.parse_alternation()?;
                self.expect_close(open_at)?;
                Ok(Some(Token::Group(inner)))
            }
            'P' => {
                self.bump();
                if self.eat('<') {
                    self.read_group_name('>')?;
                    let inner = self.parse_alternation()?;
                    self.expect_close(open_at)?;
                    Ok(Some(Token::Group(inner)))
                } else if self.eat('=') {
                    let name = self.read_group_name(')')?;
                    Ok(Some(Token::Unsupported(Unsupported::Backreference(name))))
                } else {
                    Err(self.error(ParseErrorKind::UnknownExtension('P')))
                }
            }
            '=' | '!' => {
                self.bump();
                self.parse_lookaround(open_at, true, kind == '!')
            }
            '<' => {
                self.bump();
                match self.bump() {
                    Some(dir @ ('=' | '!')) => self.parse_lookaround(open_at, false, dir == '!'),
                    _ => Err(ParseError::new(ParseErrorKind::UnknownExtension('<'), open_at)),
                }
            }
            '#' => {
                while let Some(c) = self.bump() {
                    if c == ')' {
                        return Ok(None);
                    }
                }
                Err(ParseError::new(ParseErrorKind::UnterminatedGroup, open_at))
            }
            '(' => {
                self.bump();
                let name = self.read_group_name(')')?;
                // yes|no branches are parsed for well-formedness only
                self.parse_alternation()?;
                self.expect_close(open_at)?;
                Ok(Some(Token::Unsupported(Unsupported::Conditional(name))))
            }
            c if c == '-' || RegexFlags::from_letter(c).is_some() => self.parse_flags(open_at),
            c => Err(self.error(ParseErrorKind::UnknownExtension(c))),
        }
    }

    fn parse_lookaround(
        &mut self,
        open_at: usize,
        ahead: bool,
        negative: bool,
    ) -> Result<Option<Token>, ParseError> {
        self.parse_alternation()?;
        self.expect_close(open_at)?;
        Ok(Some(Token::Unsupported(Unsupported::Lookaround {
            ahead,
            negative,
        })))
    }

    /// `(?imsx)` sets flags for the rest of the pattern, `(?i-s:...)` scopes
    /// them to a group.
    fn parse_flags(&mut self, open_at: usize) -> Result<Option<Token>, ParseError> {
        let mut add = RegexFlags::EMPTY;
        let mut remove = RegexFlags::EMPTY;
        let mut removing = false;

        loop {
            match self.bump() {
                Some(')') if !removing => {
                    self.flags |= add;
                    self.global_flags |= add;
                    return Ok(None);
                }
                Some(':') => break,
                Some('-') if !removing => removing = true,
                Some(letter) => {
                    let flag = RegexFlags::from_letter(letter)
                        .ok_or_else(|| self.error(ParseErrorKind::BadFlag(letter)))?;
                    if removing {
                        remove |= flag;
                    } else {
                        add |= flag;
                    }
                }
                None => return Err(ParseError::new(ParseErrorKind::UnexpectedEnd, open_at)),
            }
        }

        let outer = self.flags;
        self.flags = (outer | add).without(remove);
        let inner = self.parse_alternation();
        self.flags = outer;
        let inner = inner?;
        self.expect_close(open_at)?;
        Ok(Some(Token::Group(inner)))
    }

    fn read_group_name(&mut self, terminator: char) -> Result<String, ParseError> {
        let at = self.offset();
        let mut name = String::new();
        loop {
            match self.bump() {
                Some(c) if c == terminator => break,
                Some(c) => name.push(c),
                None => return Err(ParseError::new(ParseErrorKind::UnexpectedEnd, at)),
            }
        }
        let valid_identifier = name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        let valid_number = !name.is_empty() && name.chars().all(|c| c.is_ascii_digit());
        if valid_identifier || (terminator == ')' && valid_number) {
            Ok(name)
        } else {
            Err(ParseError::new(ParseErrorKind::BadGroupName(name), at))
        }
    }

    fn parse_class(&mut self) -> Result<Token, ParseError> {
        let open_at = self.offset();
        self.bump(); // [
        let negated = self.eat('^');
        let mut items = Vec::new();
        let mut first = true;

        loop {
            let item_at = self.offset();
            let item = match self.bump() {
                None => return Err(ParseError::new(ParseErrorKind::UnterminatedClass, open_at)),
                Some(']') if !first => break,
                Some('\\') => self.parse_class_escape(item_at)?,
                Some(c) => Token::Literal(c),
            };
            first = false;

            let Token::Literal(lo) = item else {
                items.push(item);
                continue;
            };
            if !self.range_follows() {
                items.push(item);
                continue;
            }
            self.bump(); // -
            let hi_at = self.offset();
            let hi = match self.bump() {
                Some('\\') => match self.parse_class_escape(hi_at)? {
                    Token::Literal(hi) => hi,
                    _ => return Err(ParseError::new(ParseErrorKind::BadRange(lo, '\\'), hi_at)),
                },
                Some(hi) => hi,
                None => return Err(ParseError::new(ParseErrorKind::UnterminatedClass, open_at)),
            };
            if hi < lo {
                return Err(ParseError::new(ParseErrorKind::BadRange(lo, hi), item_at));
            }
            items.push(Token::CharRange(lo, hi));
        }

        if negated {
            return Ok(Token::Unsupported(Unsupported::NegatedClass));
        }
        if let [Token::Literal(c)] = items.as_slice() {
            return Ok(Token::Literal(*c));
        }
        Ok(Token::CharClass(items))
    }

    // a `-` that is neither last in the class nor at the end of input
    fn range_follows(&mut self) -> bool {
        let mut ahead = self.chars.clone();
        if ahead.next().map(|(_, c)| c) != Some('-') {
            return false;
        }
        !matches!(ahead.next(), None | Some((_, ']')))
    }

    fn parse_escape(&mut self) -> Result<Token, ParseError> {
        let at = self.offset();
        self.bump(); // \
        let Some(c) = self.bump() else {
            return Err(ParseError::new(ParseErrorKind::BadEscape("\\".into()), at));
        };
        if let Some(kind) = category(c) {
            return Ok(Token::Category(kind));
        }
        let anchor = match c {
            'A' => Some(AnchorKind::StartOfStringAbs),
            'Z' => Some(AnchorKind::EndOfStringAbs),
            'b' => Some(AnchorKind::WordBoundary),
            'B' => Some(AnchorKind::NotWordBoundary),
            _ => None,
        };
        if let Some(kind) = anchor {
            return Ok(Token::Anchor(kind));
        }
        match c {
            '0' => self.read_octal(c, at).map(Token::Literal),
            '1'..='9' => {
                let mut digits = String::from(c);
                if let Some(d) = self.peek().filter(char::is_ascii_digit) {
                    digits.push(d);
                    self.bump();
                    let octal = digits.chars().all(|d| d < '8');
                    if let Some(d) = self.peek().filter(|d| octal && ('0'..='7').contains(d)) {
                        digits.push(d);
                        self.bump();
                        return octal_char(&digits, at).map(Token::Literal);
                    }
                }
                Ok(Token::Unsupported(Unsupported::Backreference(digits)))
            }
            _ => self.parse_simple_escape(c, at).map(Token::Literal),
        }
    }

    fn parse_class_escape(&mut self, at: usize) -> Result<Token, ParseError> {
        let Some(c) = self.bump() else {
            return Err(ParseError::new(ParseErrorKind::BadEscape("\\".into()), at));
        };
        if let Some(kind) = category(c) {
            return Ok(Token::Category(kind));
        }
        match c {
            'b' => Ok(Token::Literal('\x08')),
            '0'..='7' => self.read_octal(c, at).map(Token::Literal),
            _ => self.parse_simple_escape(c, at).map(Token::Literal),
        }
    }

    /// Escapes shared by classes and the top level: control characters, hex
    /// and unicode codes, and escaped punctuation.
    fn parse_simple_escape(&mut self, c: char, at: usize) -> Result<char, ParseError> {
        match c {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            'f' => Ok('\x0c'),
            'v' => Ok('\x0b'),
            'a' => Ok('\x07'),
            'x' => self.read_hex(c, 2, at),
            'u' => self.read_hex(c, 4, at),
            'U' => self.read_hex(c, 8, at),
            c if c.is_ascii_alphanumeric() => {
                Err(ParseError::new(ParseErrorKind::BadEscape(format!("\\{c}")), at))
            }
            c => Ok(c),
        }
    }

    fn read_hex(&mut self, marker: char, len: usize, at: usize) -> Result<char, ParseError> {
        let mut digits = String::new();
        for _ in 0..len {
            match self.peek().filter(char::is_ascii_hexdigit) {
                Some(d) => {
                    digits.push(d);
                    self.bump();
                }
                None => break,
            }
        }
        let bad = || ParseError::new(ParseErrorKind::BadEscape(format!("\\{marker}{digits}")), at);
        if digits.len() != len {
            return Err(bad());
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(bad)
    }

    // up to three octal digits, the first already consumed
    fn read_octal(&mut self, first: char, at: usize) -> Result<char, ParseError> {
        let mut digits = String::from(first);
        while digits.len() < 3 {
            match self.peek().filter(|d| ('0'..='7').contains(d)) {
                Some(d) => {
                    digits.push(d);
                    self.bump();
                }
                None => break,
            }
        }
        octal_char(&digits, at)
    }
}

/// Match a `{m}`, `{m,}`, `{,n}` or `{m,n}` count at the start of `text`,
/// returning its byte length and digit runs. `{}` and `{x` are not counts.
pub(crate) fn scan_count(text: &str) -> Option<(usize, &str, Option<&str>)> {
    let rest = text.strip_prefix('{')?;
    let lo_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let (lo, rest) = rest.split_at(lo_len);
    let (hi, rest) = match rest.strip_prefix(',') {
        Some(after) => {
            let hi_len = after.bytes().take_while(u8::is_ascii_digit).count();
            let (hi, rest) = after.split_at(hi_len);
            (Some(hi), rest)
        }
        None => (None, rest),
    };
    if !rest.starts_with('}') || (lo.is_empty() && hi.is_none()) {
        return None;
    }
    Some((text.len() - rest.len() + 1, lo, hi))
}

fn category(c: char) -> Option<CategoryKind> {
    match c {
        'd' => Some(CategoryKind::Digit),
        'D' => Some(CategoryKind::NotDigit),
        's' => Some(CategoryKind::Space),
        'S' => Some(CategoryKind::NotSpace),
        'w' => Some(CategoryKind::Word),
        'W' => Some(CategoryKind::NotWord),
        _ => None,
    }
}

fn octal_char(digits: &str, at: usize) -> Result<char, ParseError> {
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|&code| code <= 0o377)
        .and_then(char::from_u32)
        .ok_or_else(|| ParseError::new(ParseErrorKind::BadEscape(format!("\\{digits}")), at))
}
