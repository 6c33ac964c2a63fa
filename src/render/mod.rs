//! Walks a token tree and renders it through a [`Palette`].
//!
//! Groups are rendered as plain parentheses whatever their kind: capturing,
//! non-capturing, named and flag-scoped groups all come out as `(...)`.
//! Constructs with no rendering ([`Token::Unsupported`]) are skipped with a
//! warning unless the renderer is strict.

pub mod escape;
pub mod palette;
pub mod whitespace;

use tracing::warn;

use crate::error::RenderError;
use crate::flags::RegexFlags;
use crate::regex::{Pattern, Token};
use palette::{Palette, StyleSlot, Target};
use whitespace::Normalized;

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    palette: Palette,
    strict: bool,
}

impl Renderer {
    pub fn new(palette: Palette) -> Self {
        Renderer {
            palette,
            strict: false,
        }
    }

    pub fn for_target(target: Target) -> Self {
        Renderer::new(target.palette())
    }

    /// Fail on unsupported constructs instead of leaving them out.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Render a token sequence as-is, without pulling out edge spaces.
    pub fn render_tokens(&self, tokens: &[Token]) -> Result<String, RenderError> {
        let mut out = Fragments::new(&self.palette);
        self.walk(tokens, &mut out)?;
        Ok(self.palette.wrap(out.finish()))
    }

    /// Parse and render pattern text, showing edge spaces explicitly.
    pub fn render_str(&self, text: &str, flags: impl Into<RegexFlags>) -> Result<String, RenderError> {
        let normalized = whitespace::normalize(text, flags)?;
        self.render_normalized(&normalized)
    }

    pub fn render_pattern(&self, pattern: &Pattern) -> Result<String, RenderError> {
        self.render_str(pattern.as_str(), pattern.flags())
    }

    pub fn render_normalized(&self, normalized: &Normalized) -> Result<String, RenderError> {
        let mut out = Fragments::new(&self.palette);

        let leading = normalized.spaces.leading;
        if leading > 0 {
            out.bracketed_space();
            if leading > 1 {
                out.count(leading);
            }
        }

        self.walk(&normalized.tokens, &mut out)?;

        match normalized.spaces.trailing {
            0 => {}
            1 => out.bracketed_space(),
            n => {
                out.push(StyleSlot::Literal, " ");
                out.count(n);
            }
        }

        Ok(self.palette.wrap(out.finish()))
    }

    fn walk(&self, tokens: &[Token], out: &mut Fragments<'_>) -> Result<(), RenderError> {
        for token in tokens {
            self.walk_token(token, out)?;
        }
        Ok(())
    }

    fn walk_token(&self, token: &Token, out: &mut Fragments<'_>) -> Result<(), RenderError> {
        match token {
            Token::Literal(c) => out.push(StyleSlot::Literal, &literal_text(*c)),
            Token::Anchor(kind) => out.push(StyleSlot::Anchor, kind.symbol()),
            Token::Group(children) => {
                out.push(StyleSlot::Group, "(");
                self.walk(children, out)?;
                out.push(StyleSlot::Group, ")");
            }
            Token::CharClass(items) => {
                let bracketed = match items.as_slice() {
                    [] => return Err(RenderError::Malformed("empty character class")),
                    [Token::CharRange(..)] => true,
                    [_] => false,
                    _ => true,
                };
                if bracketed {
                    out.push(StyleSlot::CharClass, "[");
                }
                self.walk(items, out)?;
                if bracketed {
                    out.push(StyleSlot::CharClass, "]");
                }
            }
            Token::CharRange(lo, hi) => {
                out.push(StyleSlot::Literal, &literal_text(*lo));
                out.push(StyleSlot::Anchor, "-");
                out.push(StyleSlot::Literal, &literal_text(*hi));
            }
            Token::Category(kind) => out.push(StyleSlot::Category, kind.symbol()),
            Token::Repeat {
                min,
                max,
                lazy,
                body,
            } => {
                let (min, max) = (*min, *max);
                if max.is_some_and(|max| min > max) {
                    return Err(RenderError::Malformed("repeat minimum exceeds maximum"));
                }
                self.walk_token(body, out)?;
                match (min, max) {
                    (0, None) => out.push(StyleSlot::Repeat, "*"),
                    (1, None) => out.push(StyleSlot::Repeat, "+"),
                    (0, Some(1)) => out.push(StyleSlot::Repeat, "?"),
                    (min, Some(max)) if min == max => out.count(min),
                    (min, max) => {
                        out.push(StyleSlot::RepeatBrace, "{");
                        out.push(StyleSlot::Repeat, &min.to_string());
                        out.push(StyleSlot::Repeat, ",");
                        if let Some(max) = max {
                            out.push(StyleSlot::Repeat, &max.to_string());
                        }
                        out.push(StyleSlot::RepeatBrace, "}");
                    }
                }
                if *lazy {
                    out.push(StyleSlot::Repeat, "?");
                }
            }
            Token::Alternation(branches) => {
                if branches.len() < 2 {
                    return Err(RenderError::Malformed("alternation needs two branches"));
                }
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        out.push(StyleSlot::Alternation, "|");
                    }
                    self.walk(branch, out)?;
                }
            }
            Token::Wildcard => out.push(StyleSlot::Wildcard, "."),
            Token::Unsupported(construct) => {
                if self.strict {
                    return Err(RenderError::Unsupported(construct.clone()));
                }
                warn!(%construct, "leaving out a construct with no rendering");
            }
        }
        Ok(())
    }
}

/// Styled fragments in output order.
struct Fragments<'p> {
    palette: &'p Palette,
    buf: Vec<String>,
}

impl<'p> Fragments<'p> {
    fn new(palette: &'p Palette) -> Self {
        Fragments {
            palette,
            buf: Vec::new(),
        }
    }

    fn push(&mut self, slot: StyleSlot, raw: &str) {
        self.buf.push(self.palette.style(slot, raw));
    }

    // [ ]
    fn bracketed_space(&mut self) {
        self.push(StyleSlot::CharClass, "[");
        self.push(StyleSlot::Literal, " ");
        self.push(StyleSlot::CharClass, "]");
    }

    // {n}
    fn count(&mut self, n: impl ToString) {
        self.push(StyleSlot::RepeatBrace, "{");
        self.push(StyleSlot::Repeat, &n.to_string());
        self.push(StyleSlot::RepeatBrace, "}");
    }

    fn finish(self) -> String {
        self.buf.concat()
    }
}

fn literal_text(c: char) -> String {
    match c {
        '\t' => r"\t".to_owned(),
        '\n' => r"\n".to_owned(),
        '\r' => r"\r".to_owned(),
        '\x0b' => r"\v".to_owned(),
        '\x0c' => r"\f".to_owned(),
        c => c.to_string(),
    }
}

/// Render a token sequence with `palette`, including its wrap rule.
pub fn render(tokens: &[Token], palette: &Palette) -> Result<String, RenderError> {
    Renderer::new(palette.clone()).render_tokens(tokens)
}

/// Parse `text` and render it with `palette`, showing edge spaces explicitly.
pub fn render_regex(
    text: &str,
    flags: impl Into<RegexFlags>,
    palette: &Palette,
) -> Result<String, RenderError> {
    Renderer::new(palette.clone()).render_str(text, flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::{AnchorKind, CategoryKind, Unsupported};
    use rstest::rstest;

    fn plain(pattern: &str) -> String {
        render_regex(pattern, RegexFlags::EMPTY, &Palette::plain()).unwrap()
    }

    fn lit(s: &str) -> Vec<Token> {
        s.chars().map(Token::Literal).collect()
    }

    fn repeat(min: u32, max: Option<u32>, lazy: bool) -> Token {
        Token::Repeat {
            min,
            max,
            lazy,
            body: Box::new(Token::Literal('a')),
        }
    }

    #[rstest]
    #[case(
        r"(?s)(\.\. start installation)(.*?)(\.\. end installation)",
        "(.. start installation)(.*?)(.. end installation)"
    )]
    #[case(r"[A-Za-z_]\w*", r"[A-Za-z_]\w*")]
    #[case(r"^:(param|parameter|arg|argument)\s*", r"^:(param|parameter|arg|argument)\s*")]
    #[case("^:(default|Default)[ ]", "^:(default|Default)[ ]")]
    #[case("^:(default|Default) ", "^:(default|Default)[ ]")]
    #[case(r"\A:(default|Default) ", r"\A:(default|Default)[ ]")]
    #[case("^:(default|Default)   ", "^:(default|Default) {3}")]
    #[case(":(default|Default)   $", ":(default|Default)   $")]
    #[case(r":(default|Default)   \Z", r":(default|Default)   \Z")]
    #[case(" :(default|Default)", "[ ]:(default|Default)")]
    #[case("   :(default|Default)", "[ ]{3}:(default|Default)")]
    #[case("[ ]:(default|Default)", "[ ]:(default|Default)")]
    #[case("  {x", "[ ]{2}{x")]
    #[case("  {2}x", "[ ] {2}x")]
    #[case("hello (world)?", "hello (world)?")]
    #[case("(hello){1,3} (world)?", "(hello){1,3} (world)?")]
    #[case("(hello){3,3} (world)?", "(hello){3} (world)?")]
    #[case(r"Issue #\d", r"Issue #\d")]
    #[case(r"Hello \w", r"Hello \w")]
    #[case(r"Not a word: \W", r"Not a word: \W")]
    #[case(r"Not whitespace: \S", r"Not whitespace: \S")]
    #[case(r"Not a number: \D", r"Not a number: \D")]
    #[case(
        r"Hello\s+[Ww]orld[.,](Lovely|Horrible) weather, isn't it (.*)\?",
        r"Hello\s+[Ww]orld[.,](Lovely|Horrible) weather, isn't it (.*)?"
    )]
    fn renders_plain_text(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(plain(pattern), expected);
    }

    #[test]
    fn verbose_pattern_collapses_whitespace() {
        let rendered = render_regex(
            r"Hello \s+ [Ww]orld [.,] (Lovely|Horrible)\ weather,\ isn't\ it (.*) \?",
            RegexFlags::ASCII | RegexFlags::VERBOSE,
            &Palette::plain(),
        )
        .unwrap();
        assert_eq!(
            rendered,
            r"Hello\s+[Ww]orld[.,](Lovely|Horrible) weather, isn't it(.*)?"
        );
    }

    #[test]
    fn scenario_hello_world() {
        let mut tokens = lit("Hello, ");
        tokens.push(Token::Group(vec![Token::Alternation(vec![
            lit("world"),
            lit("earth"),
        ])]));
        tokens.push(Token::Literal('!'));
        assert_eq!(
            render(&tokens, &Palette::plain()).unwrap(),
            "Hello, (world|earth)!"
        );
    }

    #[test]
    fn three_leading_spaces() {
        assert_eq!(plain("   abc"), "[ ]{3}abc");
    }

    #[test]
    fn anchors_and_categories() {
        let tokens = vec![
            Token::Anchor(AnchorKind::StartOfString),
            Token::Anchor(AnchorKind::StartOfStringAbs),
            Token::Anchor(AnchorKind::WordBoundary),
            Token::Anchor(AnchorKind::NotWordBoundary),
            Token::Anchor(AnchorKind::EndOfStringAbs),
            Token::Anchor(AnchorKind::EndOfString),
            Token::Category(CategoryKind::Digit),
            Token::Category(CategoryKind::NotDigit),
            Token::Category(CategoryKind::Space),
            Token::Category(CategoryKind::NotSpace),
            Token::Category(CategoryKind::Word),
            Token::Category(CategoryKind::NotWord),
        ];
        assert_eq!(
            render(&tokens, &Palette::plain()).unwrap(),
            r"^\A\b\B\Z$\d\D\s\S\w\W"
        );
    }

    #[rstest]
    #[case(repeat(0, None, false), "a*")]
    #[case(repeat(1, None, false), "a+")]
    #[case(repeat(0, Some(1), false), "a?")]
    #[case(repeat(2, Some(2), false), "a{2}")]
    #[case(repeat(2, Some(5), false), "a{2,5}")]
    #[case(repeat(3, None, false), "a{3,}")]
    #[case(repeat(0, None, true), "a*?")]
    #[case(repeat(2, Some(5), true), "a{2,5}?")]
    fn quantifier_suffixes(#[case] token: Token, #[case] expected: &str) {
        assert_eq!(render(&[token], &Palette::plain()).unwrap(), expected);
    }

    #[test]
    fn char_class_brackets() {
        let single_range = Token::CharClass(vec![Token::CharRange('a', 'z')]);
        let single_literal = Token::CharClass(lit("x"));
        let single_category = Token::CharClass(vec![Token::Category(CategoryKind::Digit)]);
        let several = Token::CharClass(lit("xy"));
        let palette = Palette::plain();
        assert_eq!(render(&[single_range], &palette).unwrap(), "[a-z]");
        assert_eq!(render(&[single_literal], &palette).unwrap(), "x");
        assert_eq!(render(&[single_category], &palette).unwrap(), r"\d");
        assert_eq!(render(&[several], &palette).unwrap(), "[xy]");
    }

    #[test]
    fn control_characters_are_shown_escaped() {
        assert_eq!(plain(r"a\tb\n"), r"a\tb\n");
        assert_eq!(plain("a\tb"), r"a\tb");
    }

    #[test]
    fn unsupported_tokens_are_skipped() {
        assert_eq!(plain(r"(a)\1b"), "(a)b");
        assert_eq!(plain("foo(?=bar)"), "foo");
        assert_eq!(plain("[^abc]d"), "d");
    }

    #[test]
    fn strict_renderer_rejects_unsupported_tokens() {
        let renderer = Renderer::new(Palette::plain()).strict(true);
        let err = renderer.render_str("foo(?=bar)", RegexFlags::EMPTY).unwrap_err();
        assert_eq!(
            err,
            RenderError::Unsupported(Unsupported::Lookaround {
                ahead: true,
                negative: false
            })
        );
    }

    #[test]
    fn malformed_trees_fail_fast() {
        let palette = Palette::plain();
        assert!(matches!(
            render(&[Token::CharClass(vec![])], &palette),
            Err(RenderError::Malformed(_))
        ));
        assert!(matches!(
            render(&[Token::Alternation(vec![lit("a")])], &palette),
            Err(RenderError::Malformed(_))
        ));
        assert!(matches!(
            render(&[repeat(3, Some(2), false)], &palette),
            Err(RenderError::Malformed(_))
        ));
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(
            render_regex("(a", RegexFlags::EMPTY, &Palette::plain()),
            Err(RenderError::Parse(_))
        ));
    }

    #[test]
    fn trailing_spaces_use_brace_styles() {
        let palette = Palette::plain()
            .with_style(StyleSlot::RepeatBrace, |raw| format!("<b>{raw}</b>"))
            .with_style(StyleSlot::Repeat, |raw| format!("<r>{raw}</r>"));
        let rendered = render_regex("a  ", RegexFlags::EMPTY, &palette).unwrap();
        assert_eq!(rendered, "a <b>{</b><r>2</r><b>}</b>");
    }

    #[test]
    fn range_dash_uses_anchor_style() {
        let palette = Palette::plain().with_style(StyleSlot::Anchor, |raw| format!("<{raw}>"));
        let rendered = render(&[Token::CharClass(vec![Token::CharRange('0', '9')])], &palette);
        assert_eq!(rendered.unwrap(), "[0<->9]");
    }

    #[test]
    fn html_rendering() {
        let rendered = render_regex("a+", RegexFlags::EMPTY, &Palette::html()).unwrap();
        assert_eq!(
            rendered,
            "\n<code class=\"docutils literal notranslate regex\">\n\
             <span class=\"regex regex_literal\">a</span>\
             <span class=\"regex regex_repeat\">+</span>\
             \n</code>\n"
        );
    }

    #[test]
    fn latex_rendering() {
        let rendered = render_regex(" a", RegexFlags::EMPTY, &Palette::latex()).unwrap();
        assert_eq!(
            rendered,
            r"\sphinxcode{\sphinxupquote{\textcolor{regex_in}{{[}}\enspace\textcolor{regex_in}{{]}}\textcolor{regex_literal}{a}}}"
        );
    }

    #[test]
    fn terminal_rendering() {
        let rendered = render_regex("(a|b)", RegexFlags::EMPTY, &Palette::terminal()).unwrap();
        assert_eq!(
            rendered,
            "\x1b[93m(\x1b[39m\x1b[32ma\x1b[39m\x1b[33m|\x1b[39m\x1b[32mb\x1b[39m\x1b[93m)\x1b[39m"
        );
    }
}
