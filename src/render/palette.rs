//! Style slots and the per-target functions bound to them.
//!
//! A [`Palette`] is a table with one formatting function per [`StyleSlot`]
//! plus a wrap rule applied to the finished rendering. Slots may share a
//! function; the terminal palette does this to keep to a handful of colours.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::render::escape::{escape_html, escape_tex};

pub type StyleFn = Arc<dyn Fn(&str) -> String + Send + Sync>;
pub type WrapFn = Arc<dyn Fn(String) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleSlot {
    Anchor,
    Group,
    CharClass,
    Repeat,
    RepeatBrace,
    Category,
    Alternation,
    Literal,
    Wildcard,
}

impl StyleSlot {
    pub const ALL: [StyleSlot; 9] = [
        StyleSlot::Anchor,
        StyleSlot::Group,
        StyleSlot::CharClass,
        StyleSlot::Repeat,
        StyleSlot::RepeatBrace,
        StyleSlot::Category,
        StyleSlot::Alternation,
        StyleSlot::Literal,
        StyleSlot::Wildcard,
    ];

    /// Name shared with the host stylesheet: the CSS class in HTML output and
    /// the colour name in LaTeX output.
    pub fn name(self) -> &'static str {
        match self {
            StyleSlot::Anchor => "regex_at",
            StyleSlot::Group => "regex_subpattern",
            StyleSlot::CharClass => "regex_in",
            StyleSlot::Repeat => "regex_repeat",
            StyleSlot::RepeatBrace => "regex_repeat_brace",
            StyleSlot::Category => "regex_category",
            StyleSlot::Alternation => "regex_branch",
            StyleSlot::Literal => "regex_literal",
            StyleSlot::Wildcard => "regex_any",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Output formats with a built-in palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Plain,
    Html,
    Latex,
    Terminal,
}

impl Target {
    pub fn palette(self) -> Palette {
        match self {
            Target::Plain => Palette::plain(),
            Target::Html => Palette::html(),
            Target::Latex => Palette::latex(),
            Target::Terminal => Palette::terminal(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Target::Plain => "plain",
            Target::Html => "html",
            Target::Latex => "latex",
            Target::Terminal => "terminal",
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Target::Plain),
            "html" => Ok(Target::Html),
            "latex" | "tex" => Ok(Target::Latex),
            "terminal" | "ansi" => Ok(Target::Terminal),
            other => Err(format!("unknown target {other:?}")),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn style(f: impl Fn(&str) -> String + Send + Sync + 'static) -> StyleFn {
    Arc::new(f)
}

#[derive(Clone)]
pub struct Palette {
    styles: [StyleFn; 9],
    wrap: WrapFn,
}

impl Palette {
    /// Build a palette by asking `f` for each slot's function. The wrap rule
    /// starts out as the identity.
    pub fn from_fn(f: impl FnMut(StyleSlot) -> StyleFn) -> Self {
        Palette {
            styles: StyleSlot::ALL.map(f),
            wrap: Arc::new(|body: String| body),
        }
    }

    pub fn with_style(
        mut self,
        slot: StyleSlot,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.styles[slot.index()] = style(f);
        self
    }

    /// Make `slot` use the same function as `to`.
    pub fn alias(mut self, slot: StyleSlot, to: StyleSlot) -> Self {
        self.styles[slot.index()] = Arc::clone(&self.styles[to.index()]);
        self
    }

    pub fn with_wrap(mut self, wrap: impl Fn(String) -> String + Send + Sync + 'static) -> Self {
        self.wrap = Arc::new(wrap);
        self
    }

    pub fn style(&self, slot: StyleSlot, raw: &str) -> String {
        (self.styles[slot.index()])(raw)
    }

    pub fn wrap(&self, body: String) -> String {
        (self.wrap)(body)
    }

    pub fn shares_style(&self, a: StyleSlot, b: StyleSlot) -> bool {
        Arc::ptr_eq(&self.styles[a.index()], &self.styles[b.index()])
    }

    /// Every slot is the identity, so the output is the pattern's text form.
    pub fn plain() -> Self {
        let identity = style(str::to_owned);
        Palette::from_fn(|_| Arc::clone(&identity))
    }

    /// Each fragment in a `<span>` carrying the slot's class, the whole in a
    /// `<code>` element.
    pub fn html() -> Self {
        Palette::from_fn(|slot| {
            let class = slot.name();
            style(move |raw| format!(r#"<span class="regex {class}">{}</span>"#, escape_html(raw)))
        })
        .with_wrap(|body| {
            format!("\n<code class=\"docutils literal notranslate regex\">\n{body}\n</code>\n")
        })
    }

    /// Each fragment in a `\textcolor` of the slot's colour; spaces become
    /// `\enspace`.
    pub fn latex() -> Self {
        Palette::from_fn(|slot| {
            let colour = slot.name();
            style(move |raw| {
                if raw == " " {
                    return r"\enspace".to_owned();
                }
                format!(r"\textcolor{{{colour}}}{{{}}}", escape_tex(raw))
            })
        })
        .with_wrap(|body| format!(r"\sphinxcode{{\sphinxupquote{{{body}}}}}"))
    }

    pub fn terminal() -> Self {
        Palette::from_fn(|slot| match slot {
            StyleSlot::Group => style(|raw| raw.bright_yellow().to_string()),
            StyleSlot::CharClass => style(|raw| raw.bright_red().to_string()),
            StyleSlot::Repeat => style(|raw| raw.bright_blue().to_string()),
            StyleSlot::Literal => style(|raw| raw.green().to_string()),
            _ => style(|raw| raw.yellow().to_string()),
        })
        .alias(StyleSlot::RepeatBrace, StyleSlot::Anchor)
        .alias(StyleSlot::Alternation, StyleSlot::Anchor)
        .alias(StyleSlot::Wildcard, StyleSlot::Anchor)
        .alias(StyleSlot::Category, StyleSlot::Group)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::plain()
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Palette").finish_non_exhaustive()
    }
}
