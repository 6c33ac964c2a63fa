//! Syntax-highlighted renderings of regular expressions.
//!
//! A pattern is parsed into a [`Token`] tree, edge spaces are pulled out so
//! they stay visible, and the tree is walked through a [`Palette`] for one of
//! four targets: plain text, HTML, LaTeX or an ANSI terminal.
//!
//! ```ignore
//! use regex_render::{Palette, RegexFlags, render_regex};
//!
//! let html = render_regex(r"^\d+$", RegexFlags::EMPTY, &Palette::html())?;
//! ```
//!
//! [`format_flags`] turns a flag mask into a list of `re` cross-references
//! for documentation.

pub mod error;
pub mod flags;
pub mod regex;
pub mod render;

pub use error::{ParseError, ParseErrorKind, RenderError};
pub use flags::{RegexFlags, documented_flags, format_flags};
pub use regex::{AnchorKind, CategoryKind, Pattern, Token, Unsupported, parse_regex};
pub use render::palette::{Palette, StyleFn, StyleSlot, Target};
pub use render::whitespace::{SpaceRuns, count_from_text, count_from_tokens, normalize};
pub use render::{Renderer, render, render_regex};
