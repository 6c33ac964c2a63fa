//! Pattern flags and their documentation labels.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Flag bitmask using the bit values of Python's `re` module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegexFlags(u32);

impl RegexFlags {
    pub const EMPTY: RegexFlags = RegexFlags(0);
    pub const IGNORECASE: RegexFlags = RegexFlags(2);
    pub const LOCALE: RegexFlags = RegexFlags(4);
    pub const MULTILINE: RegexFlags = RegexFlags(8);
    pub const DOTALL: RegexFlags = RegexFlags(16);
    pub const UNICODE: RegexFlags = RegexFlags(32);
    pub const VERBOSE: RegexFlags = RegexFlags(64);
    pub const DEBUG: RegexFlags = RegexFlags(128);
    pub const ASCII: RegexFlags = RegexFlags(256);

    /// Flags with a label, in the order they are listed.
    const LABELLED: [(RegexFlags, &'static str); 7] = [
        (RegexFlags::ASCII, "ASCII"),
        (RegexFlags::DEBUG, "DEBUG"),
        (RegexFlags::IGNORECASE, "IGNORECASE"),
        (RegexFlags::LOCALE, "LOCALE"),
        (RegexFlags::MULTILINE, "MULTILINE"),
        (RegexFlags::DOTALL, "DOTALL"),
        (RegexFlags::VERBOSE, "VERBOSE"),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        RegexFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: RegexFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn without(self, other: RegexFlags) -> Self {
        RegexFlags(self.0 & !other.0)
    }

    /// Flag for an inline flag letter such as the `i` in `(?i)`.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'a' => Some(RegexFlags::ASCII),
            'i' => Some(RegexFlags::IGNORECASE),
            'L' => Some(RegexFlags::LOCALE),
            'm' => Some(RegexFlags::MULTILINE),
            's' => Some(RegexFlags::DOTALL),
            'u' => Some(RegexFlags::UNICODE),
            'x' => Some(RegexFlags::VERBOSE),
            _ => None,
        }
    }

    /// Flag for a long name such as `ignorecase` or `IGNORECASE`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "A" | "ASCII" => Some(RegexFlags::ASCII),
            "DEBUG" => Some(RegexFlags::DEBUG),
            "I" | "IGNORECASE" => Some(RegexFlags::IGNORECASE),
            "L" | "LOCALE" => Some(RegexFlags::LOCALE),
            "M" | "MULTILINE" => Some(RegexFlags::MULTILINE),
            "S" | "DOTALL" => Some(RegexFlags::DOTALL),
            "U" | "UNICODE" => Some(RegexFlags::UNICODE),
            "X" | "VERBOSE" => Some(RegexFlags::VERBOSE),
            _ => None,
        }
    }
}

impl BitOr for RegexFlags {
    type Output = RegexFlags;

    fn bitor(self, rhs: RegexFlags) -> RegexFlags {
        RegexFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for RegexFlags {
    fn bitor_assign(&mut self, rhs: RegexFlags) {
        self.0 |= rhs.0;
    }
}

impl From<u32> for RegexFlags {
    fn from(bits: u32) -> Self {
        RegexFlags(bits)
    }
}

impl fmt::Display for RegexFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_flags(*self))
    }
}

/// Render the set flags as `re` cross-references joined by an inline-code pipe.
///
/// Flags outside the labelled seven (such as UNICODE) are ignored, and an
/// empty mask gives an empty string.
pub fn format_flags(flags: impl Into<RegexFlags>) -> String {
    let flags = flags.into();
    RegexFlags::LABELLED
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, name)| format!(":py:data:`re.{name}`"))
        .collect::<Vec<_>>()
        .join(" ``|`` ")
}

/// Like [`format_flags`] but hides DEBUG and VERBOSE, which don't change
/// what a pattern matches.
pub fn documented_flags(flags: impl Into<RegexFlags>) -> String {
    let flags = flags.into();
    format_flags(flags.without(RegexFlags::DEBUG).without(RegexFlags::VERBOSE))
}
