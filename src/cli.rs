use std::io;
use std::io::IsTerminal;

use clap::{Parser, ValueEnum};
use regex_render::{RegexFlags, Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorWhen {
    Always,
    Never,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Plain,
    Html,
    Latex,
    Terminal,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Plain => Target::Plain,
            TargetArg::Html => Target::Html,
            TargetArg::Latex => Target::Latex,
            TargetArg::Terminal => Target::Terminal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevelArg::Off => "off",
            LogLevelArg::Error => "error",
            LogLevelArg::Warn => "warn",
            LogLevelArg::Info => "info",
            LogLevelArg::Debug => "debug",
            LogLevelArg::Trace => "trace",
        }
    }
}

/// Render regular expressions with syntax highlighting
#[derive(Debug, Parser)]
#[command(name = "regex-render")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Patterns to render (read from stdin, one per line, when omitted)
    pub patterns: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    pub target: TargetArg,

    /// Flag to compile with, e.g. ignorecase or verbose (repeatable)
    #[arg(short, long = "flag", value_name = "FLAG", value_parser = parse_flag)]
    pub flags: Vec<RegexFlags>,

    /// Print the pattern's flags after each rendering
    #[arg(long)]
    pub show_flags: bool,

    /// Fail on constructs that can't be rendered instead of leaving them out
    #[arg(long)]
    pub strict: bool,

    /// When to colour terminal output
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorWhen,

    /// Log level (overrides RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

fn parse_flag(name: &str) -> Result<RegexFlags, String> {
    RegexFlags::from_name(name).ok_or_else(|| format!("unknown flag {name:?}"))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub patterns: Vec<String>,
    pub target: Target,
    pub flags: RegexFlags,
    pub show_flags: bool,
    pub strict: bool,
    pub color: ColorWhen,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let flags = cli
            .flags
            .iter()
            .fold(RegexFlags::EMPTY, |acc, &flag| acc | flag);
        Config {
            patterns: cli.patterns,
            target: cli.target.into(),
            flags,
            show_flags: cli.show_flags,
            strict: cli.strict,
            color: cli.color,
        }
    }
}

pub fn resolve_use_color(color: &ColorWhen) -> bool {
    match color {
        ColorWhen::Always => true,
        ColorWhen::Never => false,
        ColorWhen::Auto => io::stdout().is_terminal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Config {
        let argv = std::iter::once("regex-render").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().into()
    }

    #[test]
    fn defaults() {
        let cfg = config(&["^a+$"]);
        assert_eq!(cfg.patterns, vec!["^a+$".to_string()]);
        assert_eq!(cfg.target, Target::Terminal);
        assert_eq!(cfg.color, ColorWhen::Auto);
        assert!(cfg.flags.is_empty());
        assert!(!cfg.strict);
    }

    #[test]
    fn flags_accumulate() {
        let cfg = config(&["-f", "ignorecase", "--flag", "M", "x"]);
        assert_eq!(cfg.flags, RegexFlags::IGNORECASE | RegexFlags::MULTILINE);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["regex-render", "-f", "sticky", "a"]).is_err());
    }

    #[test]
    fn target_and_color() {
        let cfg = config(&["-t", "latex", "--color", "never", "--strict", "a"]);
        assert_eq!(cfg.target, Target::Latex);
        assert_eq!(cfg.color, ColorWhen::Never);
        assert!(cfg.strict);
        assert!(!resolve_use_color(&cfg.color));
    }
}
