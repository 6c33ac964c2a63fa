use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use regex_render::{RenderError, Renderer, Target, documented_flags, normalize};
use tracing::debug;

use crate::cli::{Config, resolve_use_color};

/// Render every pattern in `cfg`, or each line of `input` when there are
/// none. Returns the exit code: 0 if everything rendered, 1 otherwise.
pub fn run(
    cfg: &Config,
    input: impl BufRead,
    mut out: impl Write,
    mut err: impl Write,
) -> Result<i32> {
    let target = match cfg.target {
        Target::Terminal if !resolve_use_color(&cfg.color) => Target::Plain,
        target => target,
    };
    debug!(%target, strict = cfg.strict, "rendering");
    let renderer = Renderer::for_target(target).strict(cfg.strict);

    let patterns = if cfg.patterns.is_empty() {
        input
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read patterns from stdin")?
    } else {
        cfg.patterns.clone()
    };

    let mut failed = false;
    for text in &patterns {
        let rendered = normalize(text, cfg.flags)
            .map_err(RenderError::from)
            .and_then(|normalized| {
                let rendered = renderer.render_normalized(&normalized)?;
                Ok((rendered, normalized.flags))
            });
        match rendered {
            Ok((rendered, flags)) => {
                writeln!(out, "{rendered}").context("failed to write output")?;
                if cfg.show_flags {
                    let labels = documented_flags(flags);
                    if !labels.is_empty() {
                        writeln!(out, "Flags: {labels}").context("failed to write output")?;
                    }
                }
            }
            Err(e) => {
                debug!(pattern = %text, error = %e, "failed to render");
                writeln!(err, "{text:?}: {e}").context("failed to write error")?;
                failed = true;
            }
        }
    }

    Ok(if failed { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ColorWhen;
    use regex_render::RegexFlags;

    fn cfg(patterns: &[&str], target: Target) -> Config {
        Config {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            target,
            flags: RegexFlags::EMPTY,
            show_flags: false,
            strict: false,
            color: ColorWhen::Never,
        }
    }

    fn run_capture(cfg: &Config, input: &str) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(cfg, input.as_bytes(), &mut out, &mut err).unwrap();
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn renders_arguments() {
        let (code, out, err) = run_capture(&cfg(&["a+", "  b"], Target::Plain), "");
        assert_eq!(code, 0);
        assert_eq!(out, "a+\n[ ]{2}b\n");
        assert!(err.is_empty());
    }

    #[test]
    fn reads_stdin_when_no_patterns() {
        let (code, out, _) = run_capture(&cfg(&[], Target::Plain), "x?\n(y|z)\n");
        assert_eq!(code, 0);
        assert_eq!(out, "x?\n(y|z)\n");
    }

    #[test]
    fn terminal_without_colour_is_plain() {
        let (_, out, _) = run_capture(&cfg(&["a"], Target::Terminal), "");
        assert_eq!(out, "a\n");
    }

    #[test]
    fn failures_set_exit_code_and_continue() {
        let (code, out, err) = run_capture(&cfg(&["(a", "b"], Target::Plain), "");
        assert_eq!(code, 1);
        assert_eq!(out, "b\n");
        assert!(err.contains("unterminated subpattern"));
        assert_eq!(err.lines().count(), 1);
    }

    #[test]
    fn inline_flags_survive_edge_space_stripping() {
        let mut config = cfg(&["  (?m)a "], Target::Plain);
        config.show_flags = true;
        let (code, out, _) = run_capture(&config, "");
        assert_eq!(code, 0);
        assert_eq!(out, "[ ]{2}a[ ]\nFlags: :py:data:`re.MULTILINE`\n");
    }

    #[test]
    fn strict_mode_reports_unsupported() {
        let mut config = cfg(&[r"(a)\1"], Target::Plain);
        config.strict = true;
        let (code, _, err) = run_capture(&config, "");
        assert_eq!(code, 1);
        assert!(err.contains("backreference"));
    }

    #[test]
    fn shows_documented_flags() {
        let mut config = cfg(&["(?i)a"], Target::Plain);
        config.show_flags = true;
        config.flags = RegexFlags::VERBOSE;
        let (_, out, _) = run_capture(&config, "");
        assert_eq!(out, "a\nFlags: :py:data:`re.IGNORECASE`\n");
    }
}
