//! Result rendering.
//!
//! Three modes, chosen by `-S` and `-s`:
//!
//! | flags   | output                                            |
//! |---------|---------------------------------------------------|
//! | none    | location line, then the whole body                |
//! | `-S`    | location line, then the signature                 |
//! | `-s`    | the first lines of the body, no location line     |
//! | `-S -s` | the bare signature                                |
//!
//! Bodies are de-indented by the header's indentation and, when color is
//! on, syntax highlighted.

use colored::Colorize;

use crate::tools::extent::TAB_WIDTH;
use crate::tools::highlight::Highlighter;
use crate::types::DefinitionCandidate;

/// Lines shown by short mode before the remainder is summarized.
pub const SHORT_PREVIEW_LINES: usize = 5;

const BODY_INDENT: &str = "    ";

/// How much of each definition to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Full,
    Short,
    Signature,
}

/// Formats accepted definitions and the closing footer.
#[derive(Debug, Clone)]
pub struct Renderer {
    mode: RenderMode,
    location: bool,
    color: bool,
}

impl Renderer {
    pub fn new(mode: RenderMode, location: bool, color: bool) -> Self {
        Self {
            mode,
            location,
            color,
        }
    }

    /// Build a renderer from the `-S`, `-s` and color switches.
    pub fn from_flags(signature: bool, short: bool, color: bool) -> Self {
        let mode = match (signature, short) {
            (true, _) => RenderMode::Signature,
            (false, true) => RenderMode::Short,
            (false, false) => RenderMode::Full,
        };
        Self::new(mode, !short, color)
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Whether the run ends with a "Found N definitions." footer.
    pub fn shows_footer(&self) -> bool {
        self.location
    }

    /// Render one definition. `highlighter` is only used with color on.
    pub fn render(&self, candidate: &DefinitionCandidate, highlighter: Option<&Highlighter>) -> String {
        let mut out = Vec::new();
        if self.location {
            out.push(self.location_line(candidate));
        }

        match self.mode {
            RenderMode::Signature => {
                let signature = if self.color {
                    candidate.signature.yellow().to_string()
                } else {
                    candidate.signature.clone()
                };
                if self.location {
                    out.push(format!("{}{}", BODY_INDENT, signature));
                } else {
                    out.push(signature);
                }
            }
            RenderMode::Full => {
                let lines = dedent_body(&candidate.body, candidate.indent);
                let indent = if self.location { BODY_INDENT } else { "" };
                out.extend(
                    self.paint(lines, highlighter)
                        .into_iter()
                        .map(|line| format!("{}{}", indent, line)),
                );
            }
            RenderMode::Short => {
                let mut lines = dedent_body(&candidate.body, candidate.indent);
                let hidden = lines.len().saturating_sub(SHORT_PREVIEW_LINES);
                lines.truncate(SHORT_PREVIEW_LINES);
                out.extend(self.paint(lines, highlighter));
                if hidden > 0 {
                    let more = format!("... ({} more lines)", hidden);
                    out.push(if self.color {
                        more.dimmed().to_string()
                    } else {
                        more
                    });
                }
            }
        }

        out.join("\n")
    }

    fn paint(&self, lines: Vec<String>, highlighter: Option<&Highlighter>) -> Vec<String> {
        match highlighter {
            Some(highlighter) if self.color => highlighter.highlight(&lines),
            _ => lines,
        }
    }

    /// `\n{path} #{line} (lines: {count}):`
    fn location_line(&self, candidate: &DefinitionCandidate) -> String {
        let source = candidate.source.to_string();
        let count = candidate.line_count();
        if !self.color {
            return format!("\n{} #{} (lines: {}):", source, candidate.start_line, count);
        }
        format!(
            "\n{} {}{} ({}: {}):",
            source.bright_blue(),
            "#".bright_blue(),
            candidate.start_line.to_string().blue().bold(),
            "lines".cyan(),
            count.to_string().blue()
        )
    }

    /// The closing summary line.
    pub fn footer(&self, total: usize, limit_reached: bool) -> String {
        let noun = if total == 1 { "definition." } else { "definitions." };
        let mut footer = if self.color {
            format!(
                "\n{}{} {}",
                "Found ".cyan(),
                total.to_string().blue().bold(),
                noun.cyan()
            )
        } else {
            format!("\nFound {} {}", total, noun)
        };
        if limit_reached {
            let note = "Max count was satisfied.";
            footer.push(' ');
            if self.color {
                footer.push_str(&note.cyan().to_string());
            } else {
                footer.push_str(note);
            }
        }
        footer
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::from_flags(false, false, false)
    }
}

/// Expand leading tabs and strip up to `indent` columns of leading space.
pub fn dedent(line: &str, indent: usize) -> String {
    let body = line.trim_start_matches([' ', '\t']);
    let leading = &line[..line.len() - body.len()];
    let width: usize = leading
        .chars()
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum();
    let kept = width.saturating_sub(indent);
    format!("{}{}", " ".repeat(kept), body)
}

/// De-indent every line of a body by the header's indentation.
pub fn dedent_body(body: &[String], indent: usize) -> Vec<String> {
    body.iter().map(|line| dedent(line, indent)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::language::LanguageVariant;
    use crate::types::{PartialDefinition, SourceId, SourceLine};
    use std::path::PathBuf;

    fn candidate(source: SourceId, start: usize, indent: usize, lines: &[&str]) -> DefinitionCandidate {
        let partial = PartialDefinition {
            name: "f".to_string(),
            signature: lines[0].trim().to_string(),
            start_line: start,
            indent,
            header: vec![SourceLine::new(start, lines[0])],
        };
        let body = lines[1..]
            .iter()
            .enumerate()
            .map(|(i, t)| SourceLine::new(start + i + 1, *t))
            .collect();
        DefinitionCandidate::complete(partial, body, source, LanguageVariant::Python)
    }

    fn method() -> DefinitionCandidate {
        candidate(
            SourceId::File(PathBuf::from("pkg/mod.py")),
            10,
            4,
            &["    def m(self):", "        return 1"],
        )
    }

    #[test]
    fn test_dedent() {
        assert_eq!(dedent("        return 1", 4), "    return 1");
        assert_eq!(dedent("\treturn 1", 4), "return 1");
        assert_eq!(dedent("\t\treturn 1", 4), "    return 1");
        assert_eq!(dedent("  x", 4), "x");
        assert_eq!(dedent("", 4), "");
    }

    #[test]
    fn test_render_full() {
        let r = Renderer::from_flags(false, false, false);
        assert_eq!(
            r.render(&method(), None),
            "\npkg/mod.py #10 (lines: 2):\n    def m(self):\n        return 1"
        );
    }

    #[test]
    fn test_render_signature() {
        let r = Renderer::from_flags(true, false, false);
        assert_eq!(r.mode(), RenderMode::Signature);
        assert_eq!(
            r.render(&method(), None),
            "\npkg/mod.py #10 (lines: 2):\n    def m(self):"
        );
    }

    #[test]
    fn test_render_bare_signature() {
        let r = Renderer::from_flags(true, true, false);
        assert_eq!(r.render(&method(), None), "def m(self):");
        assert!(!r.shows_footer());
    }

    #[test]
    fn test_render_short_truncates() {
        let r = Renderer::from_flags(false, true, false);
        let long = candidate(
            SourceId::Stdin,
            1,
            0,
            &["def f():", "    a", "    b", "    c", "    d", "    e", "    g"],
        );
        assert_eq!(
            r.render(&long, None),
            "def f():\n    a\n    b\n    c\n    d\n... (2 more lines)"
        );

        let short = candidate(SourceId::Stdin, 1, 0, &["def f():", "    pass"]);
        assert_eq!(r.render(&short, None), "def f():\n    pass");
    }

    #[test]
    fn test_render_stdin_location() {
        let r = Renderer::default();
        let c = candidate(SourceId::Stdin, 1, 0, &["def f():", "    pass"]);
        assert!(r.render(&c, None).starts_with("\nstdin #1 (lines: 2):"));
    }

    #[test]
    fn test_footer() {
        let r = Renderer::from_flags(false, false, false);
        assert!(r.shows_footer());
        assert_eq!(r.footer(1, false), "\nFound 1 definition.");
        assert_eq!(r.footer(0, false), "\nFound 0 definitions.");
        assert_eq!(
            r.footer(2, true),
            "\nFound 2 definitions. Max count was satisfied."
        );
    }
}
