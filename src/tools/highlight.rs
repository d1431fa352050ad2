//! Terminal syntax highlighting for rendered bodies.
//!
//! Syntax definitions and the theme are loaded once per process. Lines that
//! fail to highlight are returned unchanged.

use once_cell::sync::Lazy;
use std::path::Path;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

use crate::tools::language::LanguageVariant;

const THEME_NAME: &str = "base16-ocean.dark";
const RESET: &str = "\x1b[0m";

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

static THEME: Lazy<Option<Theme>> = Lazy::new(|| {
    let mut themes = ThemeSet::load_defaults().themes;
    themes
        .remove(THEME_NAME)
        .or_else(|| themes.into_values().next())
});

/// Highlights text for one input file.
pub struct Highlighter {
    syntax: &'static SyntaxReference,
}

impl Highlighter {
    /// Pick a syntax from the file extension, falling back to the variant.
    pub fn for_source(path: Option<&Path>, variant: LanguageVariant) -> Self {
        let by_extension = path
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .and_then(|ext| SYNTAXES.find_syntax_by_extension(ext));
        let syntax = by_extension
            .or_else(|| SYNTAXES.find_syntax_by_extension(variant.syntax_extension()))
            .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());
        Self { syntax }
    }

    pub fn syntax_name(&self) -> &str {
        &self.syntax.name
    }

    /// Highlight `lines`, returning one escaped string per input line.
    pub fn highlight(&self, lines: &[String]) -> Vec<String> {
        let theme = match THEME.as_ref() {
            Some(theme) => theme,
            None => return lines.to_vec(),
        };

        let text = lines.iter().fold(String::new(), |mut acc, line| {
            acc.push_str(line);
            acc.push('\n');
            acc
        });

        let mut highlighter = HighlightLines::new(self.syntax, theme);
        LinesWithEndings::from(&text)
            .zip(lines)
            .map(|(line, original)| match highlighter.highlight_line(line, &SYNTAXES) {
                Ok(ranges) => {
                    let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
                    format!("{}{}", escaped.trim_end_matches('\n'), RESET)
                }
                Err(_) => original.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_from_extension() {
        let h = Highlighter::for_source(Some(Path::new("lib.py")), LanguageVariant::Python);
        assert_eq!(h.syntax_name(), "Python");
    }

    #[test]
    fn test_syntax_from_variant() {
        let h = Highlighter::for_source(None, LanguageVariant::Shell);
        assert!(h.syntax_name().to_lowercase().contains("bash"));

        let h = Highlighter::for_source(None, LanguageVariant::Plain);
        assert_eq!(h.syntax_name(), "Plain Text");
    }

    #[test]
    fn test_highlight_keeps_line_count() {
        let h = Highlighter::for_source(None, LanguageVariant::CStyle);
        let lines = vec!["int add(int a, int b) {".to_string(), "}".to_string()];
        let out = h.highlight(&lines);

        assert_eq!(out.len(), 2);
        assert!(out[0].contains("\x1b["));
        assert!(out[0].ends_with(RESET));
        assert!(!out[0].contains('\n'));
    }
}
