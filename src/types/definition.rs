//! Definition candidate types.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::tools::language::LanguageVariant;

/// Where a stream of lines came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceId {
    /// Standard input (no path, no basename to inspect)
    Stdin,
    /// A file on disk
    File(PathBuf),
}

impl SourceId {
    /// The file path, if this source has one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdin => None,
            Self::File(path) => Some(path),
        }
    }

    pub fn is_stdin(&self) -> bool {
        matches!(self, Self::Stdin)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("stdin"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A single line read from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// The 1-based line number
    pub number: usize,
    /// Line text without the line terminator
    pub text: String,
}

impl SourceLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// True for empty or whitespace-only lines.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A definition header found by the scanner, before its body is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialDefinition {
    /// The definition name
    pub name: String,
    /// The header line(s), trimmed and joined
    pub signature: String,
    /// The 1-based line number of the first header line
    pub start_line: usize,
    /// Width of the header's leading whitespace (tabs count as 4)
    pub indent: usize,
    /// Raw header lines already consumed from the source
    pub header: Vec<SourceLine>,
}

/// A located definition with a fully resolved body.
///
/// `body` holds every raw line from `start_line` to `end_line` inclusive,
/// so `body.len() == end_line - start_line + 1` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionCandidate {
    /// The definition name
    pub name: String,
    /// The header line(s), trimmed
    pub signature: String,
    /// The 1-based first line of the definition
    pub start_line: usize,
    /// The 1-based last line of the definition (inclusive)
    pub end_line: usize,
    /// Width of the header's leading whitespace
    pub indent: usize,
    /// Raw lines from `start_line` to `end_line`
    pub body: Vec<String>,
    /// Where the definition was found
    pub source: SourceId,
    /// The language rules the definition was found with
    pub language: LanguageVariant,
}

impl DefinitionCandidate {
    /// Complete a partial definition with its resolved body lines.
    ///
    /// `body` must continue the header lines without gaps.
    pub fn complete(
        partial: PartialDefinition,
        body: Vec<SourceLine>,
        source: SourceId,
        language: LanguageVariant,
    ) -> Self {
        let PartialDefinition {
            name,
            signature,
            start_line,
            indent,
            header,
        } = partial;

        let lines: Vec<String> = header
            .into_iter()
            .chain(body)
            .map(|line| line.text)
            .collect();
        let end_line = start_line + lines.len().saturating_sub(1);

        Self {
            name,
            signature,
            start_line,
            end_line,
            indent,
            body: lines,
            source,
            language,
        }
    }

    /// Number of lines in the definition, header included.
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// The body joined with newlines, as matched by content filters.
    pub fn text(&self) -> String {
        self.body.join("\n")
    }

    /// Lines after the first one, numbered, for handing back to a scanner.
    pub fn into_trailing_lines(self) -> Vec<SourceLine> {
        let start = self.start_line;
        self.body
            .into_iter()
            .enumerate()
            .skip(1)
            .map(|(offset, text)| SourceLine::new(start + offset, text))
            .collect()
    }
}
