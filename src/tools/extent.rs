//! Body extent resolution.
//!
//! Given a header already consumed by the scanner, read forward until the
//! definition's body ends. Brace languages count `{`/`}` depth with a small
//! quote and comment tracker; Python follows indentation; Makefile recipes
//! are the run of tab-indented lines.
//!
//! The quote tracker is line-local, and block comments are followed across
//! lines for C-like dialects. Regex literals, heredocs and multi-line
//! strings are not understood, so braces inside them can still skew depth.

use std::io;
use thiserror::Error;

use crate::tools::language::LanguageVariant;
use crate::tools::scanner::rules;
use crate::tools::source::LineSource;
use crate::types::{DefinitionCandidate, PartialDefinition, SourceLine};

/// Spaces a leading tab counts for when measuring indentation.
pub const TAB_WIDTH: usize = 4;

/// Why a body could not be resolved.
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error("end of input reached at brace depth {depth}")]
    Unterminated { depth: usize },

    #[error("no opening brace found")]
    NoOpeningBrace,

    #[error("read failed: {0}")]
    Read(#[from] io::Error),
}

/// Lines consumed past the header when a resolver gives up.
#[derive(Debug)]
pub struct Unresolved {
    pub reason: FailureReason,
    pub consumed: Vec<SourceLine>,
}

impl Unresolved {
    fn new(reason: FailureReason, consumed: Vec<SourceLine>) -> Self {
        Self { reason, consumed }
    }
}

/// A resolver reads body lines following the header.
pub type ExtentFn = fn(&mut LineSource, &PartialDefinition) -> Result<Vec<SourceLine>, Unresolved>;

/// A candidate whose body could not be resolved.
///
/// Carries every line read after the first header line, so the caller can
/// hand them back and keep scanning right after the failed header.
#[derive(Debug, Error)]
#[error("cannot resolve body of `{name}` at line {start_line}: {reason}")]
pub struct ExtentFailure {
    pub name: String,
    pub start_line: usize,
    #[source]
    pub reason: FailureReason,
    pub lines: Vec<SourceLine>,
}

/// Resolve the body of `partial` using the rules for `variant`.
pub fn resolve(
    source: &mut LineSource,
    partial: PartialDefinition,
    variant: LanguageVariant,
) -> Result<DefinitionCandidate, ExtentFailure> {
    match (rules(variant).extent)(source, &partial) {
        Ok(body) => Ok(DefinitionCandidate::complete(
            partial,
            body,
            source.id().clone(),
            variant,
        )),
        Err(unresolved) => {
            let PartialDefinition {
                name,
                start_line,
                header,
                ..
            } = partial;
            let lines = header
                .into_iter()
                .skip(1)
                .chain(unresolved.consumed)
                .collect();
            Err(ExtentFailure {
                name,
                start_line,
                reason: unresolved.reason,
                lines,
            })
        }
    }
}

/// Width of a line's leading whitespace.
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

// ===== Brace Depth =====

/// Comment and quote syntax used while counting braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `//` and `/* */` comments; `'`, `"` and `` ` `` quotes
    CLike,
    /// `#` comments; `'` and `"` quotes
    Shell,
}

/// Tracks brace depth across lines.
#[derive(Debug, Clone)]
pub struct BraceCounter {
    dialect: Dialect,
    depth: usize,
    opened: bool,
    in_block_comment: bool,
}

impl BraceCounter {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            depth: 0,
            opened: false,
            in_block_comment: false,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn opened(&self) -> bool {
        self.opened
    }

    /// Feed one line. Returns true once the first opened brace closes.
    pub fn feed(&mut self, line: &str) -> bool {
        let chars: Vec<char> = line.chars().collect();
        let mut quote: Option<char> = None;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            if self.in_block_comment {
                if c == '*' && next == Some('/') {
                    self.in_block_comment = false;
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }

            if let Some(q) = quote {
                // Shell single quotes have no escapes.
                if c == '\\' && !(self.dialect == Dialect::Shell && q == '\'') {
                    i += 2;
                    continue;
                }
                if c == q {
                    quote = None;
                }
                i += 1;
                continue;
            }

            match (self.dialect, c) {
                (_, '"') | (_, '\'') | (Dialect::CLike, '`') => quote = Some(c),
                (Dialect::CLike, '/') if next == Some('/') => break,
                (Dialect::CLike, '/') if next == Some('*') => {
                    self.in_block_comment = true;
                    i += 2;
                    continue;
                }
                (Dialect::Shell, '#') if i == 0 || is_word_break(chars[i - 1]) => break,
                (Dialect::Shell, '\\') => {
                    i += 2;
                    continue;
                }
                (_, '{') => {
                    self.depth += 1;
                    self.opened = true;
                }
                (_, '}') if self.depth > 0 => {
                    self.depth -= 1;
                    if self.opened && self.depth == 0 {
                        return true;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        false
    }
}

fn is_word_break(c: char) -> bool {
    c.is_whitespace() || c == ';' || c == '&' || c == '|'
}

fn brace_extent(
    source: &mut LineSource,
    partial: &PartialDefinition,
    dialect: Dialect,
) -> Result<Vec<SourceLine>, Unresolved> {
    let mut counter = BraceCounter::new(dialect);
    for line in &partial.header {
        if counter.feed(&line.text) {
            return Ok(Vec::new());
        }
    }

    let mut body = Vec::new();
    loop {
        let line = match source.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(Unresolved::new(e.into(), body)),
        };
        let closed = counter.feed(&line.text);
        body.push(line);
        if closed {
            return Ok(body);
        }
    }

    let reason = if counter.opened() {
        FailureReason::Unterminated {
            depth: counter.depth(),
        }
    } else {
        FailureReason::NoOpeningBrace
    };
    Err(Unresolved::new(reason, body))
}

/// Brace depth with C, C++, Java and JavaScript comment rules.
pub fn c_like_extent(
    source: &mut LineSource,
    partial: &PartialDefinition,
) -> Result<Vec<SourceLine>, Unresolved> {
    brace_extent(source, partial, Dialect::CLike)
}

/// Brace depth with shell comment rules.
pub fn shell_extent(
    source: &mut LineSource,
    partial: &PartialDefinition,
) -> Result<Vec<SourceLine>, Unresolved> {
    brace_extent(source, partial, Dialect::Shell)
}

// ===== Indentation =====

/// Python bodies end before the next code line indented at or above the
/// header. Trailing blank lines and shallow comments belong to neither body.
pub fn indent_extent(
    source: &mut LineSource,
    partial: &PartialDefinition,
) -> Result<Vec<SourceLine>, Unresolved> {
    let mut body = Vec::new();
    let mut held: Vec<SourceLine> = Vec::new();

    loop {
        let line = match source.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                body.append(&mut held);
                return Err(Unresolved::new(e.into(), body));
            }
        };

        let trimmed = line.text.trim();
        if trimmed.is_empty() {
            held.push(line);
            continue;
        }
        if indent_width(&line.text) > partial.indent {
            body.append(&mut held);
            body.push(line);
            continue;
        }
        if trimmed.starts_with('#') {
            held.push(line);
            continue;
        }

        // Sibling or outer code: not ours.
        held.push(line);
        break;
    }

    source.unread_all(held);
    Ok(body)
}

// ===== Makefile Recipes =====

/// A recipe is the contiguous run of tab-indented, non-blank lines.
pub fn recipe_extent(
    source: &mut LineSource,
    _partial: &PartialDefinition,
) -> Result<Vec<SourceLine>, Unresolved> {
    let mut body = Vec::new();
    loop {
        match source.next_line() {
            Ok(Some(line)) if line.text.starts_with('\t') && !line.is_blank() => body.push(line),
            Ok(Some(line)) => {
                source.unread(line);
                break;
            }
            Ok(None) => break,
            Err(e) => return Err(Unresolved::new(e.into(), body)),
        }
    }
    Ok(body)
}

/// Plain inputs never produce headers, so there is never a body to read.
pub fn no_extent(
    _source: &mut LineSource,
    _partial: &PartialDefinition,
) -> Result<Vec<SourceLine>, Unresolved> {
    Ok(Vec::new())
}
