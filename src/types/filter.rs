//! Filter types: length tests and the resolved filter specification.

use regex::{Regex, RegexBuilder};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::DefinitionCandidate;

/// Comparison operator of a `--length` test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl LengthOp {
    /// Operator spellings, longest first so `>=` wins over `>`.
    const PREFIXES: &'static [(&'static str, LengthOp)] = &[
        (">=", LengthOp::Ge),
        ("<=", LengthOp::Le),
        ("==", LengthOp::Eq),
        (">", LengthOp::Gt),
        ("<", LengthOp::Lt),
        ("=", LengthOp::Eq),
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Gt => ">",
        }
    }
}

/// A comparison against a definition's line count, like `>=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthTest {
    pub op: LengthOp,
    pub operand: usize,
}

impl LengthTest {
    pub fn new(op: LengthOp, operand: usize) -> Self {
        Self { op, operand }
    }

    /// Evaluate the test against a line count.
    pub fn matches(&self, lines: usize) -> bool {
        match self.op {
            LengthOp::Lt => lines < self.operand,
            LengthOp::Le => lines <= self.operand,
            LengthOp::Eq => lines == self.operand,
            LengthOp::Ge => lines >= self.operand,
            LengthOp::Gt => lines > self.operand,
        }
    }
}

impl FromStr for LengthTest {
    type Err = Error;

    /// Parse `N`, `=N`, `==N`, `<N`, `<=N`, `>N` or `>=N`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (op, rest) = LengthOp::PREFIXES
            .iter()
            .find_map(|(prefix, op)| trimmed.strip_prefix(prefix).map(|rest| (*op, rest)))
            .unwrap_or((LengthOp::Eq, trimmed));

        let operand = rest
            .trim()
            .parse::<usize>()
            .map_err(|_| Error::InvalidLength(s.to_string()))?;

        Ok(Self { op, operand })
    }
}

impl fmt::Display for LengthTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.operand)
    }
}

/// Raw, uncompiled filter options as given by the user.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub pattern: String,
    pub any: bool,
    pub contains: Option<String>,
    pub without: Option<String>,
    pub length: Option<LengthTest>,
    pub max_count: Option<usize>,
}

/// Why the pipeline turned a candidate down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Name,
    Contains,
    Without,
    Length,
}

/// Outcome of running a candidate through the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(Rejection),
}

/// The resolved set of active filters.
///
/// A without-pattern cancels any contains-pattern; that is settled here,
/// once, rather than on every candidate.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    name: Regex,
    contains: Option<Regex>,
    without: Option<Regex>,
    length: Option<LengthTest>,
    max_count: Option<usize>,
}

impl FilterSpec {
    /// Compile the user's options into a filter specification.
    pub fn build(options: &FilterOptions) -> Result<Self> {
        let pattern = if options.pattern.is_empty() {
            ".+"
        } else {
            options.pattern.as_str()
        };
        let name_source = if options.any {
            format!("(?:{})", pattern)
        } else {
            format!("^(?:{})$", pattern)
        };
        debug!("Compiling name pattern: {}", name_source);
        let name = RegexBuilder::new(&name_source)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::regex("PAT", e))?;

        let without = compile_optional("--without", options.without.as_deref())?;
        let contains = match compile_optional("--contains", options.contains.as_deref())? {
            Some(_) if without.is_some() => {
                debug!("--without given, ignoring --contains");
                None
            }
            contains => contains,
        };

        Ok(Self {
            name,
            contains,
            without,
            length: options.length,
            // Zero means no limit.
            max_count: options.max_count.filter(|n| *n > 0),
        })
    }

    pub fn max_count(&self) -> Option<usize> {
        self.max_count
    }

    /// Check a definition name against the name filter only.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.is_match(name)
    }

    /// Run the filters in order, stopping at the first rejection.
    pub fn evaluate(&self, candidate: &DefinitionCandidate) -> Verdict {
        if !self.matches_name(&candidate.name) {
            return Verdict::Reject(Rejection::Name);
        }

        if self.contains.is_some() || self.without.is_some() {
            let text = candidate.text();
            if let Some(ref contains) = self.contains {
                if !contains.is_match(&text) {
                    return Verdict::Reject(Rejection::Contains);
                }
            }
            if let Some(ref without) = self.without {
                if without.is_match(&text) {
                    return Verdict::Reject(Rejection::Without);
                }
            }
        }

        if let Some(length) = self.length {
            if !length.matches(candidate.line_count()) {
                return Verdict::Reject(Rejection::Length);
            }
        }

        Verdict::Accept
    }
}

/// Compile an optional user regex, naming the flag on failure.
pub fn compile_optional(flag: &'static str, pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern {
        None | Some("") => Ok(None),
        Some(p) => Regex::new(p).map(Some).map_err(|e| Error::regex(flag, e)),
    }
}
