//! Definition scanning.
//!
//! Each `LanguageVariant` maps to a pair of functions: a header detector
//! that recognizes a definition's first line, and an extent resolver that
//! reads its body. `DefinitionStream` drives the pair over a `LineSource`,
//! yielding complete candidates in line order.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::io;
use tracing::debug;

use crate::tools::extent::{self, indent_width, ExtentFn};
use crate::tools::language::{classify, LanguageVariant};
use crate::tools::source::LineSource;
use crate::types::{DefinitionCandidate, PartialDefinition, SourceLine};

/// Lines buffered when guessing the language of standard input.
pub const SNIFF_LINES: usize = 64;

/// Most lines a header with unbalanced parentheses may span.
const MAX_HEADER_LINES: usize = 32;

/// How a detected header line continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderShape {
    /// The header is this one line.
    Complete,
    /// The header is only real if the next line opens with `{`.
    BraceOnNextLine,
    /// Parentheses are still open; following lines belong to the header.
    OpenParens(i32),
}

/// A header recognized on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub name: String,
    pub shape: HeaderShape,
}

impl HeaderMatch {
    fn new(name: impl Into<String>, shape: HeaderShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

pub type DetectFn = fn(&str) -> Option<HeaderMatch>;

/// Header detection and extent resolution for one variant.
pub struct LanguageRules {
    pub detect: DetectFn,
    pub extent: ExtentFn,
}

static C_STYLE_RULES: LanguageRules = LanguageRules {
    detect: detect_c_style,
    extent: extent::c_like_extent,
};
static PYTHON_RULES: LanguageRules = LanguageRules {
    detect: detect_python,
    extent: extent::indent_extent,
};
static SHELL_RULES: LanguageRules = LanguageRules {
    detect: detect_shell,
    extent: extent::shell_extent,
};
static JAVASCRIPT_RULES: LanguageRules = LanguageRules {
    detect: detect_javascript,
    extent: extent::c_like_extent,
};
static MAKEFILE_RULES: LanguageRules = LanguageRules {
    detect: detect_make_target,
    extent: extent::recipe_extent,
};
static PLAIN_RULES: LanguageRules = LanguageRules {
    detect: detect_nothing,
    extent: extent::no_extent,
};

/// The rule pair for a variant.
pub fn rules(variant: LanguageVariant) -> &'static LanguageRules {
    match variant {
        LanguageVariant::CStyle => &C_STYLE_RULES,
        LanguageVariant::Python => &PYTHON_RULES,
        LanguageVariant::Shell => &SHELL_RULES,
        LanguageVariant::JavaScript => &JAVASCRIPT_RULES,
        LanguageVariant::Makefile => &MAKEFILE_RULES,
        LanguageVariant::Plain => &PLAIN_RULES,
    }
}

// ===== C-style =====

static C_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<prefix>(?:[A-Za-z_$<][\w$:<>,\[\]]*[\s\*&]+)*)(?P<name>~?[A-Za-z_$][\w$]*(?:::~?[A-Za-z_$][\w$]*)*)\s*(?:<[^(){};]*>)?\s*\((?P<args>[^;{}()]*(?:\([^;{}()]*\)[^;{}()]*)*)\)(?:\s*(?::|->|throws\b)[^;{}]*?|[^;{}.(]*?)(?P<brace>\{.*)?$",
    )
    .expect("valid C function regex")
});

static C_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:template\s*<[^>]*>\s*)?(?:(?:public|private|protected|internal|static|final|abstract|sealed|export|partial|data|open)\s+)*(?:class|struct|interface|enum(?:\s+class)?|union|namespace)\s+(?P<name>[A-Za-z_$][\w$]*)[^;=()]*?(?P<brace>\{.*)?$",
    )
    .expect("valid C type regex")
});

static GO_FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*func\b\s*(?:\([^)]*\)\s*)?(?P<name>[A-Za-z_]\w*)\s*(?:\[[^\]]*\])?\s*\([^;]*?(?P<brace>\{.*)?$")
        .expect("valid Go func regex")
});

/// Words that are never definition names.
const NOT_NAMES: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "else", "do", "sizeof", "typeof",
    "new", "delete", "throw", "case", "function", "with", "synchronized", "foreach", "elif",
    "using", "lock", "fixed", "until", "assert", "super", "this", "await", "yield", "defined",
    "decltype", "alignof", "static_assert", "try", "finally", "match", "loop", "when", "guard",
    "func", "pub", "fn",
];

/// Leading words that turn a line into a statement rather than a header.
const STATEMENT_WORDS: &[&str] = &[
    "else", "return", "new", "throw", "case", "await", "yield", "delete", "typeof", "do", "goto",
];

fn brace_shape(caps: &Captures<'_>) -> HeaderShape {
    if caps.name("brace").is_some() {
        HeaderShape::Complete
    } else {
        HeaderShape::BraceOnNextLine
    }
}

/// `<qualifiers> <type> name(args) {`, `class Name {`, and Go `func`.
pub fn detect_c_style(line: &str) -> Option<HeaderMatch> {
    let trimmed = line.trim_start();
    if trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with('*')
        || trimmed.starts_with("/*")
    {
        return None;
    }

    if let Some(caps) = GO_FUNC.captures(line) {
        return Some(HeaderMatch::new(&caps["name"], brace_shape(&caps)));
    }

    if let Some(caps) = C_TYPE.captures(line) {
        return Some(HeaderMatch::new(&caps["name"], brace_shape(&caps)));
    }

    let caps = C_FUNCTION.captures(line)?;
    let qualified = &caps["name"];
    let name = qualified.rsplit("::").next().unwrap_or(qualified);
    if NOT_NAMES.contains(&name.trim_start_matches('~')) {
        return None;
    }
    let is_statement = caps["prefix"]
        .split(|c: char| c.is_whitespace() || c == '*' || c == '&')
        .any(|word| STATEMENT_WORDS.contains(&word));
    if is_statement {
        return None;
    }
    Some(HeaderMatch::new(name, brace_shape(&caps)))
}

// ===== JavaScript =====

static JS_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+(?:default\s+)?)?(?:async\s+)?function\s*\*?\s*(?P<name>[\w$]+)\s*(?:<[^>]*>)?\s*\((?P<rest>.*)$")
        .expect("valid JS function regex")
});

static JS_ASSIGNED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:export\s+)?(?:var|let|const)\s+)?(?P<name>[\w$]+(?:\.[\w$]+)*)\s*=\s*(?:async\s+)?function\b(?P<rest>.*)$")
        .expect("valid JS assignment regex")
});

static JS_ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:var|let|const)\s+(?P<name>[\w$]+)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)|[\w$]+)\s*(?::\s*[^=]+)?=>\s*\{")
        .expect("valid JS arrow regex")
});

static JS_MEMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<name>[\w$]+)\s*:\s*(?:async\s+)?function\b(?P<rest>.*)$")
        .expect("valid JS member regex")
});

static JS_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+(?:default\s+)?)?(?:abstract\s+)?class\s+(?P<name>[\w$]+)(?P<rest>[^;=]*)$")
        .expect("valid JS class regex")
});

fn rest_shape(caps: &Captures<'_>) -> HeaderShape {
    match caps.name("rest") {
        Some(rest) if rest.as_str().contains('{') => HeaderShape::Complete,
        _ => HeaderShape::BraceOnNextLine,
    }
}

/// JavaScript-only header forms, without the C-style fallback.
pub fn detect_javascript_forms(line: &str) -> Option<HeaderMatch> {
    if let Some(caps) = JS_FUNCTION.captures(line) {
        return Some(HeaderMatch::new(&caps["name"], rest_shape(&caps)));
    }
    if let Some(caps) = JS_ARROW.captures(line) {
        return Some(HeaderMatch::new(&caps["name"], HeaderShape::Complete));
    }
    if let Some(caps) = JS_ASSIGNED.captures(line) {
        let qualified = &caps["name"];
        let name = qualified.rsplit('.').next().unwrap_or(qualified);
        return Some(HeaderMatch::new(name, rest_shape(&caps)));
    }
    if let Some(caps) = JS_MEMBER.captures(line) {
        return Some(HeaderMatch::new(&caps["name"], rest_shape(&caps)));
    }
    if let Some(caps) = JS_CLASS.captures(line) {
        return Some(HeaderMatch::new(&caps["name"], rest_shape(&caps)));
    }
    None
}

/// JavaScript forms, then C-style forms for class methods.
pub fn detect_javascript(line: &str) -> Option<HeaderMatch> {
    detect_javascript_forms(line).or_else(|| detect_c_style(line))
}

// ===== Python =====

static PY_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:async\s+)?(?:def|class)\s+(?P<name>[A-Za-z_]\w*)")
        .expect("valid Python def regex")
});

static PY_LAMBDA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<name>[A-Za-z_]\w*)\s*=\s*lambda\b").expect("valid Python lambda regex")
});

/// The code part of a Python line: string contents blanked out and any
/// trailing `#` comment removed.
fn python_code(line: &str) -> String {
    let mut code = String::with_capacity(line.len());
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    quote = None;
                    code.push(c);
                }
            }
            None => match c {
                '#' => break,
                '\'' | '"' => {
                    quote = Some(c);
                    code.push(c);
                }
                _ => code.push(c),
            },
        }
    }
    code
}

/// Net count of open parentheses and brackets in a line's code.
fn paren_balance(line: &str) -> i32 {
    python_code(line).chars().fold(0, |depth, c| match c {
        '(' | '[' => depth + 1,
        ')' | ']' => depth - 1,
        _ => depth,
    })
}

/// True when a line's code ends with the `:` that closes a header.
fn ends_header(line: &str) -> bool {
    python_code(line).trim_end().ends_with(':')
}

/// `def name`, `async def name`, `class Name`, and `name = lambda`.
pub fn detect_python(line: &str) -> Option<HeaderMatch> {
    if let Some(caps) = PY_DEF.captures(line) {
        let shape = match paren_balance(line) {
            open if open > 0 && !ends_header(line) => HeaderShape::OpenParens(open),
            _ => HeaderShape::Complete,
        };
        return Some(HeaderMatch::new(&caps["name"], shape));
    }
    PY_LAMBDA
        .captures(line)
        .map(|caps| HeaderMatch::new(&caps["name"], HeaderShape::Complete))
}

// ===== Shell =====

static SH_PARENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:function\s+)?(?P<name>[A-Za-z_][\w.:-]*)\s*\(\s*\)\s*(?P<brace>\{.*)?$")
        .expect("valid shell function regex")
});

static SH_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*function\s+(?P<name>[A-Za-z_][\w.:-]*)\s*(?P<brace>\{.*)?$")
        .expect("valid shell keyword regex")
});

/// `name() {`, `function name {`, and `function name() {`.
pub fn detect_shell(line: &str) -> Option<HeaderMatch> {
    SH_PARENS
        .captures(line)
        .or_else(|| SH_KEYWORD.captures(line))
        .map(|caps| HeaderMatch::new(&caps["name"], brace_shape(&caps)))
}

// ===== Makefile =====

static MAKE_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[^\s:#=][^:#=]*?)\s*::?(?:[^:=]|$)").expect("valid make target regex")
});

/// `target:` at column zero, skipping special targets and assignments.
pub fn detect_make_target(line: &str) -> Option<HeaderMatch> {
    let caps = MAKE_TARGET.captures(line)?;
    let name = caps["name"].trim();
    let special = name
        .strip_prefix('.')
        .map(|rest| rest.chars().all(|c| c.is_ascii_uppercase() || c == '_'))
        .unwrap_or(false);
    if special {
        return None;
    }
    Some(HeaderMatch::new(name, HeaderShape::Complete))
}

fn detect_nothing(_line: &str) -> Option<HeaderMatch> {
    None
}

// ===== Scanning =====

fn joined_signature(lines: &[SourceLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn partial(found: HeaderMatch, header: Vec<SourceLine>) -> PartialDefinition {
    let start_line = header.first().map(|l| l.number).unwrap_or(0);
    let indent = header.first().map(|l| indent_width(&l.text)).unwrap_or(0);
    PartialDefinition {
        name: found.name,
        signature: joined_signature(&header),
        start_line,
        indent,
        header,
    }
}

/// Find the next header in `source`, consuming it.
///
/// Lines before the header are consumed and dropped. Returns `None` at the
/// end of input.
pub fn next_header(
    source: &mut LineSource,
    variant: LanguageVariant,
) -> io::Result<Option<PartialDefinition>> {
    let detect = rules(variant).detect;

    while let Some(line) = source.next_line()? {
        let found = match detect(&line.text) {
            Some(found) => found,
            None => continue,
        };

        match found.shape {
            HeaderShape::Complete => return Ok(Some(partial(found, vec![line]))),
            HeaderShape::BraceOnNextLine => {
                let opens = matches!(
                    source.peek()?,
                    Some(next) if next.text.trim_start().starts_with('{')
                );
                if opens {
                    let mut header = vec![line];
                    header.extend(source.next_line()?);
                    return Ok(Some(partial(found, header)));
                }
            }
            HeaderShape::OpenParens(open) => {
                let mut depth = open;
                let mut header = vec![line];
                while depth > 0 && header.len() < MAX_HEADER_LINES {
                    match source.next_line()? {
                        Some(next) => {
                            depth += paren_balance(&next.text);
                            let closed = ends_header(&next.text);
                            header.push(next);
                            if closed {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                return Ok(Some(partial(found, header)));
            }
        }
    }

    Ok(None)
}

/// A Python header that no brace language would also accept.
fn sniffs_python(line: &str) -> bool {
    let found = match detect_python(line) {
        Some(found) => found,
        None => return false,
    };
    let code = python_code(line);
    if code.contains('{') {
        return false;
    }
    ends_header(line) || PY_LAMBDA.is_match(line) || matches!(found.shape, HeaderShape::OpenParens(_))
}

/// Guess a variant from buffered content, for inputs with no path.
///
/// The first line that looks like a header of some variant decides.
pub fn sniff_variant(source: &mut LineSource) -> io::Result<LanguageVariant> {
    source.fill(SNIFF_LINES)?;
    for line in source.buffered() {
        let text = line.text.as_str();
        if sniffs_python(text) {
            return Ok(LanguageVariant::Python);
        }
        if detect_javascript_forms(text).is_some() {
            return Ok(LanguageVariant::JavaScript);
        }
        if detect_shell(text).is_some() {
            return Ok(LanguageVariant::Shell);
        }
        if let Some(found) = detect_c_style(text) {
            if found.shape == HeaderShape::Complete {
                return Ok(LanguageVariant::CStyle);
            }
        }
    }
    Ok(LanguageVariant::Plain)
}

/// A lazy sequence of resolved definitions from one source.
///
/// Candidates come out ordered by start line and never overlap: scanning
/// resumes after a candidate's body unless the body is handed back with
/// [`DefinitionStream::release`].
pub struct DefinitionStream {
    source: LineSource,
    variant: LanguageVariant,
    failed: bool,
}

impl DefinitionStream {
    pub fn new(source: LineSource, variant: LanguageVariant) -> Self {
        Self {
            source,
            variant,
            failed: false,
        }
    }

    /// Classify `source` (or use `forced`) and start scanning it.
    pub fn open(mut source: LineSource, forced: Option<LanguageVariant>) -> io::Result<Self> {
        let variant = match forced {
            Some(variant) => variant,
            None => {
                let first = source.peek()?.map(|line| line.text.clone());
                match classify(source.id().path(), first.as_deref()) {
                    LanguageVariant::Plain if source.id().is_stdin() => {
                        sniff_variant(&mut source)?
                    }
                    variant => variant,
                }
            }
        };
        debug!("Scanning {} as {}", source.id(), variant.name());
        Ok(Self::new(source, variant))
    }

    pub fn variant(&self) -> LanguageVariant {
        self.variant
    }

    /// Give a candidate's body back so nested headers can still be found.
    pub fn release(&mut self, candidate: DefinitionCandidate) {
        self.source.unread_all(candidate.into_trailing_lines());
    }
}

impl Iterator for DefinitionStream {
    type Item = io::Result<DefinitionCandidate>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.variant == LanguageVariant::Plain {
            return None;
        }

        loop {
            let partial = match next_header(&mut self.source, self.variant) {
                Ok(Some(partial)) => partial,
                Ok(None) => return None,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };
            debug!("Found start of def: {:?}", partial.signature);

            match extent::resolve(&mut self.source, partial, self.variant) {
                Ok(candidate) => return Some(Ok(candidate)),
                Err(failure) => {
                    debug!("Dropping candidate: {}", failure);
                    if let extent::FailureReason::Read(e) = failure.reason {
                        self.failed = true;
                        return Some(Err(e));
                    }
                    self.source.unread_all(failure.lines);
                }
            }
        }
    }
}
