//! Language classification for definition scanning.
//!
//! Every input is assigned one `LanguageVariant`, which selects the header
//! detection and body extent rules used for the whole file. Classification
//! looks at the basename, then the extension, then a shebang line.

use std::path::Path;

/// The family of surface syntax a file is scanned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum LanguageVariant {
    /// Brace-delimited bodies: C, C++, Java, Go, Rust, C#, ...
    #[value(name = "c", alias = "c-style")]
    CStyle,
    /// Indentation-delimited bodies
    #[value(alias = "py")]
    Python,
    /// Shell functions
    #[value(alias = "sh", alias = "bash")]
    Shell,
    /// JavaScript and TypeScript
    #[value(name = "javascript", alias = "js")]
    JavaScript,
    /// Makefile targets and their recipes
    #[value(alias = "make")]
    Makefile,
    /// Unknown; nothing is ever found
    Plain,
}

impl LanguageVariant {
    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CStyle => "c",
            Self::Python => "python",
            Self::Shell => "shell",
            Self::JavaScript => "javascript",
            Self::Makefile => "makefile",
            Self::Plain => "plain",
        }
    }

    /// A file extension syntect knows for this variant.
    pub fn syntax_extension(&self) -> &'static str {
        match self {
            Self::CStyle => "c",
            Self::Python => "py",
            Self::Shell => "sh",
            Self::JavaScript => "js",
            Self::Makefile => "mk",
            Self::Plain => "txt",
        }
    }
}

/// Maps a file extension to a language variant.
///
/// # Examples
///
/// ```
/// use findfunc::tools::language::{extension_to_variant, LanguageVariant};
/// assert_eq!(extension_to_variant("py"), Some(LanguageVariant::Python));
/// assert_eq!(extension_to_variant("hpp"), Some(LanguageVariant::CStyle));
/// assert_eq!(extension_to_variant("md"), None);
/// ```
pub fn extension_to_variant(ext: &str) -> Option<LanguageVariant> {
    let variant = match ext.to_ascii_lowercase().as_str() {
        // Indentation
        "py" | "pyw" | "pyi" => LanguageVariant::Python,

        // Shell
        "sh" | "bash" | "zsh" | "ksh" => LanguageVariant::Shell,

        // JavaScript family
        "js" | "mjs" | "cjs" | "jsx" | "ts" | "mts" | "cts" | "tsx" => {
            LanguageVariant::JavaScript
        }

        // Make
        "mk" | "mak" => LanguageVariant::Makefile,

        // Systems programming
        "c" | "h" | "cc" | "cpp" | "cxx" | "c++" | "hpp" | "hh" | "hxx" | "ino" => {
            LanguageVariant::CStyle
        }
        "go" | "rs" | "zig" | "d" => LanguageVariant::CStyle,

        // JVM and .NET
        "java" | "kt" | "kts" | "scala" | "groovy" | "gradle" | "cs" => LanguageVariant::CStyle,

        // Other brace languages
        "swift" | "dart" | "php" | "m" | "mm" => LanguageVariant::CStyle,

        _ => return None,
    };
    Some(variant)
}

/// Maps a basename to a language variant, for files recognized by name.
///
/// Only Makefiles are recognized this way: `Makefile`, `makefile`,
/// `GNUmakefile`, and `makefile.<ext>` variants.
pub fn filename_to_variant(name: &str) -> Option<LanguageVariant> {
    let lower = name.to_ascii_lowercase();
    let stem = lower.split('.').next().unwrap_or("");
    match stem {
        "makefile" | "gnumakefile" => Some(LanguageVariant::Makefile),
        _ => None,
    }
}

/// Maps a `#!` line to a language variant.
///
/// Handles both direct interpreter paths and `/usr/bin/env [-S] name`.
///
/// # Examples
///
/// ```
/// use findfunc::tools::language::{shebang_to_variant, LanguageVariant};
/// assert_eq!(shebang_to_variant("#!/usr/bin/env bash"), Some(LanguageVariant::Shell));
/// assert_eq!(shebang_to_variant("#!/usr/bin/python3 -u"), Some(LanguageVariant::Python));
/// assert_eq!(shebang_to_variant("int x;"), None);
/// ```
pub fn shebang_to_variant(line: &str) -> Option<LanguageVariant> {
    let command = line.strip_prefix("#!")?.trim();
    let mut words = command.split_whitespace();
    let mut interpreter = basename(words.next()?);
    if interpreter == "env" {
        interpreter = words
            .find(|w| !w.starts_with('-') && !w.contains('='))
            .map(basename)?;
    }

    let name = interpreter.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    match name {
        "python" | "pypy" => Some(LanguageVariant::Python),
        "sh" | "bash" | "zsh" | "ksh" | "dash" | "ash" | "mksh" => Some(LanguageVariant::Shell),
        "node" | "nodejs" | "deno" | "bun" => Some(LanguageVariant::JavaScript),
        "make" | "gmake" => Some(LanguageVariant::Makefile),
        "tcc" => Some(LanguageVariant::CStyle),
        _ => None,
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Classify an input by path and, optionally, its first line.
///
/// Priority: Makefile basename, extension, shebang, then `Plain`.
/// Standard input has no path, so only the shebang rule can apply.
pub fn classify(path: Option<&Path>, first_line: Option<&str>) -> LanguageVariant {
    if let Some(path) = path {
        let name = path.file_name().and_then(|n| n.to_str());
        if let Some(variant) = name.and_then(filename_to_variant) {
            return variant;
        }
        let ext = path.extension().and_then(|e| e.to_str());
        if let Some(variant) = ext.and_then(extension_to_variant) {
            return variant;
        }
    }

    first_line
        .and_then(shebang_to_variant)
        .unwrap_or(LanguageVariant::Plain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_to_variant() {
        assert_eq!(extension_to_variant("py"), Some(LanguageVariant::Python));
        assert_eq!(extension_to_variant("sh"), Some(LanguageVariant::Shell));
        assert_eq!(extension_to_variant("bash"), Some(LanguageVariant::Shell));
        assert_eq!(extension_to_variant("js"), Some(LanguageVariant::JavaScript));
        assert_eq!(extension_to_variant("ts"), Some(LanguageVariant::JavaScript));
        assert_eq!(extension_to_variant("c"), Some(LanguageVariant::CStyle));
        assert_eq!(extension_to_variant("H"), Some(LanguageVariant::CStyle));
        assert_eq!(extension_to_variant("java"), Some(LanguageVariant::CStyle));
        assert_eq!(extension_to_variant("mk"), Some(LanguageVariant::Makefile));
        assert_eq!(extension_to_variant("txt"), None);
    }

    #[test]
    fn test_filename_to_variant() {
        assert_eq!(filename_to_variant("Makefile"), Some(LanguageVariant::Makefile));
        assert_eq!(filename_to_variant("makefile"), Some(LanguageVariant::Makefile));
        assert_eq!(filename_to_variant("GNUmakefile"), Some(LanguageVariant::Makefile));
        assert_eq!(filename_to_variant("Makefile.am"), Some(LanguageVariant::Makefile));
        assert_eq!(filename_to_variant("Dockerfile"), None);
        assert_eq!(filename_to_variant("makefiles.py"), None);
    }

    #[test]
    fn test_shebang_to_variant() {
        assert_eq!(shebang_to_variant("#!/bin/sh"), Some(LanguageVariant::Shell));
        assert_eq!(
            shebang_to_variant("#!/usr/bin/env python3"),
            Some(LanguageVariant::Python)
        );
        assert_eq!(
            shebang_to_variant("#!/usr/bin/env -S node --no-warnings"),
            Some(LanguageVariant::JavaScript)
        );
        assert_eq!(
            shebang_to_variant("#!/usr/bin/python3.11"),
            Some(LanguageVariant::Python)
        );
        assert_eq!(
            shebang_to_variant("#!/usr/bin/make -f"),
            Some(LanguageVariant::Makefile)
        );
        assert_eq!(shebang_to_variant("#!/usr/bin/env perl"), None);
        assert_eq!(shebang_to_variant("# just a comment"), None);
    }

    #[test]
    fn test_classify_priority() {
        // Basename wins over extension.
        assert_eq!(
            classify(Some(Path::new("build/Makefile.py")), None),
            LanguageVariant::Makefile
        );
        // Extension wins over shebang.
        assert_eq!(
            classify(Some(Path::new("tool.py")), Some("#!/bin/bash")),
            LanguageVariant::Python
        );
        // Shebang when there is no known extension.
        assert_eq!(
            classify(Some(Path::new("bin/deploy")), Some("#!/usr/bin/env bash")),
            LanguageVariant::Shell
        );
        assert_eq!(
            classify(Some(Path::new("README")), Some("hello")),
            LanguageVariant::Plain
        );
    }

    #[test]
    fn test_classify_stdin() {
        assert_eq!(classify(None, None), LanguageVariant::Plain);
        assert_eq!(
            classify(None, Some("#!/usr/bin/env python")),
            LanguageVariant::Python
        );
        assert_eq!(classify(None, Some("all:")), LanguageVariant::Plain);
    }

    #[test]
    fn test_variant_names() {
        assert_eq!(LanguageVariant::CStyle.name(), "c");
        assert_eq!(LanguageVariant::Makefile.syntax_extension(), "mk");
    }
}
