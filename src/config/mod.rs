//! Configuration management for FindFunc.
//!
//! `Args` is the raw command line; `Config` is the validated run
//! configuration built from it. `Settings` models the optional
//! `findfunc.json` file that supplies default paths for `-p`.

use clap::Parser;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::service::render::Renderer;
use crate::tools::language::LanguageVariant;
use crate::types::{compile_optional, FilterOptions, FilterSpec, LengthTest};

/// Settings file name, looked up in several directories.
pub const SETTINGS_FILE: &str = "findfunc.json";

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "findfunc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find function, class and Makefile target definitions")]
#[command(disable_version_flag = true)]
#[command(after_help = "Reads standard input when no PATH is given. With -p, \
paths are read from \"default_paths\" in ./findfunc.json, ~/findfunc.json \
or ~/.local/share/findfunc.json.")]
pub struct Args {
    /// Name pattern (regex) of the definitions to find
    #[arg(value_name = "PAT")]
    pub pattern: String,

    /// Files or directories to search
    #[arg(value_name = "PATH", conflicts_with = "paths")]
    pub inputs: Vec<PathBuf>,

    /// Match PAT anywhere in the name
    #[arg(short, long)]
    pub any: bool,

    /// Force colored output
    #[arg(long, env = "FINDFUNC_COLOR")]
    pub color: bool,

    /// Only show definitions whose body matches this pattern
    #[arg(short, long, value_name = "PAT")]
    pub contains: Option<String>,

    /// Only show definitions whose body does not match this pattern (cancels -c)
    #[arg(short = 'C', long, value_name = "PAT")]
    pub without: Option<String>,

    /// Enable debug logging
    #[arg(short = 'D', long, env = "FINDFUNC_DEBUG")]
    pub debug: bool,

    /// Skip file paths matching this pattern
    #[arg(short, long, value_name = "PAT")]
    pub exclude: Option<String>,

    /// Only search file paths matching this pattern
    #[arg(short, long, value_name = "PAT")]
    pub filter: Option<String>,

    /// Line count test: N, =N, ==N, <N, <=N, >N or >=N
    #[arg(short, long, value_name = "SPEC", allow_hyphen_values = true)]
    pub length: Option<LengthTest>,

    /// Stop after N definitions (0 for no limit)
    #[arg(short, long = "maxcount", value_name = "N")]
    pub maxcount: Option<usize>,

    /// Search the default paths from findfunc.json
    #[arg(short, long)]
    pub paths: bool,

    /// Only print signatures
    #[arg(short = 'S', long)]
    pub signature: bool,

    /// Use shorter output mode
    #[arg(short, long)]
    pub short: bool,

    /// Scan every input as this language
    #[arg(long, value_name = "VARIANT", value_enum)]
    pub lang: Option<LanguageVariant>,

    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,
}

/// The validated configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Compiled name and body filters
    pub filter: FilterSpec,
    /// Path include pattern (`-f`)
    pub include: Option<Regex>,
    /// Path exclude pattern (`-e`)
    pub exclude: Option<Regex>,
    /// Files and directories to scan; empty means standard input
    pub inputs: Vec<PathBuf>,
    /// Forced language variant
    pub language: Option<LanguageVariant>,
    /// Output formatting
    pub renderer: Renderer,
}

impl Config {
    /// Validate `args` and compile every pattern.
    ///
    /// `color` is the final color decision; callers combine `--color` with
    /// a terminal check.
    pub fn from_args(args: Args, color: bool) -> Result<Self> {
        let options = FilterOptions {
            pattern: args.pattern.clone(),
            any: args.any,
            contains: args.contains.clone(),
            without: args.without.clone(),
            length: args.length,
            max_count: args.maxcount,
        };
        let filter = FilterSpec::build(&options)?;
        let include = compile_optional("--filter", args.filter.as_deref())?;
        let exclude = compile_optional("--exclude", args.exclude.as_deref())?;

        let inputs = if args.paths {
            let defaults = default_paths();
            if defaults.is_empty() {
                return Err(Error::Usage(format!(
                    "No default paths configured. Add \"default_paths\" to {}.",
                    SETTINGS_FILE
                )));
            }
            defaults
        } else {
            args.inputs
        };

        Ok(Self {
            filter,
            include,
            exclude,
            inputs,
            language: args.lang,
            renderer: Renderer::from_flags(args.signature, args.short, color),
        })
    }

    /// True when no paths were given and input comes from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Apply `-f` then `-e` to a file path.
    pub fn wants_path(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        if let Some(ref include) = self.include {
            if !include.is_match(&text) {
                return false;
            }
        }
        if let Some(ref exclude) = self.exclude {
            if exclude.is_match(&text) {
                return false;
            }
        }
        true
    }
}

/// Default paths from the first settings file found, or none.
fn default_paths() -> Vec<PathBuf> {
    match Settings::locate() {
        Ok(Some((path, settings))) => {
            debug!("Using settings from {}", path.display());
            settings.default_paths()
        }
        Ok(None) => {
            debug!("No {} found", SETTINGS_FILE);
            Vec::new()
        }
        Err(e) => {
            warn!("{}", e);
            Vec::new()
        }
    }
}

/// Contents of `findfunc.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Paths searched when `-p` is given
    #[serde(default)]
    pub default_paths: Vec<String>,
}

impl Settings {
    /// Where settings files are looked for, in order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(SETTINGS_FILE)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(SETTINGS_FILE));
            paths.push(home.join(".local").join("share").join(SETTINGS_FILE));
        }
        paths
    }

    /// Load the first settings file that exists.
    pub fn locate() -> Result<Option<(PathBuf, Self)>> {
        Self::locate_in(&Self::search_paths())
    }

    /// Load the first of `candidates` that exists.
    pub fn locate_in(candidates: &[PathBuf]) -> Result<Option<(PathBuf, Self)>> {
        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => Ok(Some((path.clone(), Self::load(path)?))),
            None => Ok(None),
        }
    }

    /// Read and parse one settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
        serde_json::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Configured default paths with `~/` expanded; blank entries dropped.
    pub fn default_paths(&self) -> Vec<PathBuf> {
        self.default_paths
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(expand_home)
            .collect()
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::render::RenderMode;
    use crate::types::LengthOp;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_args_defaults() {
        let args = parse(&["findfunc", "main"]);
        assert_eq!(args.pattern, "main");
        assert!(args.inputs.is_empty());
        assert!(!args.any);
        assert!(args.length.is_none());
        assert!(args.maxcount.is_none());
        assert!(args.lang.is_none());
    }

    #[test]
    fn test_args_all_flags() {
        let args = parse(&[
            "findfunc", "-a", "-c", "x", "-C", "y", "-D", "-e", "test", "-f", "src", "-l",
            ">=3", "-m", "2", "-S", "-s", "--lang", "py", "foo", "a.c", "b",
        ]);
        assert_eq!(args.pattern, "foo");
        assert_eq!(args.inputs, vec![PathBuf::from("a.c"), PathBuf::from("b")]);
        assert!(args.any && args.debug && args.signature && args.short);
        assert_eq!(args.contains.as_deref(), Some("x"));
        assert_eq!(args.without.as_deref(), Some("y"));
        assert_eq!(args.exclude.as_deref(), Some("test"));
        assert_eq!(args.filter.as_deref(), Some("src"));
        assert_eq!(args.length, Some(LengthTest::new(LengthOp::Ge, 3)));
        assert_eq!(args.maxcount, Some(2));
        assert_eq!(args.lang, Some(LanguageVariant::Python));
    }

    #[test]
    fn test_args_lang_names() {
        for (name, variant) in [
            ("c", LanguageVariant::CStyle),
            ("javascript", LanguageVariant::JavaScript),
            ("js", LanguageVariant::JavaScript),
            ("bash", LanguageVariant::Shell),
            ("makefile", LanguageVariant::Makefile),
            ("plain", LanguageVariant::Plain),
        ] {
            let args = parse(&["findfunc", "--lang", name, "x"]);
            assert_eq!(args.lang, Some(variant), "{}", name);
        }
    }

    #[test]
    fn test_args_rejects_bad_length() {
        assert!(Args::try_parse_from(["findfunc", "-l", ">x", "foo"]).is_err());
    }

    #[test]
    fn test_args_paths_conflicts_with_inputs() {
        let err = Args::try_parse_from(["findfunc", "-p", "foo", "src"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_args_version_flag() {
        let err = Args::try_parse_from(["findfunc", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_args_requires_pattern() {
        let err = Args::try_parse_from(["findfunc"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_config_from_args() {
        let config = Config::from_args(parse(&["findfunc", "-S", "main", "src"]), false).unwrap();
        assert_eq!(config.inputs, vec![PathBuf::from("src")]);
        assert!(!config.reads_stdin());
        assert_eq!(config.renderer.mode(), RenderMode::Signature);
        assert!(!config.renderer.color());
        assert!(config.filter.matches_name("MAIN"));
    }

    #[test]
    fn test_config_invalid_patterns_are_fatal() {
        let err = Config::from_args(parse(&["findfunc", "foo("]), false).unwrap_err();
        assert!(matches!(err, Error::Regex { flag: "PAT", .. }));
        assert!(err.to_string().contains("PAT"));

        let err = Config::from_args(parse(&["findfunc", "-e", "[", "foo"]), false).unwrap_err();
        assert!(err.to_string().contains("--exclude"));
    }

    #[test]
    fn test_wants_path() {
        let config = Config::from_args(
            parse(&["findfunc", "-f", r"\.py$", "-e", "test", "x"]),
            false,
        )
        .unwrap();
        assert!(config.wants_path(Path::new("src/app.py")));
        assert!(!config.wants_path(Path::new("src/app.c")));
        assert!(!config.wants_path(Path::new("tests/test_app.py")));

        let open = Config::from_args(parse(&["findfunc", "x"]), false).unwrap();
        assert!(open.wants_path(Path::new("anything")));
    }

    #[test]
    fn test_settings_locate_first_existing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        std::fs::write(&first, r#"{"default_paths": ["/srv/code", " ", "~/src"]}"#).unwrap();
        std::fs::write(&second, r#"{"default_paths": ["/other"]}"#).unwrap();

        let (path, settings) = Settings::locate_in(&[missing, first.clone(), second])
            .unwrap()
            .unwrap();
        assert_eq!(path, first);

        let paths = settings.default_paths();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], PathBuf::from("/srv/code"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(paths[1], home.join("src"));
        }
    }

    #[test]
    fn test_settings_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        assert!(Settings::locate_in(&[dir.path().join("none.json")])
            .unwrap()
            .is_none());

        let bad = dir.path().join("findfunc.json");
        std::fs::write(&bad, "{ not json").unwrap();
        let err = Settings::locate_in(&[bad]).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_settings_missing_key_is_empty() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home);
            assert_eq!(expand_home("~/code"), home.join("code"));
        }
    }
}
