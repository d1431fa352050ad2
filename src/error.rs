//! Error types for FindFunc.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for FindFunc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for FindFunc.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Startup Errors =====
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Invalid --length operation: {0}\nExpecting an integer or >N,<N,>=N,<=N,=N,==N.")]
    InvalidLength(String),

    #[error("Invalid pattern for {flag}: {source}")]
    Regex {
        flag: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    // ===== I/O Errors =====
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// Create a regex error for the given command-line flag.
    pub fn regex(flag: &'static str, source: regex::Error) -> Self {
        Self::Regex { flag, source }
    }

    /// Create a per-file read error.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Check if this error came from a closed output pipe.
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            Self::Io(e) => e.kind() == std::io::ErrorKind::BrokenPipe,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let usage = Error::Usage("no default paths configured".to_string());
        assert_eq!(usage.to_string(), "Usage error: no default paths configured");

        let length = Error::InvalidLength(">x".to_string());
        assert!(length.to_string().starts_with("Invalid --length operation: >x"));

        let config = Error::Config {
            path: PathBuf::from("findfunc.json"),
            message: "expected value".to_string(),
        };
        assert_eq!(
            config.to_string(),
            "Configuration error in findfunc.json: expected value"
        );
    }

    #[test]
    fn test_regex_error() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = Error::regex("--contains", source);
        assert!(err.to_string().starts_with("Invalid pattern for --contains:"));
    }

    #[test]
    fn test_error_is_broken_pipe() {
        let pipe = Error::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"));
        assert!(pipe.is_broken_pipe());

        let other = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert!(!other.is_broken_pipe());
    }

    #[test]
    fn test_file_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::file("/root/secret.c", io);
        assert_eq!(err.to_string(), "Cannot read /root/secret.c: denied");
    }
}
