//! FindFunc - locate function, class and Makefile target definitions.
//!
//! Sources are scanned line by line for definition headers, each header's
//! body extent is resolved, and the resulting candidates are filtered and
//! printed.
//!
//! # Architecture
//!
//! 1. **Tools** (`tools`) - language classification, line sources, header
//!    detection and body extent resolution, highlighting
//! 2. **Types** (`types`) - definition candidates and filter specifications
//! 3. **Service** (`service`) - filter pipeline, renderer and search driver
//! 4. **Config** (`config`) - command-line arguments and `findfunc.json`
//!
//! # Supported sources
//!
//! - C-style brace languages (C, C++, Java, Go, C#, ...)
//! - Python
//! - Shell
//! - JavaScript and TypeScript
//! - Makefiles

pub mod config;
pub mod error;
pub mod service;
pub mod tools;
pub mod types;

pub use error::{Error, Result};

/// Crate version, as printed by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
