//! Scanning tools.
//!
//! - `language`: variant classification by name, extension and shebang
//! - `source`: numbered line reading with pushback
//! - `scanner`: header detection and the definition stream
//! - `extent`: body extent resolution
//! - `highlight`: terminal syntax highlighting

pub mod extent;
pub mod highlight;
pub mod language;
pub mod scanner;
pub mod source;
