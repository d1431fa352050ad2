//! Core type definitions for FindFunc.
//!
//! This module contains the data model shared by the scanner, the filter
//! pipeline and the renderer.

pub mod definition;
pub mod filter;

// Re-export commonly used types
pub use definition::*;
pub use filter::*;
