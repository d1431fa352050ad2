//! Service layer for FindFunc.
//!
//! Orchestrates a run: the filter pipeline, result rendering, and the
//! driver that feeds inputs through both.

pub mod pipeline;
pub mod render;
pub mod search;

pub use pipeline::{Flow, MatchCounter, Offer, Pipeline};
pub use render::{RenderMode, Renderer};
pub use search::{Search, Summary};
