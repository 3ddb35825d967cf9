#![forbid(unsafe_code)]

//! Core: geometric primitives and logging support for the plotkit layout engine.

pub mod geometry;
pub mod logging;

pub use geometry::{Insets, Point, Rect, Size};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, trace_span, warn, warn_span};
