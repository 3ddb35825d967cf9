#![forbid(unsafe_code)]

//! Box, flex, and grid layout for chart composition.
//!
//! This crate arranges a tree of rectangular, padded views into rows and
//! columns under hard size constraints and keeps the arrangement consistent
//! as views resize:
//!
//! - [`LayoutTree`] - arena of views with parent/child bookkeeping and
//!   bubbling resize notifications
//! - [`Frame`] - position, size, padding, and flex capability of one view
//! - [`FlexSpec`] - sequential row/column flow with a fixed gap
//! - [`GridOptions`] / [`TerritoryRequest`] - the 2D grid engine: cell
//!   occupancy, rule boundaries, shrink/grow apportionment, auto-sizing
//!
//! # Example
//!
//! ```
//! use plotkit_layout::{Frame, GridOptions, LayoutTree};
//!
//! let mut tree = LayoutTree::new();
//! let grid = tree.create_grid(Frame::new(), 2, GridOptions::default()).unwrap();
//!
//! let label = tree.create_view(Frame::new()).unwrap();
//! tree.set_size(label, 40.0, 12.0).unwrap();
//! tree.grid_append(grid, label, None).unwrap();
//!
//! assert_eq!(tree.compute_size(grid).unwrap().width, 40.0);
//! ```

pub mod error;
pub mod flex;
pub mod grid;
pub mod tree;
pub mod view;

pub use error::LayoutError;
pub use flex::FlexSpec;
pub use grid::{GridOptions, Territory, TerritoryRequest};
pub use plotkit_core::geometry::{Insets, Point, Rect, Size};
pub use tree::{LayoutTree, ResizeEvent, ViewId};
pub use view::Frame;

/// A layout axis.
///
/// Rows flow along [`Axis::Horizontal`]; columns along [`Axis::Vertical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Left to right (widths, columns).
    #[default]
    Horizontal,
    /// Top to bottom (heights, rows).
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    #[must_use]
    pub const fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Short label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Alignment of a view within the space allotted to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Flush to the leading edge (left/top).
    #[default]
    Start,
    /// Centered within available space.
    Center,
    /// Flush to the trailing edge (right/bottom).
    End,
}
