//! Error taxonomy for layout mutations.
//!
//! Everything here is a programmer error: an inconsistent call sequence from
//! the host, surfaced immediately and never retried. Capacity shortfalls
//! (content that does not fit even after full shrink apportionment) are
//! deliberately *not* errors; they resolve by force-shrinking the offending
//! view and are reported through the `tracing` feature instead.

use std::fmt;

use crate::Axis;
use crate::tree::ViewId;

/// Errors raised by [`LayoutTree`](crate::LayoutTree) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// View id 0 is reserved.
    ZeroViewId,
    /// The id allocator ran out of ids.
    ViewIdOverflow { current: ViewId },
    /// The view does not exist (never created, or already removed).
    UnknownView { view: ViewId },
    /// Attempt to parent a view that is already attached.
    AlreadyParented { child: ViewId, parent: ViewId },
    /// The view is not a child of the given parent.
    NotAChild { child: ViewId, parent: ViewId },
    /// A grid operation was invoked on a view that is not a grid layout.
    NotAGrid { view: ViewId },
    /// A flex operation was invoked on a view that is not a flex layout.
    NotAFlex { view: ViewId },
    /// A requested territory would cover a cell that is already claimed.
    TerritoryOverlap {
        occupant: ViewId,
        col: usize,
        row: usize,
    },
    /// A requested territory does not resolve to valid cell coordinates.
    TerritoryOutOfBounds {
        col: i64,
        row: i64,
        num_cols: usize,
        num_rows: usize,
    },
    /// Gap index past the end of the gap array for that axis.
    GapIndexOutOfRange {
        axis: Axis,
        index: usize,
        len: usize,
    },
    /// Row/column index past the end of the track list for that axis.
    TrackIndexOutOfRange {
        axis: Axis,
        index: usize,
        len: usize,
    },
    /// Child index past the end of a parent's child list.
    ChildIndexOutOfRange { index: usize, len: usize },
    /// A resize cascade failed to converge within the depth bound.
    ///
    /// Cascades converge by construction; the guard turns a broken
    /// invariant into a hard failure instead of unbounded recursion.
    ResizeRecursionLimit { depth: u32 },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroViewId => write!(f, "view id 0 is invalid"),
            Self::ViewIdOverflow { current } => {
                write!(f, "view id space exhausted at {}", current.get())
            }
            Self::UnknownView { view } => write!(f, "view {} does not exist", view.get()),
            Self::AlreadyParented { child, parent } => write!(
                f,
                "view {} is already attached to parent {}",
                child.get(),
                parent.get()
            ),
            Self::NotAChild { child, parent } => write!(
                f,
                "view {} is not a child of view {}",
                child.get(),
                parent.get()
            ),
            Self::NotAGrid { view } => write!(f, "view {} is not a grid layout", view.get()),
            Self::NotAFlex { view } => write!(f, "view {} is not a flex layout", view.get()),
            Self::TerritoryOverlap { occupant, col, row } => write!(
                f,
                "grid children cannot overlap: cell ({col}, {row}) is claimed by view {}",
                occupant.get()
            ),
            Self::TerritoryOutOfBounds {
                col,
                row,
                num_cols,
                num_rows,
            } => write!(
                f,
                "territory at ({col}, {row}) does not fit a {num_cols}x{num_rows} grid"
            ),
            Self::GapIndexOutOfRange { axis, index, len } => {
                write!(f, "{axis} gap index {index} out of range (len {len})")
            }
            Self::TrackIndexOutOfRange { axis, index, len } => {
                write!(f, "{axis} track index {index} out of range (len {len})")
            }
            Self::ChildIndexOutOfRange { index, len } => {
                write!(f, "child index {index} out of range (len {len})")
            }
            Self::ResizeRecursionLimit { depth } => {
                write!(f, "resize cascade exceeded depth bound {depth}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}
