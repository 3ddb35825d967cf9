//! The grid layout engine.
//!
//! A grid is a cell matrix plus bookkeeping that turns cell spans into
//! physical pixel boundaries:
//!
//! - every child claims a rectangular [`Territory`] of cells;
//! - `h_rules`/`v_rules` hold cumulative boundary offsets per axis,
//!   *excluding* gaps (row `r` is `h_rules[r+1] - h_rules[r]` tall; gaps
//!   enter only absolute positions and total size);
//! - when content outgrows its span, the spanned tracks grow and the other
//!   tracks give up slack, apportioned in proportion to how much each can
//!   shrink without violating a non-flexible occupant.
//!
//! Content that does not fit even after full apportionment is resolved by
//! force-shrinking the offending view. That is a well-defined lossy
//! fallback, not an error; it is reported through the `tracing` feature.

use std::collections::BTreeMap;

use plotkit_core::geometry::Size;

use crate::error::LayoutError;
use crate::tree::{LayoutKind, LayoutTree, ViewId};
use crate::{Align, Axis};

/// Tolerance for rule arithmetic on accumulated floats.
const EPS: f64 = 1e-9;

/// Construction options for a grid layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptions {
    /// Gap inserted between consecutive rows.
    pub row_gap: f64,
    /// Gap inserted between consecutive columns.
    pub col_gap: f64,
    /// Default vertical snap for every row.
    pub row_align: Align,
    /// Default horizontal snap for every column.
    pub col_align: Align,
    /// Whether the grid's width tracks content exactly (rules only grow).
    pub auto_width: bool,
    /// Whether the grid's height tracks content exactly.
    pub auto_height: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_gap: 0.0,
            col_gap: 0.0,
            row_align: Align::Center,
            col_align: Align::Center,
            auto_width: true,
            auto_height: true,
        }
    }
}

impl GridOptions {
    /// Builder: set both gaps.
    #[must_use]
    pub fn gaps(mut self, row_gap: f64, col_gap: f64) -> Self {
        self.row_gap = row_gap;
        self.col_gap = col_gap;
        self
    }

    /// Builder: fix both axes (the grid owns a size and apportions within
    /// it instead of growing to fit).
    #[must_use]
    pub fn fixed(mut self) -> Self {
        self.auto_width = false;
        self.auto_height = false;
        self
    }

    /// Builder: set auto-sizing per axis.
    #[must_use]
    pub fn auto(mut self, width: bool, height: bool) -> Self {
        self.auto_width = width;
        self.auto_height = height;
        self
    }

    /// Builder: set default alignment per axis.
    #[must_use]
    pub fn aligns(mut self, row_align: Align, col_align: Align) -> Self {
        self.row_align = row_align;
        self.col_align = col_align;
        self
    }
}

/// The resolved rectangular cell span claimed by one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Territory {
    /// Leftmost claimed column.
    pub x: usize,
    /// Topmost claimed row.
    pub y: usize,
    /// Claimed columns (>= 1).
    pub width: usize,
    /// Claimed rows (>= 1).
    pub height: usize,
    /// Per-view override of the row alignment default.
    pub row_align: Option<Align>,
    /// Per-view override of the column alignment default.
    pub col_align: Option<Align>,
}

/// A territory claim, resolved against the grid at claim time.
///
/// Negative `x`/`y` index from the end, Python style: `-1` is the last
/// column/row. A row index past the current matrix appends empty rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerritoryRequest {
    pub x: i64,
    pub y: i64,
    pub width: usize,
    pub height: usize,
    pub row_align: Option<Align>,
    pub col_align: Option<Align>,
}

impl TerritoryRequest {
    /// A 1x1 claim at the given cell.
    #[must_use]
    pub fn at(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            width: 1,
            height: 1,
            row_align: None,
            col_align: None,
        }
    }

    /// Builder: widen the claim to `width` x `height` cells.
    #[must_use]
    pub fn span(mut self, width: usize, height: usize) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    /// Builder: override the row alignment for this view.
    #[must_use]
    pub fn row_align(mut self, align: Align) -> Self {
        self.row_align = Some(align);
        self
    }

    /// Builder: override the column alignment for this view.
    #[must_use]
    pub fn col_align(mut self, align: Align) -> Self {
        self.col_align = Some(align);
        self
    }
}

/// Internal grid state: matrix, claims, rules, gaps, alignment defaults.
#[derive(Debug, Clone)]
pub(crate) struct GridSpec {
    num_cols: usize,
    cells: Vec<Vec<Option<ViewId>>>,
    territories: BTreeMap<ViewId, Territory>,
    row_gaps: Vec<f64>,
    col_gaps: Vec<f64>,
    row_aligns: Vec<Align>,
    col_aligns: Vec<Align>,
    h_rules: Vec<f64>,
    v_rules: Vec<f64>,
    auto_width: bool,
    auto_height: bool,
    default_row_gap: f64,
    default_col_gap: f64,
    default_row_align: Align,
    default_col_align: Align,
}

impl GridSpec {
    /// A grid starts with one empty row and zero-width tracks.
    pub(crate) fn new(num_cols: usize, options: GridOptions) -> Self {
        let num_cols = num_cols.max(1);
        Self {
            num_cols,
            cells: vec![vec![None; num_cols]],
            territories: BTreeMap::new(),
            row_gaps: Vec::new(),
            col_gaps: vec![options.col_gap; num_cols - 1],
            row_aligns: vec![options.row_align],
            col_aligns: vec![options.col_align; num_cols],
            h_rules: vec![0.0; 2],
            v_rules: vec![0.0; num_cols + 1],
            auto_width: options.auto_width,
            auto_height: options.auto_height,
            default_row_gap: options.row_gap,
            default_col_gap: options.col_gap,
            default_row_align: options.row_align,
            default_col_align: options.col_align,
        }
    }

    fn num_rows(&self) -> usize {
        self.cells.len()
    }

    fn is_auto(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.auto_width,
            Axis::Vertical => self.auto_height,
        }
    }

    fn rules(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Horizontal => &self.v_rules,
            Axis::Vertical => &self.h_rules,
        }
    }

    fn rules_mut(&mut self, axis: Axis) -> &mut Vec<f64> {
        match axis {
            Axis::Horizontal => &mut self.v_rules,
            Axis::Vertical => &mut self.h_rules,
        }
    }

    fn gaps(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Horizontal => &self.col_gaps,
            Axis::Vertical => &self.row_gaps,
        }
    }

    fn track_count(&self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.num_cols,
            Axis::Vertical => self.num_rows(),
        }
    }

    /// Physical size of one track.
    fn track_size(&self, axis: Axis, index: usize) -> f64 {
        let rules = self.rules(axis);
        rules[index + 1] - rules[index]
    }

    /// Physical extent of a contiguous span of tracks: spanned sizes plus,
    /// optionally, the gaps between them.
    fn span_extent(&self, axis: Axis, start: usize, len: usize, include_gaps: bool) -> f64 {
        let rules = self.rules(axis);
        let mut extent = rules[start + len] - rules[start];
        if include_gaps && len > 1 {
            extent += self.gaps(axis)[start..start + len - 1].iter().sum::<f64>();
        }
        extent
    }

    /// Absolute offset of a track's leading boundary, gaps included.
    fn track_offset(&self, axis: Axis, index: usize) -> f64 {
        self.rules(axis)[index] + self.gaps(axis)[..index].iter().sum::<f64>()
    }

    /// Total content extent: trailing rule plus every gap.
    fn content_extent(&self, axis: Axis) -> f64 {
        let rules = self.rules(axis);
        rules[rules.len() - 1] + self.gaps(axis).iter().sum::<f64>()
    }

    fn territory_span(territory: &Territory, axis: Axis) -> (usize, usize) {
        match axis {
            Axis::Horizontal => (territory.x, territory.width),
            Axis::Vertical => (territory.y, territory.height),
        }
    }

    /// First unclaimed cell in row-major scan order.
    fn first_empty_cell(&self) -> Option<(usize, usize)> {
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.is_none() {
                    return Some((col, row));
                }
            }
        }
        None
    }

    fn push_empty_row(&mut self) {
        self.cells.push(vec![None; self.num_cols]);
        let last = self.h_rules.last().copied().unwrap_or(0.0);
        self.h_rules.push(last);
        if self.num_rows() > 1 {
            self.row_gaps.push(self.default_row_gap);
        }
        self.row_aligns.push(self.default_row_align);
    }

    fn is_row_empty(&self, row: usize) -> bool {
        self.cells[row].iter().all(Option::is_none)
    }

    fn is_col_empty(&self, col: usize) -> bool {
        self.cells.iter().all(|row| row[col].is_none())
    }

    /// Views whose territory starts or ends exactly at this track's
    /// boundaries. Only these constrain the track's shrinkability.
    fn touching_track(&self, axis: Axis, index: usize) -> Vec<(ViewId, Territory)> {
        self.territories
            .iter()
            .filter_map(|(&view, territory)| {
                let (start, len) = Self::territory_span(territory, axis);
                (start == index || start + len == index + 1).then_some((view, *territory))
            })
            .collect()
    }

    /// Zero-collapse fully empty rows/columns and drop trailing empty rows.
    ///
    /// A collapsed track's rule span becomes zero and the gaps beside it
    /// are cleared (a gap next to an empty track means nothing). Trailing
    /// empty rows are removed entirely so a remove undoes the matrix growth
    /// of the append that caused it.
    fn contract(&mut self) {
        let rows = self.num_rows();
        let heights: Vec<f64> = (0..rows).map(|r| self.track_size(Axis::Vertical, r)).collect();
        let mut cursor = self.h_rules[0];
        for row in 0..rows {
            let height = if self.is_row_empty(row) {
                if row > 0 {
                    self.row_gaps[row - 1] = 0.0;
                }
                if row + 1 < rows {
                    self.row_gaps[row] = 0.0;
                }
                0.0
            } else {
                heights[row]
            };
            cursor += height;
            self.h_rules[row + 1] = cursor;
        }

        let cols = self.num_cols;
        let widths: Vec<f64> = (0..cols).map(|c| self.track_size(Axis::Horizontal, c)).collect();
        let mut cursor = self.v_rules[0];
        for col in 0..cols {
            let width = if self.is_col_empty(col) {
                if col > 0 {
                    self.col_gaps[col - 1] = 0.0;
                }
                if col + 1 < cols {
                    self.col_gaps[col] = 0.0;
                }
                0.0
            } else {
                widths[col]
            };
            cursor += width;
            self.v_rules[col + 1] = cursor;
        }

        while self.num_rows() > 1 && self.is_row_empty(self.num_rows() - 1) {
            self.cells.pop();
            self.h_rules.pop();
            self.row_gaps.pop();
            self.row_aligns.pop();
        }
    }
}

/// Proportional shrink apportionment over one axis.
struct ShrinkPlan {
    /// Per-track shrink amounts, `0` for untouched tracks.
    shares: Vec<f64>,
    /// Total shrink actually available (`min(need, avail)`).
    total: f64,
}

/// Queued deferred resizes: per view, new width and/or height.
type QueuedResizes = BTreeMap<ViewId, (Option<f64>, Option<f64>)>;

impl LayoutTree {
    pub(crate) fn grid_spec(&self, id: ViewId) -> Result<&GridSpec, LayoutError> {
        match &self.node(id)?.layout {
            LayoutKind::Grid(spec) => Ok(spec),
            _ => Err(LayoutError::NotAGrid { view: id }),
        }
    }

    fn grid_spec_mut(&mut self, id: ViewId) -> Result<&mut GridSpec, LayoutError> {
        match &mut self.node_mut(id)?.layout {
            LayoutKind::Grid(spec) => Ok(spec),
            _ => Err(LayoutError::NotAGrid { view: id }),
        }
    }

    /// Number of columns.
    pub fn grid_num_cols(&self, grid: ViewId) -> Result<usize, LayoutError> {
        Ok(self.grid_spec(grid)?.num_cols)
    }

    /// Number of rows.
    pub fn grid_num_rows(&self, grid: ViewId) -> Result<usize, LayoutError> {
        Ok(self.grid_spec(grid)?.num_rows())
    }

    /// Cumulative row boundary offsets, gaps excluded. `num_rows + 1` long.
    pub fn grid_h_rules(&self, grid: ViewId) -> Result<&[f64], LayoutError> {
        Ok(&self.grid_spec(grid)?.h_rules)
    }

    /// Cumulative column boundary offsets, gaps excluded. `num_cols + 1` long.
    pub fn grid_v_rules(&self, grid: ViewId) -> Result<&[f64], LayoutError> {
        Ok(&self.grid_spec(grid)?.v_rules)
    }

    /// Gaps between consecutive rows. `num_rows - 1` long.
    pub fn grid_row_gaps(&self, grid: ViewId) -> Result<&[f64], LayoutError> {
        Ok(&self.grid_spec(grid)?.row_gaps)
    }

    /// Gaps between consecutive columns. `num_cols - 1` long.
    pub fn grid_col_gaps(&self, grid: ViewId) -> Result<&[f64], LayoutError> {
        Ok(&self.grid_spec(grid)?.col_gaps)
    }

    /// Default alignment per row.
    pub fn grid_row_aligns(&self, grid: ViewId) -> Result<&[Align], LayoutError> {
        Ok(&self.grid_spec(grid)?.row_aligns)
    }

    /// Default alignment per column.
    pub fn grid_col_aligns(&self, grid: ViewId) -> Result<&[Align], LayoutError> {
        Ok(&self.grid_spec(grid)?.col_aligns)
    }

    /// The territory claimed by a child, if it is in this grid.
    pub fn grid_territory(
        &self,
        grid: ViewId,
        child: ViewId,
    ) -> Result<Option<Territory>, LayoutError> {
        Ok(self.grid_spec(grid)?.territories.get(&child).copied())
    }

    /// The occupant of a cell.
    pub fn grid_cell(
        &self,
        grid: ViewId,
        col: usize,
        row: usize,
    ) -> Result<Option<ViewId>, LayoutError> {
        let spec = self.grid_spec(grid)?;
        if col >= spec.num_cols {
            return Err(LayoutError::TrackIndexOutOfRange {
                axis: Axis::Horizontal,
                index: col,
                len: spec.num_cols,
            });
        }
        if row >= spec.num_rows() {
            return Err(LayoutError::TrackIndexOutOfRange {
                axis: Axis::Vertical,
                index: row,
                len: spec.num_rows(),
            });
        }
        Ok(spec.cells[row][col])
    }

    /// Set the gap below row `index`. Out of range is a hard error.
    pub fn set_row_gap(&mut self, grid: ViewId, index: usize, gap: f64) -> Result<(), LayoutError> {
        let spec = self.grid_spec_mut(grid)?;
        let len = spec.row_gaps.len();
        if index >= len {
            return Err(LayoutError::GapIndexOutOfRange {
                axis: Axis::Vertical,
                index,
                len,
            });
        }
        spec.row_gaps[index] = gap;
        self.update_size(grid)?;
        self.grid_layout_views(grid)
    }

    /// Set the gap right of column `index`. Out of range is a hard error.
    pub fn set_col_gap(&mut self, grid: ViewId, index: usize, gap: f64) -> Result<(), LayoutError> {
        let spec = self.grid_spec_mut(grid)?;
        let len = spec.col_gaps.len();
        if index >= len {
            return Err(LayoutError::GapIndexOutOfRange {
                axis: Axis::Horizontal,
                index,
                len,
            });
        }
        spec.col_gaps[index] = gap;
        self.update_size(grid)?;
        self.grid_layout_views(grid)
    }

    /// Set the default alignment of one row.
    pub fn set_row_align(
        &mut self,
        grid: ViewId,
        index: usize,
        align: Align,
    ) -> Result<(), LayoutError> {
        let spec = self.grid_spec_mut(grid)?;
        let len = spec.row_aligns.len();
        if index >= len {
            return Err(LayoutError::TrackIndexOutOfRange {
                axis: Axis::Vertical,
                index,
                len,
            });
        }
        spec.row_aligns[index] = align;
        self.grid_layout_views(grid)
    }

    /// Set the default alignment of one column.
    pub fn set_col_align(
        &mut self,
        grid: ViewId,
        index: usize,
        align: Align,
    ) -> Result<(), LayoutError> {
        let spec = self.grid_spec_mut(grid)?;
        let len = spec.col_aligns.len();
        if index >= len {
            return Err(LayoutError::TrackIndexOutOfRange {
                axis: Axis::Horizontal,
                index,
                len,
            });
        }
        spec.col_aligns[index] = align;
        self.grid_layout_views(grid)
    }

    /// Switch auto-sizing per axis.
    pub fn set_grid_auto_size(
        &mut self,
        grid: ViewId,
        auto_width: bool,
        auto_height: bool,
    ) -> Result<(), LayoutError> {
        let spec = self.grid_spec_mut(grid)?;
        spec.auto_width = auto_width;
        spec.auto_height = auto_height;
        self.update_size(grid)?;
        self.grid_layout_views(grid)
    }

    /// Append a child, claiming the requested territory or the first empty
    /// cell in row-major order.
    pub fn grid_append(
        &mut self,
        grid: ViewId,
        child: ViewId,
        request: Option<TerritoryRequest>,
    ) -> Result<(), LayoutError> {
        let index = self.node(grid)?.children.len();
        self.grid_insert(grid, index, child, request)
    }

    /// Prepend a child (claiming works exactly as in
    /// [`grid_append`](Self::grid_append); only child order differs).
    pub fn grid_prepend(
        &mut self,
        grid: ViewId,
        child: ViewId,
        request: Option<TerritoryRequest>,
    ) -> Result<(), LayoutError> {
        self.grid_insert(grid, 0, child, request)
    }

    /// Insert a child at a child-list index with an optional territory.
    pub fn grid_insert(
        &mut self,
        grid: ViewId,
        index: usize,
        child: ViewId,
        request: Option<TerritoryRequest>,
    ) -> Result<(), LayoutError> {
        // Validate everything before touching the matrix so a failed claim
        // leaves the grid untouched.
        if let Some(existing) = self.node(child)?.parent {
            return Err(LayoutError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        let territory = self.resolve_territory(grid, request)?;
        {
            let spec = self.grid_spec(grid)?;
            for row in territory.y..(territory.y + territory.height).min(spec.num_rows()) {
                for col in territory.x..territory.x + territory.width {
                    if let Some(occupant) = spec.cells[row][col] {
                        return Err(LayoutError::TerritoryOverlap { occupant, col, row });
                    }
                }
            }
        }

        self.attach_child(grid, index, child)?;
        {
            let spec = self.grid_spec_mut(grid)?;
            while spec.num_rows() < territory.y + territory.height {
                spec.push_empty_row();
            }
            for row in territory.y..territory.y + territory.height {
                for col in territory.x..territory.x + territory.width {
                    spec.cells[row][col] = Some(child);
                }
            }
            spec.territories.insert(child, territory);
        }

        self.grid_adjust_rules(grid, child)?;
        self.update_size(grid)?;
        self.grid_layout_views(grid)
    }

    fn resolve_territory(
        &self,
        grid: ViewId,
        request: Option<TerritoryRequest>,
    ) -> Result<Territory, LayoutError> {
        let spec = self.grid_spec(grid)?;
        let num_cols = spec.num_cols;
        let num_rows = spec.num_rows();
        let Some(request) = request else {
            // No explicit claim: first empty cell, or a fresh row below.
            let (x, y) = spec.first_empty_cell().unwrap_or((0, num_rows));
            return Ok(Territory {
                x,
                y,
                width: 1,
                height: 1,
                row_align: None,
                col_align: None,
            });
        };

        let width = request.width.max(1);
        let height = request.height.max(1);
        let x = if request.x < 0 {
            request.x + num_cols as i64
        } else {
            request.x
        };
        let y = if request.y < 0 {
            request.y + num_rows as i64
        } else {
            request.y
        };
        if x < 0 || y < 0 || x as usize + width > num_cols {
            return Err(LayoutError::TerritoryOutOfBounds {
                col: request.x,
                row: request.y,
                num_cols,
                num_rows,
            });
        }
        Ok(Territory {
            x: x as usize,
            y: y as usize,
            width,
            height,
            row_align: request.row_align,
            col_align: request.col_align,
        })
    }

    /// Release a child's cells and territory and contract the matrix.
    /// Called by `detach` before the child link is removed.
    pub(crate) fn grid_clear_child(
        &mut self,
        grid: ViewId,
        child: ViewId,
    ) -> Result<(), LayoutError> {
        let spec = self.grid_spec_mut(grid)?;
        let Some(territory) = spec.territories.remove(&child) else {
            return Ok(());
        };
        let rows = spec.num_rows();
        for row in territory.y..(territory.y + territory.height).min(rows) {
            for col in territory.x..territory.x + territory.width {
                if spec.cells[row][col] == Some(child) {
                    spec.cells[row][col] = None;
                }
            }
        }
        spec.contract();
        Ok(())
    }

    /// Content size: trailing rule plus gaps per axis. A fixed-size axis
    /// keeps the grid's current extent instead.
    pub(crate) fn grid_compute_size(&self, grid: ViewId) -> Result<Size, LayoutError> {
        let node = self.node(grid)?;
        let LayoutKind::Grid(spec) = &node.layout else {
            return Err(LayoutError::NotAGrid { view: grid });
        };
        let width = if spec.auto_width || node.frame.width() < 0.0 {
            spec.content_extent(Axis::Horizontal)
        } else {
            node.frame.width()
        };
        let height = if spec.auto_height || node.frame.height() < 0.0 {
            spec.content_extent(Axis::Vertical)
        } else {
            node.frame.height()
        };
        Ok(Size::new(width, height))
    }

    /// Snap every child into its territory's physical cell box.
    ///
    /// Runs after any rule change even when no view changed size: slack in
    /// unfilled cells still moves later rows/columns.
    pub(crate) fn grid_layout_views(&mut self, grid: ViewId) -> Result<(), LayoutError> {
        let children = self.node(grid)?.children.clone();
        let (grid_x, grid_y) = {
            let frame = &self.node(grid)?.frame;
            (frame.x(), frame.y())
        };

        let mut moves: Vec<(ViewId, f64, f64)> = Vec::with_capacity(children.len());
        {
            let spec = self.grid_spec(grid)?;
            for &child in &children {
                let Some(territory) = spec.territories.get(&child) else {
                    continue;
                };
                let frame = &self.node(child)?.frame;
                let cell_x = grid_x + spec.track_offset(Axis::Horizontal, territory.x);
                let cell_y = grid_y + spec.track_offset(Axis::Vertical, territory.y);
                let cell_w = spec.span_extent(Axis::Horizontal, territory.x, territory.width, true);
                let cell_h = spec.span_extent(Axis::Vertical, territory.y, territory.height, true);

                let col_align = territory
                    .col_align
                    .unwrap_or(spec.col_aligns[territory.x]);
                let row_align = territory
                    .row_align
                    .unwrap_or(spec.row_aligns[territory.y]);

                let padded_w = frame.padded_width();
                let padded_h = frame.padded_height();
                let snap = |align: Align, cell: f64, padded: f64| match align {
                    Align::Start => 0.0,
                    Align::Center => (cell - padded) / 2.0,
                    Align::End => cell - padded,
                };
                let x = cell_x + snap(col_align, cell_w, padded_w) + frame.padding().left;
                let y = cell_y + snap(row_align, cell_h, padded_h) + frame.padding().top;
                moves.push((child, x, y));
            }
        }
        for (child, x, y) in moves {
            self.node_mut(child)?.frame.set_position(x, y);
        }
        Ok(())
    }

    /// A grid child changed size: re-fit rules, recompute own size, reflow.
    pub(crate) fn grid_child_did_resize(
        &mut self,
        grid: ViewId,
        child: ViewId,
    ) -> Result<(), LayoutError> {
        self.grid_adjust_rules(grid, child)?;
        self.update_size(grid)?;
        self.grid_layout_views(grid)
    }

    /// Fit the rules to one child's padded size, per axis:
    ///
    /// 1. `diff = padded size - spanned track size (gaps excluded)`; done
    ///    when `diff <= 0`.
    /// 2. Grow the spanned tracks by `diff` (trailing rules shift outward).
    /// 3. Auto axes stop here; they grow unconditionally.
    /// 4. On a fixed axis the overflow beyond the grid's extent is clawed
    ///    back from the *other* tracks in proportion to their
    ///    shrinkability.
    /// 5. Whatever no track can give up force-shrinks the child itself -
    ///    the lossy last resort.
    /// 6. Flexible occupants of shrunk tracks are resized afterwards.
    fn grid_adjust_rules(&mut self, grid: ViewId, child: ViewId) -> Result<(), LayoutError> {
        let mut queued = QueuedResizes::new();
        for axis in [Axis::Horizontal, Axis::Vertical] {
            self.grid_adjust_axis(grid, child, axis, &mut queued)?;
        }
        self.apply_queued_resizes(queued)
    }

    fn grid_adjust_axis(
        &mut self,
        grid: ViewId,
        child: ViewId,
        axis: Axis,
        queued: &mut QueuedResizes,
    ) -> Result<(), LayoutError> {
        let Some(territory) = self.grid_spec(grid)?.territories.get(&child).copied() else {
            return Ok(());
        };
        let (start, len) = GridSpec::territory_span(&territory, axis);
        let padded = self.node(child)?.frame.padded_extent(axis);
        let span = self.grid_spec(grid)?.span_extent(axis, start, len, false);
        let diff = padded - span;
        if diff <= EPS {
            return Ok(());
        }

        // Grow the spanned tracks: the trailing rule and every rule after
        // it shift outward.
        {
            let rules = self.grid_spec_mut(grid)?.rules_mut(axis);
            for rule in rules.iter_mut().skip(start + len) {
                *rule += diff;
            }
        }

        let container = self.node(grid)?.frame.extent(axis);
        if self.grid_spec(grid)?.is_auto(axis) || container < 0.0 {
            return Ok(());
        }

        let overflow = self.grid_spec(grid)?.content_extent(axis) - container;
        if overflow <= EPS {
            return Ok(());
        }

        let plan = self.axis_shrink_plan(grid, axis, Some((start, len)), overflow)?;
        let deltas: Vec<f64> = plan.shares.iter().map(|share| -share).collect();
        self.apply_track_deltas(grid, axis, &deltas)?;
        let changed: Vec<bool> = plan.shares.iter().map(|&share| share > EPS).collect();
        self.collect_flex_resizes(grid, axis, &changed, Some(child), queued)?;

        let shortfall = overflow - plan.total;
        if shortfall > EPS {
            plotkit_core::debug!(
                view = child.get(),
                axis = axis.label(),
                shortfall,
                "content exceeds shrink capacity; force-shrinking view"
            );
            // Pull the just-grown span back in by the shortfall and shrink
            // the child to match, without notifying the parent ourselves.
            {
                let rules = self.grid_spec_mut(grid)?.rules_mut(axis);
                for rule in rules.iter_mut().skip(start + len) {
                    *rule -= shortfall;
                }
            }
            let frame = self.node(child)?.frame.clone();
            let shrunk = (frame.extent(axis).max(0.0) - shortfall).max(0.0);
            match axis {
                Axis::Horizontal => {
                    self.set_size_silent(child, shrunk, frame.height().max(0.0))?;
                }
                Axis::Vertical => {
                    self.set_size_silent(child, frame.width().max(0.0), shrunk)?;
                }
            }
        }
        Ok(())
    }

    /// Apportion `need` across tracks in proportion to each one's
    /// shrinkability, excluding the given span.
    fn axis_shrink_plan(
        &self,
        grid: ViewId,
        axis: Axis,
        exclude: Option<(usize, usize)>,
        need: f64,
    ) -> Result<ShrinkPlan, LayoutError> {
        let spec = self.grid_spec(grid)?;
        let count = spec.track_count(axis);
        let mut caps = vec![0.0_f64; count];
        for (index, cap) in caps.iter_mut().enumerate() {
            if let Some((start, len)) = exclude
                && index >= start
                && index < start + len
            {
                continue;
            }
            *cap = self.track_shrinkability(spec, axis, index)?;
        }
        let avail: f64 = caps.iter().sum();
        let total = need.min(avail);
        let shares = if avail > EPS {
            caps.iter().map(|cap| cap * total / avail).collect()
        } else {
            vec![0.0; count]
        };
        Ok(ShrinkPlan { shares, total })
    }

    /// How much a track can contract without violating an occupant:
    ///
    /// - zero-size tracks cannot shrink;
    /// - a track no territory boundary touches can vanish entirely;
    /// - otherwise the minimum over boundary-touching views of the full
    ///   track size (flexible view) or the view's unused span space.
    ///
    /// The minimum over touching views is a heuristic, not an exact solve;
    /// multi-span views are approximated deliberately to keep results
    /// stable for hosts.
    fn track_shrinkability(
        &self,
        spec: &GridSpec,
        axis: Axis,
        index: usize,
    ) -> Result<f64, LayoutError> {
        let size = spec.track_size(axis, index);
        if size <= EPS {
            return Ok(0.0);
        }
        let touching = spec.touching_track(axis, index);
        if touching.is_empty() {
            return Ok(size);
        }
        let mut cap = f64::INFINITY;
        for (view, territory) in touching {
            let frame = &self.node(view)?.frame;
            let view_cap = if frame.can_flex(axis) {
                size
            } else {
                let (start, len) = GridSpec::territory_span(&territory, axis);
                let unused =
                    (spec.span_extent(axis, start, len, false) - frame.padded_extent(axis)).max(0.0);
                size.min(unused)
            };
            cap = cap.min(view_cap);
        }
        Ok(cap)
    }

    /// Apply per-track size deltas, rebuilding the cumulative rule array.
    /// Track sizes floor at zero, so rules stay non-decreasing.
    fn apply_track_deltas(
        &mut self,
        grid: ViewId,
        axis: Axis,
        deltas: &[f64],
    ) -> Result<(), LayoutError> {
        let spec = self.grid_spec_mut(grid)?;
        let count = spec.track_count(axis);
        let sizes: Vec<f64> = (0..count).map(|i| spec.track_size(axis, i)).collect();
        let rules = spec.rules_mut(axis);
        let mut cursor = rules[0];
        for index in 0..count {
            cursor += (sizes[index] + deltas[index]).max(0.0);
            rules[index + 1] = cursor;
        }
        Ok(())
    }

    /// Queue flexible occupants of changed tracks for resizing to their
    /// span's new physical size.
    fn collect_flex_resizes(
        &self,
        grid: ViewId,
        axis: Axis,
        changed: &[bool],
        skip: Option<ViewId>,
        queued: &mut QueuedResizes,
    ) -> Result<(), LayoutError> {
        let spec = self.grid_spec(grid)?;
        for (&view, territory) in &spec.territories {
            if Some(view) == skip {
                continue;
            }
            let (start, len) = GridSpec::territory_span(territory, axis);
            if !changed[start..start + len].iter().any(|&c| c) {
                continue;
            }
            let frame = &self.node(view)?.frame;
            if !frame.can_flex(axis) {
                continue;
            }
            let extent =
                (spec.span_extent(axis, start, len, false) - frame.padding_sum(axis)).max(0.0);
            let entry = queued.entry(view).or_insert((None, None));
            match axis {
                Axis::Horizontal => entry.0 = Some(extent),
                Axis::Vertical => entry.1 = Some(extent),
            }
        }
        Ok(())
    }

    /// Deferred resizes run after rule adjustment settles; bubbling views
    /// may re-enter the grid, bounded by the tree's depth guard.
    fn apply_queued_resizes(&mut self, queued: QueuedResizes) -> Result<(), LayoutError> {
        for (view, (width, height)) in queued {
            let frame = self.node(view)?.frame.clone();
            let width = width.unwrap_or(frame.width().max(0.0));
            let height = height.unwrap_or(frame.height().max(0.0));
            self.set_size(view, width, height)?;
        }
        Ok(())
    }

    /// Redistribute rows/columns for a new container size.
    ///
    /// Shrinking apportions the content overflow over *all* tracks.
    /// Growing divides the delta equally among tracks whose every occupant
    /// flexes on that axis; non-growable tracks are untouched.
    pub(crate) fn grid_apply_resize(
        &mut self,
        grid: ViewId,
        width: f64,
        height: f64,
    ) -> Result<(), LayoutError> {
        let mut queued = QueuedResizes::new();
        for (axis, new_extent) in [(Axis::Horizontal, width), (Axis::Vertical, height)] {
            let old_extent = {
                let current = self.node(grid)?.frame.extent(axis);
                if current >= 0.0 {
                    current
                } else {
                    self.grid_spec(grid)?.content_extent(axis)
                }
            };
            let delta = new_extent - old_extent;
            if delta < -EPS {
                // Only actual content overflow forces shrinking; slack
                // absorbs the rest.
                let need = self.grid_spec(grid)?.content_extent(axis) - new_extent;
                if need > EPS {
                    let plan = self.axis_shrink_plan(grid, axis, None, need)?;
                    let deltas: Vec<f64> = plan.shares.iter().map(|share| -share).collect();
                    self.apply_track_deltas(grid, axis, &deltas)?;
                    let changed: Vec<bool> =
                        plan.shares.iter().map(|&share| share > EPS).collect();
                    self.collect_flex_resizes(grid, axis, &changed, None, &mut queued)?;
                }
            } else if delta > EPS {
                let growable = self.growable_tracks(grid, axis)?;
                let count = growable.iter().filter(|&&can| can).count();
                if count > 0 {
                    let share = delta / count as f64;
                    let deltas: Vec<f64> = growable
                        .iter()
                        .map(|&can| if can { share } else { 0.0 })
                        .collect();
                    self.apply_track_deltas(grid, axis, &deltas)?;
                    self.collect_flex_resizes(grid, axis, &growable, None, &mut queued)?;
                }
            }
        }
        self.set_size_silent(grid, width, height)?;
        self.apply_queued_resizes(queued)?;
        // Re-snap even when nothing changed size: slack shifts positions.
        self.grid_layout_views(grid)
    }

    /// A track grows only if every occupant permits flex on that axis.
    /// Unoccupied tracks are vacuously growable.
    fn growable_tracks(&self, grid: ViewId, axis: Axis) -> Result<Vec<bool>, LayoutError> {
        let spec = self.grid_spec(grid)?;
        let mut growable = vec![true; spec.track_count(axis)];
        for (&view, territory) in &spec.territories {
            if self.node(view)?.frame.can_flex(axis) {
                continue;
            }
            let (start, len) = GridSpec::territory_span(territory, axis);
            for flag in growable.iter_mut().skip(start).take(len) {
                *flag = false;
            }
        }
        Ok(growable)
    }

    /// Add an empty zero-height row above row 0.
    pub fn add_row_top(&mut self, grid: ViewId) -> Result<(), LayoutError> {
        {
            let spec = self.grid_spec_mut(grid)?;
            spec.cells.insert(0, vec![None; spec.num_cols]);
            let first = spec.h_rules[0];
            spec.h_rules.insert(1, first);
            spec.row_gaps.insert(0, spec.default_row_gap);
            spec.row_aligns.insert(0, spec.default_row_align);
            for territory in spec.territories.values_mut() {
                territory.y += 1;
            }
        }
        self.update_size(grid)?;
        self.grid_layout_views(grid)
    }

    /// Add an empty zero-height row below the last row.
    pub fn add_row_bottom(&mut self, grid: ViewId) -> Result<(), LayoutError> {
        self.grid_spec_mut(grid)?.push_empty_row();
        self.update_size(grid)?;
        self.grid_layout_views(grid)
    }

    /// Add an empty zero-width column left of column 0.
    pub fn add_column_left(&mut self, grid: ViewId) -> Result<(), LayoutError> {
        {
            let spec = self.grid_spec_mut(grid)?;
            spec.num_cols += 1;
            for row in &mut spec.cells {
                row.insert(0, None);
            }
            let first = spec.v_rules[0];
            spec.v_rules.insert(1, first);
            spec.col_gaps.insert(0, spec.default_col_gap);
            spec.col_aligns.insert(0, spec.default_col_align);
            for territory in spec.territories.values_mut() {
                territory.x += 1;
            }
        }
        self.update_size(grid)?;
        self.grid_layout_views(grid)
    }

    /// Add an empty zero-width column right of the last column.
    pub fn add_column_right(&mut self, grid: ViewId) -> Result<(), LayoutError> {
        {
            let spec = self.grid_spec_mut(grid)?;
            spec.num_cols += 1;
            for row in &mut spec.cells {
                row.push(None);
            }
            let last = spec.v_rules.last().copied().unwrap_or(0.0);
            spec.v_rules.push(last);
            spec.col_gaps.push(spec.default_col_gap);
            spec.col_aligns.push(spec.default_col_align);
        }
        self.update_size(grid)?;
        self.grid_layout_views(grid)
    }

    /// Split row `at`, inserting a new empty row below it.
    ///
    /// The new boundary sits at the maximum trailing edge of views whose
    /// span ends at the old boundary (views that already reach it stay
    /// undisturbed), or at the following rule's offset if none touch it.
    /// Later territories shift down; spanning territories widen.
    pub fn split_row_top(
        &mut self,
        grid: ViewId,
        at: usize,
        align: Option<Align>,
    ) -> Result<(), LayoutError> {
        let new_rule = {
            let spec = self.grid_spec(grid)?;
            let rows = spec.num_rows();
            if at >= rows {
                return Err(LayoutError::TrackIndexOutOfRange {
                    axis: Axis::Vertical,
                    index: at,
                    len: rows,
                });
            }
            let lo = spec.h_rules[at];
            let hi = spec.h_rules[at + 1];
            let mut edge: Option<f64> = None;
            for (&view, territory) in &spec.territories {
                if territory.y + territory.height == at + 1 {
                    let trailing =
                        spec.h_rules[territory.y] + self.node(view)?.frame.padded_height();
                    edge = Some(edge.map_or(trailing, |current: f64| current.max(trailing)));
                }
            }
            edge.unwrap_or(hi).clamp(lo, hi)
        };
        {
            let spec = self.grid_spec_mut(grid)?;
            spec.cells.insert(at + 1, vec![None; spec.num_cols]);
            spec.h_rules.insert(at + 1, new_rule);
            spec.row_gaps.insert(at, 0.0);
            let align = align.unwrap_or(spec.default_row_align);
            spec.row_aligns.insert(at + 1, align);

            let mut widened: Vec<(ViewId, usize, usize)> = Vec::new();
            for (&view, territory) in spec.territories.iter_mut() {
                if territory.y >= at + 1 {
                    territory.y += 1;
                } else if territory.y + territory.height > at + 1 {
                    territory.height += 1;
                    widened.push((view, territory.x, territory.width));
                }
            }
            // Spanning territories now cover the inserted row's cells too.
            for (view, x, width) in widened {
                for col in x..x + width {
                    spec.cells[at + 1][col] = Some(view);
                }
            }
        }
        self.update_size(grid)?;
        self.grid_layout_views(grid)
    }

    /// Split column `at`, inserting a new empty column right of it.
    ///
    /// Mirrors [`split_row_top`](Self::split_row_top) by transposition; the
    /// gap between the split halves is explicit.
    pub fn split_column_right(
        &mut self,
        grid: ViewId,
        at: usize,
        gap: f64,
        align: Option<Align>,
    ) -> Result<(), LayoutError> {
        let new_rule = {
            let spec = self.grid_spec(grid)?;
            if at >= spec.num_cols {
                return Err(LayoutError::TrackIndexOutOfRange {
                    axis: Axis::Horizontal,
                    index: at,
                    len: spec.num_cols,
                });
            }
            let lo = spec.v_rules[at];
            let hi = spec.v_rules[at + 1];
            let mut edge: Option<f64> = None;
            for (&view, territory) in &spec.territories {
                if territory.x + territory.width == at + 1 {
                    let trailing =
                        spec.v_rules[territory.x] + self.node(view)?.frame.padded_width();
                    edge = Some(edge.map_or(trailing, |current: f64| current.max(trailing)));
                }
            }
            edge.unwrap_or(hi).clamp(lo, hi)
        };
        {
            let spec = self.grid_spec_mut(grid)?;
            spec.num_cols += 1;
            for row in &mut spec.cells {
                row.insert(at + 1, None);
            }
            spec.v_rules.insert(at + 1, new_rule);
            spec.col_gaps.insert(at, gap);
            let align = align.unwrap_or(spec.default_col_align);
            spec.col_aligns.insert(at + 1, align);

            let mut widened: Vec<(ViewId, usize, usize)> = Vec::new();
            for (&view, territory) in spec.territories.iter_mut() {
                if territory.x >= at + 1 {
                    territory.x += 1;
                } else if territory.x + territory.width > at + 1 {
                    territory.width += 1;
                    widened.push((view, territory.y, territory.height));
                }
            }
            for (view, y, height) in widened {
                for row in y..y + height {
                    spec.cells[row][at + 1] = Some(view);
                }
            }
        }
        self.update_size(grid)?;
        self.grid_layout_views(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Frame;

    fn sized_view(tree: &mut LayoutTree, w: f64, h: f64) -> ViewId {
        let v = tree.create_view(Frame::new()).unwrap();
        tree.set_size(v, w, h).unwrap();
        v
    }

    #[test]
    fn appends_claim_cells_in_row_major_order() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 2, GridOptions::default())
            .unwrap();
        let a = sized_view(&mut tree, 10.0, 10.0);
        let b = sized_view(&mut tree, 10.0, 10.0);
        let c = sized_view(&mut tree, 10.0, 10.0);
        for v in [a, b, c] {
            tree.grid_append(grid, v, None).unwrap();
        }

        assert_eq!(tree.grid_cell(grid, 0, 0).unwrap(), Some(a));
        assert_eq!(tree.grid_cell(grid, 1, 0).unwrap(), Some(b));
        // Third child grew the matrix by a row.
        assert_eq!(tree.grid_num_rows(grid).unwrap(), 2);
        assert_eq!(tree.grid_cell(grid, 0, 1).unwrap(), Some(c));
    }

    #[test]
    fn overlapping_claim_is_rejected_and_leaves_grid_intact() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 2, GridOptions::default())
            .unwrap();
        let a = sized_view(&mut tree, 10.0, 10.0);
        let b = sized_view(&mut tree, 10.0, 10.0);
        tree.grid_append(grid, a, Some(TerritoryRequest::at(0, 0).span(2, 1)))
            .unwrap();

        let err = tree
            .grid_append(grid, b, Some(TerritoryRequest::at(1, 0)))
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::TerritoryOverlap {
                occupant: a,
                col: 1,
                row: 0
            }
        );
        // The failed claim attached nothing.
        assert_eq!(tree.parent(b).unwrap(), None);
        assert_eq!(tree.children(grid).unwrap(), &[a]);
    }

    #[test]
    fn negative_indices_resolve_from_the_end() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 3, GridOptions::default())
            .unwrap();
        let v = sized_view(&mut tree, 10.0, 10.0);
        tree.grid_append(grid, v, Some(TerritoryRequest::at(-1, 0)))
            .unwrap();
        let territory = tree.grid_territory(grid, v).unwrap().unwrap();
        assert_eq!((territory.x, territory.y), (2, 0));
    }

    #[test]
    fn out_of_bounds_request_is_an_error() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 2, GridOptions::default())
            .unwrap();
        let v = sized_view(&mut tree, 10.0, 10.0);
        let err = tree
            .grid_append(grid, v, Some(TerritoryRequest::at(1, 0).span(2, 1)))
            .unwrap_err();
        assert!(matches!(err, LayoutError::TerritoryOutOfBounds { .. }));
    }

    #[test]
    fn request_below_matrix_appends_rows() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 1, GridOptions::default())
            .unwrap();
        let v = sized_view(&mut tree, 10.0, 10.0);
        tree.grid_append(grid, v, Some(TerritoryRequest::at(0, 3)))
            .unwrap();
        assert_eq!(tree.grid_num_rows(grid).unwrap(), 4);
        assert_eq!(tree.grid_cell(grid, 0, 3).unwrap(), Some(v));
    }

    #[test]
    fn auto_grid_rules_track_content() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 2, GridOptions::default().gaps(0.0, 4.0))
            .unwrap();
        let a = sized_view(&mut tree, 30.0, 10.0);
        let b = sized_view(&mut tree, 50.0, 20.0);
        tree.grid_append(grid, a, None).unwrap();
        tree.grid_append(grid, b, None).unwrap();

        assert_eq!(tree.grid_v_rules(grid).unwrap(), &[0.0, 30.0, 80.0]);
        assert_eq!(tree.grid_h_rules(grid).unwrap(), &[0.0, 20.0]);
        // Size conservation: trailing rule plus gaps.
        assert_eq!(tree.compute_size(grid).unwrap(), Size::new(84.0, 20.0));
        assert_eq!(tree.frame(grid).unwrap().width(), 84.0);
    }

    #[test]
    fn padded_child_claims_padded_extent() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 1, GridOptions::default())
            .unwrap();
        let v = tree.create_view(Frame::new().with_padding(5.0)).unwrap();
        tree.set_size(v, 20.0, 10.0).unwrap();
        tree.grid_append(grid, v, None).unwrap();
        assert_eq!(tree.grid_v_rules(grid).unwrap(), &[0.0, 30.0]);
        assert_eq!(tree.grid_h_rules(grid).unwrap(), &[0.0, 20.0]);
    }

    #[test]
    fn gap_setters_respect_bounds() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 2, GridOptions::default())
            .unwrap();
        tree.set_col_gap(grid, 0, 6.0).unwrap();
        assert_eq!(tree.grid_col_gaps(grid).unwrap(), &[6.0]);

        assert_eq!(
            tree.set_col_gap(grid, 1, 6.0).unwrap_err(),
            LayoutError::GapIndexOutOfRange {
                axis: Axis::Horizontal,
                index: 1,
                len: 1
            }
        );
        assert_eq!(
            tree.set_row_gap(grid, 0, 6.0).unwrap_err(),
            LayoutError::GapIndexOutOfRange {
                axis: Axis::Vertical,
                index: 0,
                len: 0
            }
        );
    }

    #[test]
    fn children_center_in_their_cells_by_default() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 1, GridOptions::default())
            .unwrap();
        let wide = sized_view(&mut tree, 40.0, 10.0);
        let narrow = sized_view(&mut tree, 20.0, 10.0);
        tree.grid_append(grid, wide, None).unwrap();
        tree.grid_append(grid, narrow, None).unwrap();

        // Column is 40 wide; the narrow view centers at (40-20)/2.
        assert_eq!(tree.frame(wide).unwrap().x(), 0.0);
        assert_eq!(tree.frame(narrow).unwrap().x(), 10.0);
    }

    #[test]
    fn territory_align_overrides_column_default() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 1, GridOptions::default())
            .unwrap();
        let wide = sized_view(&mut tree, 40.0, 10.0);
        let narrow = tree.create_view(Frame::new()).unwrap();
        tree.set_size(narrow, 20.0, 10.0).unwrap();
        tree.grid_append(grid, wide, None).unwrap();
        tree.grid_append(
            grid,
            narrow,
            Some(TerritoryRequest::at(0, 1).col_align(Align::End)),
        )
        .unwrap();
        assert_eq!(tree.frame(narrow).unwrap().x(), 20.0);

        tree.set_col_align(grid, 0, Align::Start).unwrap();
        // The override still wins over the new column default.
        assert_eq!(tree.frame(narrow).unwrap().x(), 20.0);
        assert_eq!(tree.frame(wide).unwrap().x(), 0.0);
    }

    #[test]
    fn removing_sole_occupant_restores_rules() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 2, GridOptions::default())
            .unwrap();
        let a = sized_view(&mut tree, 30.0, 10.0);
        let b = sized_view(&mut tree, 20.0, 15.0);
        tree.grid_append(grid, a, None).unwrap();
        let v_before = tree.grid_v_rules(grid).unwrap().to_vec();
        let h_before = tree.grid_h_rules(grid).unwrap().to_vec();
        let rows_before = tree.grid_num_rows(grid).unwrap();

        tree.grid_append(grid, b, Some(TerritoryRequest::at(1, 1)))
            .unwrap();
        tree.detach(b).unwrap();

        assert_eq!(tree.grid_v_rules(grid).unwrap(), v_before.as_slice());
        assert_eq!(tree.grid_h_rules(grid).unwrap(), h_before.as_slice());
        assert_eq!(tree.grid_num_rows(grid).unwrap(), rows_before);
        assert_eq!(tree.grid_territory(grid, b).unwrap(), None);
    }

    #[test]
    fn empty_interior_column_collapses_on_removal() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 3, GridOptions::default().gaps(0.0, 5.0))
            .unwrap();
        let a = sized_view(&mut tree, 10.0, 10.0);
        let b = sized_view(&mut tree, 10.0, 10.0);
        let c = sized_view(&mut tree, 10.0, 10.0);
        tree.grid_append(grid, a, Some(TerritoryRequest::at(0, 0)))
            .unwrap();
        tree.grid_append(grid, b, Some(TerritoryRequest::at(1, 0)))
            .unwrap();
        tree.grid_append(grid, c, Some(TerritoryRequest::at(2, 0)))
            .unwrap();

        tree.detach(b).unwrap();
        // Middle column's span collapses to zero and both its gaps clear.
        assert_eq!(tree.grid_v_rules(grid).unwrap(), &[0.0, 10.0, 10.0, 20.0]);
        assert_eq!(tree.grid_col_gaps(grid).unwrap(), &[0.0, 0.0]);
        assert_eq!(tree.grid_num_cols(grid).unwrap(), 3);
    }

    #[test]
    fn add_row_and_column_extend_track_arrays() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 1, GridOptions::default())
            .unwrap();
        let v = sized_view(&mut tree, 10.0, 10.0);
        tree.grid_append(grid, v, None).unwrap();

        tree.add_row_top(grid).unwrap();
        tree.add_column_left(grid).unwrap();
        // The occupant shifted with its cells.
        let territory = tree.grid_territory(grid, v).unwrap().unwrap();
        assert_eq!((territory.x, territory.y), (1, 1));
        assert_eq!(tree.grid_cell(grid, 1, 1).unwrap(), Some(v));
        // New tracks are zero-sized.
        assert_eq!(tree.grid_h_rules(grid).unwrap(), &[0.0, 0.0, 10.0]);
        assert_eq!(tree.grid_v_rules(grid).unwrap(), &[0.0, 0.0, 10.0]);

        tree.add_row_bottom(grid).unwrap();
        tree.add_column_right(grid).unwrap();
        assert_eq!(tree.grid_num_rows(grid).unwrap(), 3);
        assert_eq!(tree.grid_num_cols(grid).unwrap(), 3);
        assert_eq!(tree.grid_h_rules(grid).unwrap(), &[0.0, 0.0, 10.0, 10.0]);
    }

    #[test]
    fn split_row_keeps_spanning_territories_consistent() {
        let mut tree = LayoutTree::new();
        let grid = tree
            .create_grid(Frame::new(), 2, GridOptions::default())
            .unwrap();
        let tall = sized_view(&mut tree, 10.0, 40.0);
        let short = sized_view(&mut tree, 10.0, 10.0);
        tree.grid_append(grid, tall, Some(TerritoryRequest::at(0, 0).span(1, 2)))
            .unwrap();
        tree.grid_append(grid, short, Some(TerritoryRequest::at(1, 0)))
            .unwrap();

        tree.split_row_top(grid, 0, None).unwrap();
        // The spanning view widened across the inserted row.
        let territory = tree.grid_territory(grid, tall).unwrap().unwrap();
        assert_eq!(territory.height, 3);
        assert_eq!(tree.grid_cell(grid, 0, 1).unwrap(), Some(tall));
        // The single-row view ending at the split boundary stays put.
        let territory = tree.grid_territory(grid, short).unwrap().unwrap();
        assert_eq!((territory.y, territory.height), (0, 1));
    }

    #[test]
    fn grid_accessors_reject_other_kinds() {
        let mut tree = LayoutTree::new();
        let leaf = tree.create_view(Frame::new()).unwrap();
        assert_eq!(
            tree.grid_num_rows(leaf).unwrap_err(),
            LayoutError::NotAGrid { view: leaf }
        );
    }
}
