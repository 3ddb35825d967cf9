//! View arena: parent/child bookkeeping and resize notification flow.
//!
//! Views are addressed by opaque [`ViewId`] handles; the tree owns every
//! node. There are no maintained sibling pointers: neighbors are index
//! lookups in the parent's ordered child list.
//!
//! All mutation is synchronous and completes before the caller regains
//! control. Size changes applied by the engine are recorded as
//! [`ResizeEvent`]s the host drains with
//! [`take_resize_events`](LayoutTree::take_resize_events).

use std::collections::BTreeMap;

use plotkit_core::geometry::Size;

use crate::error::LayoutError;
use crate::flex::FlexSpec;
use crate::grid::{GridOptions, GridSpec};
use crate::view::Frame;

/// Stable identifier for views.
///
/// `0` is reserved/invalid so ids are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u64);

impl ViewId {
    /// Lowest valid view id.
    pub const MIN: Self = Self(1);

    /// Create a new view id, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, LayoutError> {
        if raw == 0 {
            return Err(LayoutError::ZeroViewId);
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next id, or an error on overflow.
    pub fn checked_next(self) -> Result<Self, LayoutError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(LayoutError::ViewIdOverflow { current: self });
        };
        Self::new(next)
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::MIN
    }
}

/// Deterministic allocator for view ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewIdAllocator {
    next: ViewId,
}

impl ViewIdAllocator {
    /// Peek at the next id without consuming.
    #[must_use]
    pub const fn peek(&self) -> ViewId {
        self.next
    }

    /// Allocate the next id and advance.
    pub fn allocate(&mut self) -> Result<ViewId, LayoutError> {
        let current = self.next;
        self.next = self.next.checked_next()?;
        Ok(current)
    }
}

impl Default for ViewIdAllocator {
    fn default() -> Self {
        Self { next: ViewId::MIN }
    }
}

/// A size change applied to a view by the engine or the host.
///
/// `old` carries the raw previous dimensions, so the first sizing of a view
/// reports [`Frame::UNSET`] values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEvent {
    pub view: ViewId,
    pub old: Size,
    pub new: Size,
}

/// Layout policy attached to a view.
#[derive(Debug, Clone)]
pub(crate) enum LayoutKind {
    /// No policy: sized by the host, positioned by its parent.
    Leaf,
    Flex(FlexSpec),
    Grid(GridSpec),
}

/// One view in the arena.
#[derive(Debug, Clone)]
pub(crate) struct ViewNode {
    pub(crate) frame: Frame,
    pub(crate) parent: Option<ViewId>,
    pub(crate) children: Vec<ViewId>,
    pub(crate) layout: LayoutKind,
}

impl ViewNode {
    fn new(frame: Frame, layout: LayoutKind) -> Self {
        Self {
            frame,
            parent: None,
            children: Vec::new(),
            layout,
        }
    }
}

/// Bound on nested resize cascades (re-entrant `child_did_resize` calls).
///
/// Shrink amounts are monotonically bounded by existing slack, so cascades
/// converge in practice; the bound turns a broken invariant into
/// [`LayoutError::ResizeRecursionLimit`] instead of unbounded recursion.
pub(crate) const MAX_RESIZE_DEPTH: u32 = 32;

/// Arena of views with layout policies.
#[derive(Debug, Default)]
pub struct LayoutTree {
    pub(crate) nodes: BTreeMap<ViewId, ViewNode>,
    ids: ViewIdAllocator,
    pub(crate) events: Vec<ResizeEvent>,
    resize_depth: u32,
}

impl LayoutTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live views.
    #[must_use]
    pub fn view_count(&self) -> usize {
        self.nodes.len()
    }

    /// Create a detached leaf view.
    pub fn create_view(&mut self, frame: Frame) -> Result<ViewId, LayoutError> {
        self.insert_node(ViewNode::new(frame, LayoutKind::Leaf))
    }

    /// Create a detached flex layout view.
    pub fn create_flex(&mut self, frame: Frame, spec: FlexSpec) -> Result<ViewId, LayoutError> {
        self.insert_node(ViewNode::new(frame, LayoutKind::Flex(spec)))
    }

    /// Create a detached grid layout view with `num_cols` columns and one
    /// empty row.
    ///
    /// The frame is sized to the (empty) content immediately, so auto axes
    /// track content from birth rather than from the first append.
    pub fn create_grid(
        &mut self,
        frame: Frame,
        num_cols: usize,
        options: GridOptions,
    ) -> Result<ViewId, LayoutError> {
        let spec = GridSpec::new(num_cols, options);
        let id = self.insert_node(ViewNode::new(frame, LayoutKind::Grid(spec)))?;
        self.update_size(id)?;
        Ok(id)
    }

    fn insert_node(&mut self, node: ViewNode) -> Result<ViewId, LayoutError> {
        let id = self.ids.allocate()?;
        self.nodes.insert(id, node);
        Ok(id)
    }

    pub(crate) fn node(&self, id: ViewId) -> Result<&ViewNode, LayoutError> {
        self.nodes
            .get(&id)
            .ok_or(LayoutError::UnknownView { view: id })
    }

    pub(crate) fn node_mut(&mut self, id: ViewId) -> Result<&mut ViewNode, LayoutError> {
        self.nodes
            .get_mut(&id)
            .ok_or(LayoutError::UnknownView { view: id })
    }

    /// Read a view's frame.
    pub fn frame(&self, id: ViewId) -> Result<&Frame, LayoutError> {
        Ok(&self.node(id)?.frame)
    }

    /// Move a view's origin. Positional only; no notification.
    pub fn set_position(&mut self, id: ViewId, x: f64, y: f64) -> Result<(), LayoutError> {
        self.node_mut(id)?.frame.set_position(x, y);
        Ok(())
    }

    /// Set a view's padding.
    pub fn set_padding(
        &mut self,
        id: ViewId,
        padding: impl Into<plotkit_core::geometry::Insets>,
    ) -> Result<(), LayoutError> {
        self.node_mut(id)?.frame.set_padding(padding);
        Ok(())
    }

    /// Set a view's anchor offset.
    pub fn set_anchor_offset(&mut self, id: ViewId, dx: f64, dy: f64) -> Result<(), LayoutError> {
        self.node_mut(id)?.frame.set_anchor_offset(dx, dy);
        Ok(())
    }

    /// Set flex capability per axis.
    pub fn set_can_flex(
        &mut self,
        id: ViewId,
        width: bool,
        height: bool,
    ) -> Result<(), LayoutError> {
        let frame = &mut self.node_mut(id)?.frame;
        frame.can_width_flex = width;
        frame.can_height_flex = height;
        Ok(())
    }

    /// Hide or show a view.
    pub fn set_hidden(&mut self, id: ViewId, hidden: bool) -> Result<(), LayoutError> {
        self.node_mut(id)?.frame.hidden = hidden;
        Ok(())
    }

    /// Opt a view in or out of bubbling size changes to its parent.
    pub fn set_bubble_size_change(&mut self, id: ViewId, bubble: bool) -> Result<(), LayoutError> {
        self.node_mut(id)?.frame.bubble_size_change = bubble;
        Ok(())
    }

    /// Parent of a view, if attached.
    pub fn parent(&self, id: ViewId) -> Result<Option<ViewId>, LayoutError> {
        Ok(self.node(id)?.parent)
    }

    /// Ordered children of a view.
    pub fn children(&self, id: ViewId) -> Result<&[ViewId], LayoutError> {
        Ok(&self.node(id)?.children)
    }

    /// Index of a view within its parent's child list.
    pub fn index_in_parent(&self, id: ViewId) -> Result<Option<usize>, LayoutError> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(None);
        };
        Ok(self.node(parent)?.children.iter().position(|&c| c == id))
    }

    /// Previous sibling: `children[index - 1]` of the parent.
    pub fn prev_sibling(&self, id: ViewId) -> Result<Option<ViewId>, LayoutError> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(None);
        };
        let siblings = &self.node(parent)?.children;
        let Some(index) = siblings.iter().position(|&c| c == id) else {
            return Ok(None);
        };
        Ok(if index > 0 {
            Some(siblings[index - 1])
        } else {
            None
        })
    }

    /// Next sibling: `children[index + 1]` of the parent.
    pub fn next_sibling(&self, id: ViewId) -> Result<Option<ViewId>, LayoutError> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(None);
        };
        let siblings = &self.node(parent)?.children;
        let Some(index) = siblings.iter().position(|&c| c == id) else {
            return Ok(None);
        };
        Ok(siblings.get(index + 1).copied())
    }

    /// Append a child to a parent layout.
    ///
    /// Grid parents claim the first empty cell in row-major order; use
    /// [`grid_append`](Self::grid_append) to claim an explicit territory.
    pub fn append_child(&mut self, parent: ViewId, child: ViewId) -> Result<(), LayoutError> {
        let index = self.node(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Insert a child at an index in a parent layout.
    pub fn insert_child(
        &mut self,
        parent: ViewId,
        index: usize,
        child: ViewId,
    ) -> Result<(), LayoutError> {
        if matches!(self.node(parent)?.layout, LayoutKind::Grid(_)) {
            return self.grid_insert(parent, index, child, None);
        }
        self.attach_child(parent, index, child)?;
        if matches!(self.node(parent)?.layout, LayoutKind::Flex(_)) {
            self.update_size(parent)?;
            self.flex_layout_views(parent)?;
        }
        Ok(())
    }

    /// Link `child` under `parent` at `index`, after validation.
    pub(crate) fn attach_child(
        &mut self,
        parent: ViewId,
        index: usize,
        child: ViewId,
    ) -> Result<(), LayoutError> {
        self.node(parent)?;
        let child_node = self.node(child)?;
        if let Some(existing) = child_node.parent {
            return Err(LayoutError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        let len = self.node(parent)?.children.len();
        if index > len {
            return Err(LayoutError::ChildIndexOutOfRange { index, len });
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.insert(index, child);
        Ok(())
    }

    /// Detach a view from its parent. Detaching an orphan is a no-op.
    ///
    /// Grid parents clear the view's cells and territory and contract
    /// now-empty rows/columns; flex parents recompute size and reflow.
    pub fn detach(&mut self, child: ViewId) -> Result<(), LayoutError> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        if matches!(self.node(parent)?.layout, LayoutKind::Grid(_)) {
            self.grid_clear_child(parent, child)?;
        }
        self.unlink_child(parent, child)?;
        match self.node(parent)?.layout {
            LayoutKind::Flex(_) => {
                self.update_size(parent)?;
                self.flex_layout_views(parent)?;
            }
            LayoutKind::Grid(_) => {
                self.update_size(parent)?;
                self.grid_layout_views(parent)?;
            }
            LayoutKind::Leaf => {}
        }
        Ok(())
    }

    pub(crate) fn unlink_child(
        &mut self,
        parent: ViewId,
        child: ViewId,
    ) -> Result<(), LayoutError> {
        let children = &mut self.node_mut(parent)?.children;
        let Some(index) = children.iter().position(|&c| c == child) else {
            return Err(LayoutError::NotAChild { child, parent });
        };
        children.remove(index);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    /// Detach a view and drop it together with its entire subtree.
    pub fn remove_view(&mut self, id: ViewId) -> Result<(), LayoutError> {
        self.detach(id)?;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    /// Set a view's size.
    ///
    /// Records a [`ResizeEvent`] if either dimension changed and, only when
    /// the view opts into `bubble_size_change`, notifies the parent layout.
    pub fn set_size(&mut self, id: ViewId, width: f64, height: f64) -> Result<(), LayoutError> {
        let (old, parent, bubble) = {
            let node = self.node_mut(id)?;
            let old = Size::new(node.frame.width(), node.frame.height());
            node.frame.assign_size(width.max(0.0), height.max(0.0));
            (old, node.parent, node.frame.bubble_size_change)
        };
        let new = Size::new(width.max(0.0), height.max(0.0));
        if old != new {
            self.events.push(ResizeEvent { view: id, old, new });
            if bubble && let Some(parent) = parent {
                self.child_did_resize(parent, id)?;
            }
        }
        Ok(())
    }

    /// Set a view's size without ever notifying the parent.
    ///
    /// Used by rule adjustment for forced shrinks, where notifying the
    /// parent would re-enter the adjustment that caused the shrink.
    pub(crate) fn set_size_silent(
        &mut self,
        id: ViewId,
        width: f64,
        height: f64,
    ) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        let old = Size::new(node.frame.width(), node.frame.height());
        node.frame.assign_size(width.max(0.0), height.max(0.0));
        let new = Size::new(width.max(0.0), height.max(0.0));
        if old != new {
            self.events.push(ResizeEvent { view: id, old, new });
        }
        Ok(())
    }

    /// Resize a view from the outside.
    ///
    /// Unlike [`set_size`](Self::set_size), the parent layout is always
    /// notified so it can re-apportion space. Resizing a grid redistributes
    /// its rows/columns before children are repositioned.
    pub fn resize(&mut self, id: ViewId, width: f64, height: f64) -> Result<(), LayoutError> {
        match self.node(id)?.layout {
            LayoutKind::Grid(_) => self.grid_apply_resize(id, width, height)?,
            LayoutKind::Flex(_) => {
                self.set_size_silent(id, width, height)?;
                self.flex_layout_views(id)?;
            }
            LayoutKind::Leaf => self.set_size_silent(id, width, height)?,
        }
        if let Some(parent) = self.node(id)?.parent {
            self.child_did_resize(parent, id)?;
        }
        Ok(())
    }

    /// Intrinsic size: pure function of content.
    ///
    /// Flex and grid layouts compute from their children; leaves return
    /// their current size.
    pub fn compute_size(&self, id: ViewId) -> Result<Size, LayoutError> {
        match &self.node(id)?.layout {
            LayoutKind::Leaf => Ok(self.node(id)?.frame.size()),
            LayoutKind::Flex(_) => self.flex_compute_size(id),
            LayoutKind::Grid(_) => self.grid_compute_size(id),
        }
    }

    /// Recompute a view's intrinsic size and apply it via
    /// [`set_size`](Self::set_size).
    pub fn update_size(&mut self, id: ViewId) -> Result<(), LayoutError> {
        let size = self.compute_size(id)?;
        self.set_size(id, size.width, size.height)
    }

    /// Reposition a layout's children. No-op for leaves.
    pub fn layout_views(&mut self, id: ViewId) -> Result<(), LayoutError> {
        match self.node(id)?.layout {
            LayoutKind::Leaf => Ok(()),
            LayoutKind::Flex(_) => self.flex_layout_views(id),
            LayoutKind::Grid(_) => self.grid_layout_views(id),
        }
    }

    /// A child changed size; let the parent layout react.
    pub(crate) fn child_did_resize(
        &mut self,
        parent: ViewId,
        child: ViewId,
    ) -> Result<(), LayoutError> {
        if self.resize_depth >= MAX_RESIZE_DEPTH {
            return Err(LayoutError::ResizeRecursionLimit {
                depth: self.resize_depth,
            });
        }
        self.resize_depth += 1;
        let result = self.child_did_resize_inner(parent, child);
        self.resize_depth -= 1;
        result
    }

    fn child_did_resize_inner(
        &mut self,
        parent: ViewId,
        child: ViewId,
    ) -> Result<(), LayoutError> {
        match self.node(parent)?.layout {
            LayoutKind::Leaf => Ok(()),
            LayoutKind::Flex(_) => {
                self.update_size(parent)?;
                self.flex_layout_views(parent)
            }
            LayoutKind::Grid(_) => self.grid_child_did_resize(parent, child),
        }
    }

    /// Drain the queue of size changes applied since the last call.
    pub fn take_resize_events(&mut self) -> Vec<ResizeEvent> {
        std::mem::take(&mut self.events)
    }
}
