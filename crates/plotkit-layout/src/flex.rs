//! Sequential row/column flow.
//!
//! A flex layout packs its children along one axis with a fixed gap and
//! snaps them on the cross axis per one alignment. It keeps no persistent
//! state: size and child positions are recomputed from the children on
//! demand, and it never resizes a child.

use plotkit_core::geometry::Size;

use crate::error::LayoutError;
use crate::tree::{LayoutKind, LayoutTree, ViewId};
use crate::{Align, Axis};

/// Configuration of a sequential flex layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexSpec {
    /// Main axis of flow.
    pub axis: Axis,
    /// Space between consecutive children.
    pub gap: f64,
    /// Cross-axis snap applied to every child.
    pub align_views: Align,
}

impl FlexSpec {
    /// A left-to-right row.
    #[must_use]
    pub fn row() -> Self {
        Self {
            axis: Axis::Horizontal,
            gap: 0.0,
            align_views: Align::Start,
        }
    }

    /// A top-to-bottom column.
    #[must_use]
    pub fn column() -> Self {
        Self {
            axis: Axis::Vertical,
            gap: 0.0,
            align_views: Align::Start,
        }
    }

    /// Set the gap between children.
    #[must_use]
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Set the cross-axis alignment.
    #[must_use]
    pub fn align_views(mut self, align: Align) -> Self {
        self.align_views = align;
        self
    }
}

#[inline]
fn axis_component(size: Size, axis: Axis) -> f64 {
    match axis {
        Axis::Horizontal => size.width,
        Axis::Vertical => size.height,
    }
}

impl LayoutTree {
    /// Read a flex layout's configuration.
    pub fn flex_spec(&self, id: ViewId) -> Result<&FlexSpec, LayoutError> {
        match &self.node(id)?.layout {
            LayoutKind::Flex(spec) => Ok(spec),
            _ => Err(LayoutError::NotAFlex { view: id }),
        }
    }

    fn flex_spec_mut(&mut self, id: ViewId) -> Result<&mut FlexSpec, LayoutError> {
        match &mut self.node_mut(id)?.layout {
            LayoutKind::Flex(spec) => Ok(spec),
            _ => Err(LayoutError::NotAFlex { view: id }),
        }
    }

    /// Change the gap of a flex layout and reflow it.
    pub fn set_flex_gap(&mut self, id: ViewId, gap: f64) -> Result<(), LayoutError> {
        self.flex_spec_mut(id)?.gap = gap;
        self.update_size(id)?;
        self.flex_layout_views(id)
    }

    /// Change the cross-axis alignment of a flex layout and reflow it.
    pub fn set_flex_align(&mut self, id: ViewId, align: Align) -> Result<(), LayoutError> {
        self.flex_spec_mut(id)?.align_views = align;
        self.flex_layout_views(id)
    }

    /// Row: `(Σ padded_width + gap·(n−1), max padded_height)`; column
    /// transposed. Hidden children are skipped; no children yields zero.
    pub(crate) fn flex_compute_size(&self, id: ViewId) -> Result<Size, LayoutError> {
        let spec = *self.flex_spec(id)?;
        let axis = spec.axis;
        let cross_axis = axis.cross();

        let mut main = 0.0_f64;
        let mut cross = 0.0_f64;
        let mut count = 0usize;
        for &child in &self.node(id)?.children {
            let frame = &self.node(child)?.frame;
            if frame.hidden {
                continue;
            }
            main += frame.padded_extent(axis);
            cross = cross.max(frame.padded_extent(cross_axis));
            count += 1;
        }
        if count > 1 {
            main += spec.gap * (count - 1) as f64;
        }

        Ok(match axis {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        })
    }

    /// Pack children along the main axis and snap them on the cross axis.
    ///
    /// Purely positional: always succeeds, never resizes a child.
    pub(crate) fn flex_layout_views(&mut self, id: ViewId) -> Result<(), LayoutError> {
        let spec = *self.flex_spec(id)?;
        let axis = spec.axis;
        let cross_axis = axis.cross();

        let frame = &self.node(id)?.frame;
        let (main_origin, cross_origin) = match axis {
            Axis::Horizontal => (frame.x(), frame.y()),
            Axis::Vertical => (frame.y(), frame.x()),
        };
        // A not-yet-sized layout snaps against its computed extent.
        let cross_size = if frame.extent(cross_axis) >= 0.0 {
            frame.extent(cross_axis)
        } else {
            axis_component(self.flex_compute_size(id)?, cross_axis)
        };

        let children = self.node(id)?.children.clone();
        let mut cursor = main_origin;
        for child in children {
            let frame = &self.node(child)?.frame;
            if frame.hidden {
                continue;
            }
            let padded_main = frame.padded_extent(axis);
            let padded_cross = frame.padded_extent(cross_axis);
            let padding = frame.padding();
            let (lead_main, lead_cross) = match axis {
                Axis::Horizontal => (padding.left, padding.top),
                Axis::Vertical => (padding.top, padding.left),
            };

            let main_pos = cursor + lead_main;
            let cross_pos = cross_origin
                + lead_cross
                + match spec.align_views {
                    Align::Start => 0.0,
                    Align::Center => (cross_size - padded_cross) / 2.0,
                    Align::End => cross_size - padded_cross,
                };

            let node = self.node_mut(child)?;
            match axis {
                Axis::Horizontal => node.frame.set_position(main_pos, cross_pos),
                Axis::Vertical => node.frame.set_position(cross_pos, main_pos),
            }

            cursor += padded_main + spec.gap;
        }
        Ok(())
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
    fn row_size_sums_widths_and_gaps() {
        // Three children 10/20/30 with gap 5: width 10+20+30+5+5 = 70.
        let mut tree = LayoutTree::new();
        let row = tree
            .create_flex(Frame::new(), FlexSpec::row().gap(5.0))
            .unwrap();
        for (w, h) in [(10.0, 4.0), (20.0, 8.0), (30.0, 6.0)] {
            let v = sized_view(&mut tree, w, h);
            tree.append_child(row, v).unwrap();
        }
        assert_eq!(tree.compute_size(row).unwrap(), Size::new(70.0, 8.0));
    }

    #[test]
    fn column_size_is_transposed() {
        let mut tree = LayoutTree::new();
        let col = tree
            .create_flex(Frame::new(), FlexSpec::column().gap(2.0))
            .unwrap();
        for (w, h) in [(10.0, 4.0), (20.0, 8.0)] {
            let v = sized_view(&mut tree, w, h);
            tree.append_child(col, v).unwrap();
        }
        assert_eq!(tree.compute_size(col).unwrap(), Size::new(20.0, 14.0));
    }

    #[test]
    fn padding_counts_toward_flow() {
        let mut tree = LayoutTree::new();
        let row = tree.create_flex(Frame::new(), FlexSpec::row()).unwrap();
        let v = tree.create_view(Frame::new().with_padding(3.0)).unwrap();
        tree.set_size(v, 10.0, 10.0).unwrap();
        tree.append_child(row, v).unwrap();
        assert_eq!(tree.compute_size(row).unwrap(), Size::new(16.0, 16.0));
    }

    #[test]
    fn children_are_packed_with_gap() {
        let mut tree = LayoutTree::new();
        let row = tree
            .create_flex(Frame::new(), FlexSpec::row().gap(5.0))
            .unwrap();
        let a = sized_view(&mut tree, 10.0, 4.0);
        let b = sized_view(&mut tree, 20.0, 4.0);
        tree.append_child(row, a).unwrap();
        tree.append_child(row, b).unwrap();

        assert_eq!(tree.frame(a).unwrap().x(), 0.0);
        assert_eq!(tree.frame(b).unwrap().x(), 15.0);
    }

    #[test]
    fn cross_axis_alignment_snaps() {
        let mut tree = LayoutTree::new();
        let row = tree
            .create_flex(Frame::new(), FlexSpec::row().align_views(Align::Center))
            .unwrap();
        let tall = sized_view(&mut tree, 10.0, 20.0);
        let short = sized_view(&mut tree, 10.0, 10.0);
        tree.append_child(row, tall).unwrap();
        tree.append_child(row, short).unwrap();

        // Row height is 20; the short child is centered at (20-10)/2.
        assert_eq!(tree.frame(tall).unwrap().y(), 0.0);
        assert_eq!(tree.frame(short).unwrap().y(), 5.0);

        tree.set_flex_align(row, Align::End).unwrap();
        assert_eq!(tree.frame(short).unwrap().y(), 10.0);
    }

    #[test]
    fn child_padding_offsets_origin() {
        let mut tree = LayoutTree::new();
        let row = tree.create_flex(Frame::new(), FlexSpec::row()).unwrap();
        let v = tree.create_view(Frame::new().with_padding(2.0)).unwrap();
        tree.set_size(v, 10.0, 10.0).unwrap();
        tree.append_child(row, v).unwrap();

        // Padded edge is flush to the layout; content sits inside it.
        assert_eq!(tree.frame(v).unwrap().x(), 2.0);
        assert_eq!(tree.frame(v).unwrap().y(), 2.0);
    }

    #[test]
    fn hidden_children_are_skipped() {
        let mut tree = LayoutTree::new();
        let row = tree
            .create_flex(Frame::new(), FlexSpec::row().gap(5.0))
            .unwrap();
        let a = sized_view(&mut tree, 10.0, 4.0);
        let ghost = sized_view(&mut tree, 99.0, 99.0);
        let b = sized_view(&mut tree, 20.0, 4.0);
        for v in [a, ghost, b] {
            tree.append_child(row, v).unwrap();
        }
        tree.set_hidden(ghost, true).unwrap();
        tree.update_size(row).unwrap();
        tree.flex_layout_views(row).unwrap();

        assert_eq!(tree.compute_size(row).unwrap(), Size::new(35.0, 4.0));
        assert_eq!(tree.frame(b).unwrap().x(), 15.0);
    }

    #[test]
    fn empty_flex_is_zero_and_layout_is_noop() {
        let mut tree = LayoutTree::new();
        let row = tree.create_flex(Frame::new(), FlexSpec::row()).unwrap();
        assert_eq!(tree.compute_size(row).unwrap(), Size::ZERO);
        tree.flex_layout_views(row).unwrap();
    }

    #[test]
    fn flex_accessors_reject_other_kinds() {
        let mut tree = LayoutTree::new();
        let leaf = tree.create_view(Frame::new()).unwrap();
        assert_eq!(
            tree.flex_spec(leaf).unwrap_err(),
            LayoutError::NotAFlex { view: leaf }
        );
    }

    #[test]
    fn flow_starts_at_layout_origin() {
        let mut tree = LayoutTree::new();
        let col = tree.create_flex(Frame::new(), FlexSpec::column()).unwrap();
        tree.set_position(col, 7.0, 11.0).unwrap();
        let a = sized_view(&mut tree, 10.0, 5.0);
        let b = sized_view(&mut tree, 10.0, 5.0);
        tree.append_child(col, a).unwrap();
        tree.append_child(col, b).unwrap();

        assert_eq!(tree.frame(a).unwrap().origin(), crate::Point::new(7.0, 11.0));
        assert_eq!(tree.frame(b).unwrap().origin(), crate::Point::new(7.0, 16.0));
    }
}
