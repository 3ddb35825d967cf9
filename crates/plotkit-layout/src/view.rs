//! View geometry: position, size, padding, and flex capability.

use plotkit_core::geometry::{Insets, Point, Rect, Size};

use crate::Axis;

/// Geometry and layout capability of a single view.
///
/// A frame owns no layout policy. The origin `(x, y)` is the top-left of the
/// content rect; padding extends outward, so the padded rect spans
/// `x - padding.left ..= x + width + padding.right` (vertical analogue).
/// Width and height start out as the [`Frame::UNSET`] sentinel until the
/// first sizing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    x: f64,
    y: f64,
    anchor_dx: f64,
    anchor_dy: f64,
    width: f64,
    height: f64,
    padding: Insets,
    /// Whether the width may be changed by shrink/grow apportionment.
    pub can_width_flex: bool,
    /// Whether the height may be changed by shrink/grow apportionment.
    pub can_height_flex: bool,
    /// Hidden views are skipped by sequential flex flow.
    pub hidden: bool,
    /// Whether `set_size` notifies the parent layout of the change.
    pub bubble_size_change: bool,
}

impl Frame {
    /// Sentinel for a dimension that has not been sized yet.
    pub const UNSET: f64 = -1.0;

    /// Create a detached, unsized frame at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            anchor_dx: 0.0,
            anchor_dy: 0.0,
            width: Self::UNSET,
            height: Self::UNSET,
            padding: Insets::ZERO,
            can_width_flex: false,
            can_height_flex: false,
            hidden: false,
            bubble_size_change: false,
        }
    }

    /// Builder: set padding.
    #[must_use]
    pub fn with_padding(mut self, padding: impl Into<Insets>) -> Self {
        self.padding = padding.into();
        self
    }

    /// Builder: allow both axes to flex.
    #[must_use]
    pub fn flex(mut self) -> Self {
        self.can_width_flex = true;
        self.can_height_flex = true;
        self
    }

    /// Builder: allow the width to flex.
    #[must_use]
    pub fn width_flex(mut self) -> Self {
        self.can_width_flex = true;
        self
    }

    /// Builder: allow the height to flex.
    #[must_use]
    pub fn height_flex(mut self) -> Self {
        self.can_height_flex = true;
        self
    }

    /// Builder: opt into bubbling size changes to the parent layout.
    #[must_use]
    pub fn bubble(mut self) -> Self {
        self.bubble_size_change = true;
        self
    }

    /// Origin x (content left edge).
    #[inline]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Origin y (content top edge).
    #[inline]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Content origin.
    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the origin.
    #[inline]
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Offset from the origin to the alternate "location" point, used for
    /// label/anchor semantics by hosts.
    #[inline]
    pub const fn anchor_offset(&self) -> (f64, f64) {
        (self.anchor_dx, self.anchor_dy)
    }

    /// Set the anchor offset.
    #[inline]
    pub fn set_anchor_offset(&mut self, dx: f64, dy: f64) {
        self.anchor_dx = dx;
        self.anchor_dy = dy;
    }

    /// The anchor location: origin plus anchor offset.
    #[inline]
    pub fn location(&self) -> Point {
        self.origin().offset(self.anchor_dx, self.anchor_dy)
    }

    /// Content width, or [`Frame::UNSET`] before first sizing.
    #[inline]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Content height, or [`Frame::UNSET`] before first sizing.
    #[inline]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Content size with unset dimensions clamped to zero.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width.max(0.0), self.height.max(0.0))
    }

    /// Whether both dimensions have been sized.
    #[inline]
    pub fn is_sized(&self) -> bool {
        self.width >= 0.0 && self.height >= 0.0
    }

    /// Padding around the content rect.
    #[inline]
    pub const fn padding(&self) -> Insets {
        self.padding
    }

    /// Set the padding.
    #[inline]
    pub fn set_padding(&mut self, padding: impl Into<Insets>) {
        self.padding = padding.into();
    }

    /// Content width plus horizontal padding.
    #[inline]
    pub fn padded_width(&self) -> f64 {
        self.width.max(0.0) + self.padding.horizontal_sum()
    }

    /// Content height plus vertical padding.
    #[inline]
    pub fn padded_height(&self) -> f64 {
        self.height.max(0.0) + self.padding.vertical_sum()
    }

    /// Padded size.
    #[inline]
    pub fn padded_size(&self) -> Size {
        Size::new(self.padded_width(), self.padded_height())
    }

    /// Content left edge.
    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Content top edge.
    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Content right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width.max(0.0)
    }

    /// Content bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height.max(0.0)
    }

    /// Horizontal center of the content rect.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.width.max(0.0) / 2.0
    }

    /// Vertical center of the content rect.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.y + self.height.max(0.0) / 2.0
    }

    /// Content rect.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width.max(0.0), self.height.max(0.0))
    }

    /// Padded rect: the content rect extended by the padding.
    #[inline]
    pub fn padded_rect(&self) -> Rect {
        self.rect().outer(self.padding)
    }

    /// Content extent along an axis.
    #[inline]
    pub(crate) fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Padded extent along an axis.
    #[inline]
    pub(crate) fn padded_extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.padded_width(),
            Axis::Vertical => self.padded_height(),
        }
    }

    /// Padding sum along an axis.
    #[inline]
    pub(crate) fn padding_sum(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.padding.horizontal_sum(),
            Axis::Vertical => self.padding.vertical_sum(),
        }
    }

    /// Flex capability along an axis.
    #[inline]
    pub(crate) fn can_flex(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.can_width_flex,
            Axis::Vertical => self.can_height_flex,
        }
    }

    /// Assign the size. Once sized, dimensions stay non-negative.
    #[inline]
    pub(crate) fn assign_size(&mut self, width: f64, height: f64) {
        debug_assert!(width >= 0.0 && height >= 0.0, "sized frames stay >= 0");
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_is_unsized() {
        let frame = Frame::new();
        assert!(!frame.is_sized());
        assert_eq!(frame.width(), Frame::UNSET);
        assert_eq!(frame.height(), Frame::UNSET);
        // Unset dimensions clamp to zero in derived values.
        assert_eq!(frame.size(), Size::ZERO);
        assert_eq!(frame.padded_width(), 0.0);
    }

    #[test]
    fn padded_size_includes_padding() {
        let mut frame = Frame::new().with_padding((1.0, 2.0, 3.0, 4.0));
        frame.assign_size(10.0, 20.0);
        assert_eq!(frame.padded_width(), 16.0);
        assert_eq!(frame.padded_height(), 24.0);
        assert_eq!(frame.padded_rect(), Rect::new(-4.0, -1.0, 16.0, 24.0));
    }

    #[test]
    fn edges_and_centers() {
        let mut frame = Frame::new();
        frame.set_position(10.0, 20.0);
        frame.assign_size(30.0, 40.0);
        assert_eq!(frame.left(), 10.0);
        assert_eq!(frame.right(), 40.0);
        assert_eq!(frame.top(), 20.0);
        assert_eq!(frame.bottom(), 60.0);
        assert_eq!(frame.center_x(), 25.0);
        assert_eq!(frame.center_y(), 40.0);
    }

    #[test]
    fn location_applies_anchor_offset() {
        let mut frame = Frame::new();
        frame.set_position(5.0, 5.0);
        frame.set_anchor_offset(2.0, -3.0);
        assert_eq!(frame.location(), Point::new(7.0, 2.0));
    }

    #[test]
    fn with_padding_builder_matches_getter() {
        let frame = Frame::new().with_padding(5.0);
        assert_eq!(frame.padding(), Insets::all(5.0));
        let frame = Frame::new().with_padding((1.0, 2.0));
        assert_eq!(frame.padding(), Insets::new(1.0, 2.0, 1.0, 2.0));
    }

    #[test]
    fn builders_set_flags() {
        let frame = Frame::new().flex().bubble();
        assert!(frame.can_width_flex);
        assert!(frame.can_height_flex);
        assert!(frame.bubble_size_change);

        let frame = Frame::new().height_flex();
        assert!(!frame.can_width_flex);
        assert!(frame.can_height_flex);
    }

    #[test]
    fn axis_helpers_match_fields() {
        let mut frame = Frame::new().with_padding(2.0).width_flex();
        frame.assign_size(10.0, 20.0);
        assert_eq!(frame.extent(Axis::Horizontal), 10.0);
        assert_eq!(frame.extent(Axis::Vertical), 20.0);
        assert_eq!(frame.padded_extent(Axis::Horizontal), 14.0);
        assert_eq!(frame.padding_sum(Axis::Vertical), 4.0);
        assert!(frame.can_flex(Axis::Horizontal));
        assert!(!frame.can_flex(Axis::Vertical));
    }
}
