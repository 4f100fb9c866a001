//! Axis-aligned bounds helpers used by contact dispatch and gimmick policies.
//!
//! Touching edges count as overlapping: a character resting on top of a
//! spring is in contact with it.

use bevy::prelude::*;

/// Whether two bounds overlap on both axes.
pub fn bounds_overlap(a: Rect, b: Rect) -> bool {
    horizontal_overlap(a, b) && vertical_overlap(a, b)
}

/// Whether the horizontal extents overlap.
pub fn horizontal_overlap(a: Rect, b: Rect) -> bool {
    a.min.x <= b.max.x && a.max.x >= b.min.x
}

/// Whether the vertical extents overlap.
pub fn vertical_overlap(a: Rect, b: Rect) -> bool {
    a.min.y <= b.max.y && a.max.y >= b.min.y
}

/// Whether the center of `target` is at or above the top edge of `reference`.
pub fn target_is_above(target: Rect, reference: Rect) -> bool {
    target.center().y >= reference.max.y
}

/// Whether the center of `target` is at or below the bottom edge of `reference`.
pub fn target_is_below(target: Rect, reference: Rect) -> bool {
    target.center().y <= reference.min.y
}

/// Whether the center of `target` is at or left of the left edge of `reference`.
pub fn target_is_left_of(target: Rect, reference: Rect) -> bool {
    target.center().x <= reference.min.x
}

/// Whether the center of `target` is at or right of the right edge of `reference`.
pub fn target_is_right_of(target: Rect, reference: Rect) -> bool {
    target.center().x >= reference.max.x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(cx: f32, cy: f32, hx: f32, hy: f32) -> Rect {
        Rect::from_center_half_size(Vec2::new(cx, cy), Vec2::new(hx, hy))
    }

    #[test]
    fn overlap_includes_touching_edges() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        assert!(bounds_overlap(a, rect(1.5, 0.0, 0.5, 1.0)));
        assert!(bounds_overlap(a, rect(0.5, 0.5, 0.1, 0.1)));
        assert!(!bounds_overlap(a, rect(3.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn single_axis_overlap() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let beside = rect(5.0, 0.0, 1.0, 1.0);
        assert!(!horizontal_overlap(a, beside));
        assert!(vertical_overlap(a, beside));

        let stacked = rect(0.0, 5.0, 1.0, 1.0);
        assert!(horizontal_overlap(a, stacked));
        assert!(!vertical_overlap(a, stacked));
    }

    #[test]
    fn relative_position() {
        let reference = rect(0.0, 0.0, 2.0, 2.0);
        assert!(target_is_above(rect(0.0, 3.0, 1.0, 1.0), reference));
        assert!(!target_is_above(rect(0.0, 1.0, 1.0, 1.0), reference));
        assert!(target_is_below(rect(0.0, -2.5, 1.0, 1.0), reference));
        assert!(target_is_left_of(rect(-2.0, 0.0, 1.0, 1.0), reference));
        assert!(target_is_right_of(rect(4.0, 0.0, 1.0, 1.0), reference));
        assert!(!target_is_right_of(rect(1.0, 0.0, 1.0, 1.0), reference));
    }
}
