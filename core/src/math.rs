//! Deterministic numeric utilities.
//!
//! Every positional and damage computation in the engine is routed through
//! [`fix_number`], which snaps values to five fractional digits so that the
//! trajectory of a replay does not depend on the last bits of intermediate
//! floating-point results.

use serde::{Deserialize, Serialize};

const FIXED_SCALE: f64 = 1e5;
const SEGMENT_BUFFER: f64 = 0.1;

/// Rounds to the nearest integer, resolving halves towards positive infinity.
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Snaps `value` to five fractional digits; `NaN` becomes zero.
#[must_use]
pub fn fix_number(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }

    round_half_up(value * FIXED_SCALE) / FIXED_SCALE
}

/// Continuous position on the board measured in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate, growing with the column index.
    pub x: f64,
    /// Vertical coordinate, growing with the row index.
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Fixed squared distance between two points.
    #[must_use]
    pub fn squared_distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        fix_number(dx * dx + dy * dy)
    }

    /// Fixed euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        fix_number((dx * dx + dy * dy).sqrt())
    }
}

/// Reports whether `point` lies within `radius` of `center`.
#[must_use]
pub fn point_in_circle(point: Point, center: Point, radius: f64) -> bool {
    point.distance(center) <= radius
}

/// Reports whether `point` lies on the segment between `start` and `end`.
///
/// The test compares the sum of distances to both endpoints with the segment
/// length, accepting a small buffer to tolerate the fixed rounding.
#[must_use]
pub fn point_on_segment(start: Point, end: Point, point: Point) -> bool {
    let to_start = point.distance(start);
    let to_end = point.distance(end);
    let length = start.distance(end);
    let sum = to_start + to_end;

    sum >= length - SEGMENT_BUFFER && sum <= length + SEGMENT_BUFFER
}

/// Reports whether the segment between `start` and `end` touches the circle.
#[must_use]
pub fn segment_intersects_circle(start: Point, end: Point, center: Point, radius: f64) -> bool {
    if point_in_circle(start, center, radius) || point_in_circle(end, center, radius) {
        return true;
    }

    let length = start.distance(end);
    if length == 0.0 {
        return false;
    }

    let along_x = end.x - start.x;
    let along_y = end.y - start.y;
    let dot = ((center.x - start.x) * along_x + (center.y - start.y) * along_y) / (length * length);
    let closest = Point::new(start.x + dot * along_x, start.y + dot * along_y);

    if !point_on_segment(start, end, closest) {
        return false;
    }

    closest.distance(center) <= radius
}

/// Stable top-down merge sort driven by a strict "less than" predicate.
///
/// Elements that do not compare less keep their relative order, so entries
/// with equal keys leave the sort in the order they entered it.
#[must_use]
pub fn merge_sort<T, F>(items: Vec<T>, less: F) -> Vec<T>
where
    F: Fn(&T, &T) -> bool,
{
    sort_run(items, &less)
}

fn sort_run<T, F>(mut items: Vec<T>, less: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> bool,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = sort_run(items, less);
    let right = sort_run(right, less);
    merge_runs(left, right, less)
}

fn merge_runs<T, F>(left: Vec<T>, right: Vec<T>, less: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> bool,
{
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(first), Some(second)) => less(second, first),
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };

        let next = if take_right { right.next() } else { left.next() };
        if let Some(item) = next {
            merged.push(item);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fix_number_snaps_to_five_digits() {
        assert_eq!(fix_number(0.1 + 0.2), 0.3);
        assert_eq!(fix_number(1.234_567), 1.234_57);
        assert_eq!(fix_number(-1.5), -1.5);
        assert_eq!(fix_number(f64::NAN), 0.0);
    }

    #[test]
    fn round_half_up_matches_credit_rounding() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(2.49), 2.0);
    }

    #[test]
    fn circle_boundary_counts_as_inside() {
        let center = Point::new(1.0, 1.0);
        assert!(point_in_circle(Point::new(2.0, 1.0), center, 1.0));
        assert!(!point_in_circle(Point::new(2.1, 1.0), center, 1.0));
    }

    #[test]
    fn segment_passing_through_circle_intersects() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(4.0, 0.0);
        assert!(segment_intersects_circle(start, end, Point::new(2.0, 0.3), 0.5));
        assert!(!segment_intersects_circle(start, end, Point::new(2.0, 0.6), 0.5));
    }

    #[test]
    fn segment_ending_before_circle_misses() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(1.0, 0.0);
        assert!(!segment_intersects_circle(start, end, Point::new(3.0, 0.0), 0.5));
    }

    #[test]
    fn degenerate_segment_only_checks_its_point() {
        let point = Point::new(1.0, 1.0);
        assert!(!segment_intersects_circle(point, point, Point::new(3.0, 3.0), 0.5));
        assert!(segment_intersects_circle(point, point, Point::new(1.2, 1.0), 0.5));
    }

    #[test]
    fn merge_sort_keeps_equal_keys_in_order() {
        let entries = vec![(3, 'a'), (1, 'b'), (3, 'c'), (1, 'd'), (2, 'e')];
        let sorted = merge_sort(entries, |left, right| left.0 < right.0);
        assert_eq!(
            sorted,
            vec![(1, 'b'), (1, 'd'), (2, 'e'), (3, 'a'), (3, 'c')]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn merge_sort_is_sorted_and_stable(keys in prop::collection::vec(0u8..6, 0..40)) {
            let tagged: Vec<(u8, usize)> = keys.iter().copied().zip(0..).collect();
            let sorted = merge_sort(tagged.clone(), |left, right| left.0 < right.0);

            let mut expected = tagged;
            expected.sort_by_key(|entry| entry.0);
            prop_assert_eq!(sorted, expected);
        }

        #[test]
        fn fix_number_is_idempotent(value in -1e6f64..1e6) {
            let once = fix_number(value);
            prop_assert_eq!(fix_number(once), once);
        }
    }
}
