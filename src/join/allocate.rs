//! Length-based allocation of linear features to tracts
//!
//! The heart of the pipeline: a road or curb segment that crosses tract
//! boundaries contributes to each tract proportionally to the length of the
//! piece inside it. Fractions are clipped-length over total-length, so they
//! always sum to at most 1; the remainder is length falling outside every
//! tract.

use crate::join::TractIndex;
use geo::{BooleanOps, BoundingRect, EuclideanLength, Intersects};
use geo_types::{MultiLineString, Point};

/// Lengths below this (in working-CRS units, i.e. meters) are noise
const MIN_LENGTH_M: f64 = 1e-9;

/// One tract's share of a linear feature
#[derive(Debug, Clone, PartialEq)]
pub struct LineAllocation {
    pub tract_idx: usize,
    /// Length of the clipped piece inside the tract
    pub clipped_length_m: f64,
    /// Share of the feature's total length, in [0, 1]
    pub fraction: f64,
}

/// Allocation result for one feature
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineAllocations {
    pub allocations: Vec<LineAllocation>,
    /// Planar length of the whole feature
    pub total_length_m: f64,
    /// Length not covered by any tract
    pub unallocated_length_m: f64,
}

impl LineAllocations {
    /// Whether the feature produced no tract shares at all
    pub fn is_unallocated(&self) -> bool {
        self.allocations.is_empty()
    }
}

/// Allocate a linear feature across the tracts it intersects
///
/// Zero-length features yield an empty allocation; callers count them.
pub fn allocate_lines(index: &TractIndex, lines: &MultiLineString<f64>) -> LineAllocations {
    let total_length_m = lines.euclidean_length();
    if total_length_m < MIN_LENGTH_M {
        return LineAllocations::default();
    }

    let Some(rect) = lines.bounding_rect() else {
        return LineAllocations::default();
    };

    let mut allocations = Vec::new();
    let mut covered = 0.0;
    for tract_idx in index.candidates(rect) {
        let tract = index.get(tract_idx);
        let clipped = tract.polygons.clip(lines, false);
        let clipped_length_m = clipped.euclidean_length();
        if clipped_length_m < MIN_LENGTH_M {
            continue;
        }
        covered += clipped_length_m;
        allocations.push(LineAllocation {
            tract_idx,
            clipped_length_m,
            fraction: (clipped_length_m / total_length_m).min(1.0),
        });
    }

    LineAllocations {
        allocations,
        total_length_m,
        unallocated_length_m: (total_length_m - covered).max(0.0),
    }
}

/// Assign a point feature to the tract containing it
///
/// Border points land in the lowest-indexed containing tract, which keeps
/// repeated runs deterministic. Returns None when no tract contains the
/// point.
pub fn assign_point(index: &TractIndex, point: &Point<f64>) -> Option<usize> {
    let rect = geo_types::Rect::new(point.0, point.0);
    index
        .candidates(rect)
        .into_iter()
        .find(|&tract_idx| index.get(tract_idx).polygons.intersects(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::tracts::Tract;
    use geo_types::{line_string, point, polygon, MultiPolygon};
    use proptest::prelude::*;

    fn square_tract(geoid: &str, x0: f64, size: f64) -> Tract {
        Tract {
            geoid: geoid.to_string(),
            polygons: MultiPolygon(vec![polygon![
                (x: x0, y: 0.0),
                (x: x0 + size, y: 0.0),
                (x: x0 + size, y: size),
                (x: x0, y: size),
            ]]),
        }
    }

    fn two_adjacent_tracts() -> TractIndex {
        // A covers x in [0,10], B covers x in [10,20], both y in [0,10]
        TractIndex::build(vec![
            square_tract("A", 0.0, 10.0),
            square_tract("B", 10.0, 10.0),
        ])
    }

    #[test]
    fn test_line_split_between_two_tracts() {
        let index = two_adjacent_tracts();
        let lines = MultiLineString(vec![line_string![(x: 2.0, y: 5.0), (x: 18.0, y: 5.0)]]);
        let result = allocate_lines(&index, &lines);

        assert_eq!(result.allocations.len(), 2);
        assert!((result.total_length_m - 16.0).abs() < 1e-9);

        let a = &result.allocations[0];
        let b = &result.allocations[1];
        assert_eq!(a.tract_idx, 0);
        assert!((a.clipped_length_m - 8.0).abs() < 1e-9);
        assert!((a.fraction - 0.5).abs() < 1e-9);
        assert_eq!(b.tract_idx, 1);
        assert!((b.fraction - 0.5).abs() < 1e-9);
        assert!(result.unallocated_length_m < 1e-9);
    }

    #[test]
    fn test_line_fully_inside_one_tract() {
        let index = two_adjacent_tracts();
        let lines = MultiLineString(vec![line_string![(x: 1.0, y: 5.0), (x: 9.0, y: 5.0)]]);
        let result = allocate_lines(&index, &lines);

        assert_eq!(result.allocations.len(), 1);
        assert!((result.allocations[0].fraction - 1.0).abs() < 1e-9);
        assert!(result.unallocated_length_m < 1e-9);
    }

    #[test]
    fn test_line_partially_outside_all_tracts() {
        let index = two_adjacent_tracts();
        // Runs from x=-10 (outside) to x=10 (edge of A): half unallocated
        let lines = MultiLineString(vec![line_string![(x: -10.0, y: 5.0), (x: 10.0, y: 5.0)]]);
        let result = allocate_lines(&index, &lines);

        assert_eq!(result.allocations.len(), 1);
        assert!((result.allocations[0].fraction - 0.5).abs() < 1e-9);
        assert!((result.unallocated_length_m - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_entirely_outside() {
        let index = two_adjacent_tracts();
        let lines = MultiLineString(vec![line_string![(x: 50.0, y: 50.0), (x: 60.0, y: 50.0)]]);
        let result = allocate_lines(&index, &lines);

        assert!(result.is_unallocated());
        assert!((result.unallocated_length_m - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_line_skipped() {
        let index = two_adjacent_tracts();
        let lines = MultiLineString(vec![line_string![(x: 5.0, y: 5.0), (x: 5.0, y: 5.0)]]);
        let result = allocate_lines(&index, &lines);

        assert!(result.is_unallocated());
        assert_eq!(result.total_length_m, 0.0);
    }

    #[test]
    fn test_assign_point_inside() {
        let index = two_adjacent_tracts();
        assert_eq!(assign_point(&index, &point!(x: 5.0, y: 5.0)), Some(0));
        assert_eq!(assign_point(&index, &point!(x: 15.0, y: 5.0)), Some(1));
    }

    #[test]
    fn test_assign_point_outside_all() {
        let index = two_adjacent_tracts();
        assert_eq!(assign_point(&index, &point!(x: 50.0, y: 5.0)), None);
    }

    #[test]
    fn test_assign_border_point_takes_lowest_index() {
        let index = two_adjacent_tracts();
        // x=10 lies on the shared edge of A and B
        assert_eq!(assign_point(&index, &point!(x: 10.0, y: 5.0)), Some(0));
    }

    proptest! {
        /// Fractions sum to <= 1 and length is conserved for arbitrary
        /// horizontal lines across the two-tract cover.
        #[test]
        fn prop_fractions_sum_bounded(
            x0 in -30.0f64..30.0,
            x1 in -30.0f64..30.0,
            y in -5.0f64..15.0,
        ) {
            prop_assume!((x1 - x0).abs() > 1e-6);
            let index = two_adjacent_tracts();
            let lines = MultiLineString(vec![line_string![(x: x0, y: y), (x: x1, y: y)]]);
            let result = allocate_lines(&index, &lines);

            let fraction_sum: f64 = result.allocations.iter().map(|a| a.fraction).sum();
            prop_assert!(fraction_sum <= 1.0 + 1e-6, "fractions summed to {fraction_sum}");

            let covered: f64 = result.allocations.iter().map(|a| a.clipped_length_m).sum();
            prop_assert!(
                covered <= result.total_length_m + 1e-6,
                "covered {covered} exceeds total {}",
                result.total_length_m
            );
            prop_assert!(
                (covered + result.unallocated_length_m - result.total_length_m).abs() < 1e-6
            );
        }
    }
}
