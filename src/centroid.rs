// src/centroid.rs

use crate::contours::Contour;
use crate::types::{Centroid, Point2};

/// Contours whose zeroth moment is at or below this are degenerate.
const MIN_M00: f64 = f64::EPSILON;

/// Moment centroid of a single contour, `None` when it encloses no area.
pub fn contour_centroid(contour: &Contour) -> Option<Point2> {
    let m = contour.moments();
    if m.m00 <= MIN_M00 {
        return None;
    }
    Some(Point2::new((m.m10 / m.m00) as f32, (m.m01 / m.m00) as f32))
}

/// Reduces a set of filtered contours to one marker position.
///
/// Per-contour centroids are averaged with equal weight. When no contour has
/// a usable centroid the estimator answers with `fallback` (the region
/// center) flagged as not detected, so the steering logic always gets a
/// point to work with.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidEstimator;

impl CentroidEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn estimate(&self, contours: &[Contour], fallback: Point2) -> Centroid {
        let (sum_x, sum_y, count) = contours
            .iter()
            .filter_map(contour_centroid)
            .fold((0.0f64, 0.0f64, 0usize), |(sx, sy, n), p| {
                (sx + p.x as f64, sy + p.y as f64, n + 1)
            });

        if count == 0 {
            return Centroid::fallback(fallback);
        }

        Centroid::detected(
            (sum_x / count as f64) as f32,
            (sum_y / count as f64) as f32,
        )
    }

    /// Center of a `width` x `height` region, the fallback position.
    pub fn region_center(width: usize, height: usize) -> Point2 {
        Point2::new(width as f32 / 2.0, height as f32 / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contours::Point;
    use approx::assert_relative_eq;

    fn square(x: i32, y: i32, side: i32) -> Contour {
        Contour::new(vec![
            Point::new(x, y),
            Point::new(x, y + side),
            Point::new(x + side, y + side),
            Point::new(x + side, y),
        ])
    }

    #[test]
    fn test_no_contours_returns_fallback() {
        let center = CentroidEstimator::region_center(300, 120);
        let centroid = CentroidEstimator::new().estimate(&[], center);

        assert!(!centroid.valid);
        assert_eq!(centroid.point(), Point2::new(150.0, 60.0));
    }

    #[test]
    fn test_single_contour_centroid() {
        let centroid =
            CentroidEstimator::new().estimate(&[square(10, 20, 10)], Point2::new(0.0, 0.0));
        assert!(centroid.valid);
        assert_relative_eq!(centroid.x, 15.0);
        assert_relative_eq!(centroid.y, 25.0);
    }

    #[test]
    fn test_centroids_are_averaged_unweighted() {
        // A big and a small square: the result is the midpoint of both centers
        let contours = [square(0, 0, 20), square(100, 0, 4)];
        let centroid = CentroidEstimator::new().estimate(&contours, Point2::new(0.0, 0.0));
        assert_relative_eq!(centroid.x, (10.0 + 102.0) / 2.0);
        assert_relative_eq!(centroid.y, (10.0 + 2.0) / 2.0);
    }

    #[test]
    fn test_degenerate_contours_are_skipped() {
        let line = Contour::new(vec![Point::new(0, 0), Point::new(50, 0)]);
        let dot = Contour::new(vec![Point::new(7, 7)]);

        let estimator = CentroidEstimator::new();
        let fallback = Point2::new(3.0, 4.0);
        assert_eq!(
            estimator.estimate(&[line.clone(), dot], fallback),
            Centroid::fallback(fallback)
        );

        let with_square = estimator.estimate(&[line, square(0, 0, 2)], fallback);
        assert!(with_square.valid);
        assert_relative_eq!(with_square.x, 1.0);
    }
}
