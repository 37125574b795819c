// src/contours.rs
//
// Outer-boundary contour extraction and cone-shape filtering.
//
// Outer borders come from imageproc's border following; straight runs are
// compressed to their end points before the polygon moments are taken.

use crate::mask::Mask;
use imageproc::contours::{find_contours, BorderType};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// GEOMETRY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Zeroth and first order polygon moments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

/// Ordered boundary of one connected region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Moments of the polygon through the boundary points (Green's theorem).
    /// Orientation-independent: m00 is never negative.
    pub fn moments(&self) -> Moments {
        let n = self.points.len();
        let (mut m00, mut m10, mut m01) = (0.0f64, 0.0f64, 0.0f64);

        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            let (xi, yi, xj, yj) = (p.x as f64, p.y as f64, q.x as f64, q.y as f64);
            let cross = xi * yj - xj * yi;
            m00 += cross;
            m10 += cross * (xi + xj);
            m01 += cross * (yi + yj);
        }

        let mut moments = Moments {
            m00: m00 / 2.0,
            m10: m10 / 6.0,
            m01: m01 / 6.0,
        };
        if moments.m00 < 0.0 {
            moments.m00 = -moments.m00;
            moments.m10 = -moments.m10;
            moments.m01 = -moments.m01;
        }
        moments
    }

    /// Enclosed polygon area.
    pub fn area(&self) -> f64 {
        self.moments().m00
    }

    pub fn bounding_rect(&self) -> Rect {
        if self.points.is_empty() {
            return Rect {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            };
        }
        let min_x = self.points.iter().map(|p| p.x).min().unwrap_or(0);
        let max_x = self.points.iter().map(|p| p.x).max().unwrap_or(0);
        let min_y = self.points.iter().map(|p| p.y).min().unwrap_or(0);
        let max_y = self.points.iter().map(|p| p.y).max().unwrap_or(0);
        Rect {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    /// Bounding box width / height.
    pub fn aspect_ratio(&self) -> f32 {
        let rect = self.bounding_rect();
        if rect.height == 0 {
            return 0.0;
        }
        rect.width as f32 / rect.height as f32
    }
}

// ============================================================================
// BORDER FOLLOWING
// ============================================================================

/// Drop points lying in the middle of a straight horizontal, vertical or
/// diagonal run. Area and moments are unchanged.
fn compress_runs(points: Vec<Point>) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points;
    }

    let direction = |a: Point, b: Point| ((b.x - a.x).signum(), (b.y - a.y).signum());
    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            direction(prev, points[i]) != direction(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        points
    } else {
        kept
    }
}

/// All outer contours of the set regions of `mask`. Regions are 8-connected;
/// holes and regions nested inside holes are not reported.
pub fn find_external_contours(mask: &Mask) -> Vec<Contour> {
    if mask.is_empty() {
        return Vec::new();
    }

    find_contours::<i32>(mask.as_image())
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let points = c.points.iter().map(|p| Point::new(p.x, p.y)).collect();
            Contour::new(compress_runs(points))
        })
        .collect()
}

// ============================================================================
// FILTERING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRange {
    pub min: f32,
    pub max: f32,
}

/// Cone-size acceptance rules for one marker color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourFilter {
    pub min_area: f64,
    pub max_area: f64,
    /// Bounding-box width/height limits; `None` filters on area only
    #[serde(default)]
    pub aspect_ratio: Option<AspectRange>,
}

impl ContourFilter {
    pub fn area_only(min_area: f64, max_area: f64) -> Self {
        Self {
            min_area,
            max_area,
            aspect_ratio: None,
        }
    }

    pub fn with_aspect(min_area: f64, max_area: f64, min_aspect: f32, max_aspect: f32) -> Self {
        Self {
            min_area,
            max_area,
            aspect_ratio: Some(AspectRange {
                min: min_aspect,
                max: max_aspect,
            }),
        }
    }

    pub fn accepts(&self, contour: &Contour) -> bool {
        let area = contour.area();
        if area < self.min_area || area > self.max_area {
            return false;
        }
        match &self.aspect_ratio {
            Some(range) => {
                let aspect = contour.aspect_ratio();
                aspect >= range.min && aspect <= range.max
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContourExtractor {
    filter: ContourFilter,
}

impl ContourExtractor {
    pub fn new(filter: ContourFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &ContourFilter {
        &self.filter
    }

    /// Outer contours of `mask` that look like a cone.
    pub fn extract(&self, mask: &Mask) -> Vec<Contour> {
        let all = find_external_contours(mask);
        let total = all.len();
        let kept: Vec<Contour> = all.into_iter().filter(|c| self.filter.accepts(c)).collect();

        if total > 0 {
            debug!(
                "Contours: {} found, {} within area [{:.0}, {:.0}]{}",
                total,
                kept.len(),
                self.filter.min_area,
                self.filter.max_area,
                if self.filter.aspect_ratio.is_some() {
                    " and aspect limits"
                } else {
                    ""
                }
            );
        }
        kept
    }

    pub fn has_significant_contours(&self, mask: &Mask) -> bool {
        !self.extract(mask).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_mask_has_no_contours() {
        assert!(find_external_contours(&Mask::new(10, 10)).is_empty());
        assert!(find_external_contours(&Mask::new(0, 0)).is_empty());
    }

    #[test]
    fn test_square_compresses_to_corners() {
        let mut mask = Mask::new(8, 8);
        mask.fill_rect(2, 3, 3, 3, Mask::ON);

        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);

        let mut corners = contours[0].points.clone();
        corners.sort();
        assert_eq!(
            corners,
            vec![
                Point::new(2, 3),
                Point::new(2, 5),
                Point::new(4, 3),
                Point::new(4, 5)
            ]
        );
        assert_relative_eq!(contours[0].area(), 4.0);
    }

    #[test]
    fn test_single_pixel_contour() {
        let mut mask = Mask::new(5, 5);
        mask.set(2, 2, Mask::ON);

        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].points.iter().all(|&p| p == Point::new(2, 2)));
        assert_eq!(contours[0].area(), 0.0);
    }

    #[test]
    fn test_separate_blobs_give_separate_contours() {
        let mut mask = Mask::new(30, 10);
        mask.fill_rect(1, 1, 5, 5, Mask::ON);
        mask.fill_rect(20, 2, 6, 4, Mask::ON);

        assert_eq!(find_external_contours(&mask).len(), 2);
    }

    #[test]
    fn test_diagonal_touch_is_one_region() {
        let mut mask = Mask::new(10, 10);
        mask.fill_rect(1, 1, 3, 3, Mask::ON);
        mask.fill_rect(4, 4, 3, 3, Mask::ON);

        assert_eq!(find_external_contours(&mask).len(), 1);
    }

    #[test]
    fn test_hole_is_not_reported() {
        let mut mask = Mask::new(20, 20);
        mask.fill_rect(2, 2, 12, 12, Mask::ON);
        mask.fill_rect(5, 5, 4, 4, 0);

        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        // Outer polygon area, hole included
        assert_relative_eq!(contours[0].area(), 121.0);
    }

    #[test]
    fn test_blob_inside_hole_is_not_reported() {
        // Ring with an island in its hole
        let mut mask = Mask::new(30, 30);
        mask.fill_rect(2, 2, 20, 20, Mask::ON);
        mask.fill_rect(5, 5, 14, 14, 0);
        mask.fill_rect(10, 10, 4, 4, Mask::ON);

        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_relative_eq!(contours[0].area(), 361.0);
    }

    #[test]
    fn test_rectangle_moments_and_bounds() {
        let mut mask = Mask::new(40, 40);
        mask.fill_rect(10, 20, 11, 5, Mask::ON);

        let contour = &find_external_contours(&mask)[0];
        let m = contour.moments();
        assert_relative_eq!(m.m00, 40.0);
        assert_relative_eq!(m.m10 / m.m00, 15.0, epsilon = 1e-9);
        assert_relative_eq!(m.m01 / m.m00, 22.0, epsilon = 1e-9);

        let rect = contour.bounding_rect();
        assert_eq!(
            rect,
            Rect {
                x: 10,
                y: 20,
                width: 11,
                height: 5
            }
        );
        assert_relative_eq!(contour.aspect_ratio(), 2.2);
    }

    #[test]
    fn test_area_bounds_are_inclusive() {
        let contour = Contour::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 13),
            Point::new(0, 13),
        ]);
        assert_relative_eq!(contour.area(), 130.0);
        assert!(ContourFilter::area_only(130.0, 1000.0).accepts(&contour));
        assert!(!ContourFilter::area_only(131.0, 1000.0).accepts(&contour));
    }

    #[test]
    fn test_aspect_filter_rejects_elongated_blob() {
        let mut mask = Mask::new(80, 20);
        mask.fill_rect(5, 5, 40, 6, Mask::ON);

        let area_only = ContourExtractor::new(ContourFilter::area_only(130.0, 1000.0));
        let cone_shaped =
            ContourExtractor::new(ContourFilter::with_aspect(130.0, 1000.0, 0.5, 2.0));

        assert_eq!(area_only.extract(&mask).len(), 1);
        assert!(cone_shaped.extract(&mask).is_empty());
        assert!(!cone_shaped.has_significant_contours(&mask));
    }

    #[test]
    fn test_oversized_and_tiny_blobs_rejected() {
        let mut mask = Mask::new(100, 100);
        mask.fill_rect(0, 0, 50, 50, Mask::ON);
        mask.fill_rect(70, 70, 4, 4, Mask::ON);
        mask.fill_rect(70, 10, 15, 15, Mask::ON);

        let extractor = ContourExtractor::new(ContourFilter::area_only(130.0, 1000.0));
        let kept = extractor.extract(&mask);
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].area(), 196.0);
    }
}
