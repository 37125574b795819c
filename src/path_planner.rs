// src/path_planner.rs
//
// Mid-lane path points for diagnostics: every blue marker is paired with
// the nearest yellow marker and the midpoint of the pair is a point the
// vehicle should pass through.

use crate::types::Point2;

#[derive(Debug, Clone, Copy, Default)]
pub struct PathPlanner;

impl PathPlanner {
    pub fn new() -> Self {
        Self
    }

    /// One midpoint per blue centroid, in blue order. Empty when either side
    /// has no markers.
    pub fn plan(&self, blue: &[Point2], yellow: &[Point2]) -> Vec<Point2> {
        blue.iter()
            .filter_map(|b| {
                nearest(b, yellow).map(|y| Point2::new((b.x + y.x) / 2.0, (b.y + y.y) / 2.0))
            })
            .collect()
    }
}

fn nearest<'a>(from: &Point2, candidates: &'a [Point2]) -> Option<&'a Point2> {
    candidates.iter().min_by(|a, b| {
        from.distance(a)
            .partial_cmp(&from.distance(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
