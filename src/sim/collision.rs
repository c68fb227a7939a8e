//! Geometric hit-testing shared by the game modes
//!
//! Everything here is stateless and works in playfield pixels with y growing
//! downward. Boxes are closed: touching edges count as contact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of the given size with its top-left corner at `origin`
    pub fn from_origin(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin, origin + size)
    }

    /// Box of the given size centred on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Move the box by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        self.min += delta;
        self.max += delta;
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point_in_box(point, self)
    }
}

/// Closed point-in-box test
#[inline]
pub fn point_in_box(point: Vec2, rect: &Rect) -> bool {
    point.x >= rect.min.x && point.x <= rect.max.x && point.y >= rect.min.y && point.y <= rect.max.y
}

/// Closed box overlap test (shared edges overlap)
#[inline]
pub fn boxes_overlap(a: &Rect, b: &Rect) -> bool {
    !(a.max.x < b.min.x || a.min.x > b.max.x || a.max.y < b.min.y || a.min.y > b.max.y)
}

/// Key of the item whose centre is Euclidean-nearest to `point`
///
/// Ties keep the earliest item, so iteration order decides.
pub fn nearest_to_point<K>(point: Vec2, items: impl IntoIterator<Item = (K, Vec2)>) -> Option<K> {
    let mut best: Option<(K, f32)> = None;
    for (key, center) in items {
        let dist_sq = center.distance_squared(point);
        match &best {
            Some((_, best_dist)) if dist_sq >= *best_dist => {}
            _ => best = Some((key, dist_sq)),
        }
    }
    best.map(|(key, _)| key)
}

/// Key of the item closest to a horizontal edge at `edge_y`
///
/// Items are given with their current y. Distance is `|edge_y - y|`; equal
/// distances prefer the item that has travelled further (larger y), then
/// the earliest item.
pub fn nearest_to_edge<K>(edge_y: f32, items: impl IntoIterator<Item = (K, f32)>) -> Option<K> {
    let mut best: Option<(K, f32, f32)> = None;
    for (key, y) in items {
        let dist = (edge_y - y).abs();
        let better = match &best {
            None => true,
            Some((_, best_dist, best_y)) => {
                dist < *best_dist || (dist == *best_dist && y > *best_y)
            }
        };
        if better {
            best = Some((key, dist, y));
        }
    }
    best.map(|(key, _, _)| key)
}

/// Shortest distance from `point` to the segment `a`-`b`
pub fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < 0.0001 {
        // Degenerate segment
        return point.distance(a);
    }
    let t = ((point - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Whether `point` lies on a stroked polyline with round caps and joins
pub fn point_on_polyline(point: Vec2, points: &[Vec2], half_width: f32) -> bool {
    match points {
        [] => false,
        [only] => point.distance(*only) <= half_width,
        _ => points
            .windows(2)
            .any(|w| distance_to_segment(point, w[0], w[1]) <= half_width),
    }
}
