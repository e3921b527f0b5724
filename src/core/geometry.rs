// File: src/core/geometry.rs
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// A 2D sample in window or layout space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    /// Distance from the origin.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, o: Point) -> Point {
        Point::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, o: Point) -> Point {
        Point::new(self.x - o.x, self.y - o.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, s: f64) -> Point {
        Point::new(self.x * s, self.y * s)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, s: f64) -> Point {
        Point::new(self.x / s, self.y / s)
    }
}

/// Axis-aligned rectangle. Edges are inclusive for hit-testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Sum of segment lengths along the polyline.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::default();
    }
    let sum = points.iter().fold(Point::default(), |acc, p| acc + *p);
    sum / points.len() as f64
}

/// Resamples a polyline to exactly `n` points spaced evenly by arc length.
///
/// Degenerate inputs (a single point, or all points coincident) yield `n`
/// copies of the first point.
pub fn resample_uniform(points: &[Point], n: usize) -> Vec<Point> {
    if points.is_empty() || n == 0 {
        return Vec::new();
    }
    if points.len() == 1 || n == 1 {
        return vec![points[0]; n];
    }

    let total = path_length(points);
    if total < 1e-9 {
        return vec![points[0]; n];
    }

    let interval = total / (n - 1) as f64;
    let mut result = Vec::with_capacity(n);
    result.push(points[0]);

    let mut accumulated = 0.0;
    let mut next = 1usize;
    for seg in points.windows(2) {
        if result.len() >= n {
            break;
        }
        let (a, b) = (seg[0], seg[1]);
        let seg_len = a.distance_to(&b);

        while result.len() < n && accumulated + seg_len >= interval * next as f64 {
            let t = if seg_len > 0.0 {
                ((interval * next as f64 - accumulated) / seg_len).clamp(0.0, 1.0)
            } else {
                0.0
            };
            result.push(a + (b - a) * t);
            next += 1;
        }
        accumulated += seg_len;
    }

    // Floating-point drift can leave the tail short by a point or two.
    let last = points[points.len() - 1];
    while result.len() < n {
        result.push(last);
    }
    result
}

/// Translates the centroid to the origin and scales so the farthest point
/// sits at unit radius.
pub fn normalize_shape(points: &[Point]) -> Vec<Point> {
    if points.is_empty() {
        return Vec::new();
    }
    let c = centroid(points);
    let centered: Vec<Point> = points.iter().map(|p| *p - c).collect();

    let max_radius = centered.iter().map(Point::magnitude).fold(0.0, f64::max);
    if max_radius < 1e-9 {
        return centered;
    }
    centered.into_iter().map(|p| p / max_radius).collect()
}

/// Average point-wise distance between two equally long sequences.
/// Returns `None` when the lengths differ or the sequences are empty.
pub fn mean_pointwise_distance(a: &[Point], b: &[Point]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let sum: f64 = a.iter().zip(b).map(|(p, q)| p.distance_to(q)).sum();
    Some(sum / a.len() as f64)
}
