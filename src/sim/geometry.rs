//! Points and axis-aligned collision bounds
//!
//! Screen space: x grows right, y grows down. All positions are immutable
//! values; movement produces a new `Point`.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An immutable 2D position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn with_x(self, x: f32) -> Self {
        Self::new(x, self.y)
    }

    pub fn with_y(self, y: f32) -> Self {
        Self::new(self.x, y)
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn up(self, count: f32) -> Self {
        Self::new(self.x, self.y - count)
    }

    pub fn down(self, count: f32) -> Self {
        Self::new(self.x, self.y + count)
    }

    pub fn left(self, count: f32) -> Self {
        Self::new(self.x - count, self.y)
    }

    pub fn right(self, count: f32) -> Self {
        Self::new(self.x + count, self.y)
    }

    /// Distance to another point
    pub fn distance(self, other: Point) -> f32 {
        Vec2::from(self).distance(Vec2::from(other))
    }
}

impl From<Vec2> for Point {
    #[inline]
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Point> for Vec2 {
    #[inline]
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point(x={}, y={})", self.x, self.y)
    }
}

/// Cardinal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Step `count` units from `from` in this direction
    pub fn step(self, from: Point, count: f32) -> Point {
        match self {
            Direction::Up => from.up(count),
            Direction::Down => from.down(count),
            Direction::Left => from.left(count),
            Direction::Right => from.right(count),
        }
    }
}

/// One rectangular collision region, as offsets from an actor's origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Bounds {
    pub const fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Place this region in world space at `origin`
    #[inline]
    pub fn at(&self, origin: Point) -> Rect {
        Rect {
            min: Vec2::new(origin.x + self.left, origin.y + self.top),
            max: Vec2::new(origin.x + self.right, origin.y + self.bottom),
        }
    }
}

/// A world-space rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Closed-interval overlap on both axes (shared edges count)
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

/// True if any region of mask `a` at `a_origin` overlaps any region of mask `b` at `b_origin`
pub fn masks_overlap(a: &[Bounds], a_origin: Point, b: &[Bounds], b_origin: Point) -> bool {
    a.iter().any(|ab| {
        let ar = ab.at(a_origin);
        b.iter().any(|bb| ar.intersects(&bb.at(b_origin)))
    })
}

/// World size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}
