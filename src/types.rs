//! Geometry primitives shared by objects, selections and hit-testing.
//!
//! World coordinates are `f32` and follow the screen convention (y grows
//! downwards). `Rect` is what objects store; `BBox` is what bounds
//! computations accumulate into.

use glam::Vec2;

/// Axis-aligned rectangle given by its top-left corner and its size
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect { x, y, width, height }
    }

    /// Create a rectangle centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let min = center - size / 2.0;
        Rect::new(min.x, min.y, size.x, size.y)
    }

    /// Top-left corner
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Check whether a point lies inside the rectangle.
    ///
    /// The top and left edges are inclusive, the bottom and right edges are not.
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// Check whether two rectangles share some area (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn bbox(&self) -> BBox {
        BBox {
            min: self.pos(),
            max: self.pos() + self.size(),
        }
    }
}

/// Axis-aligned bounding box, empty until expanded
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for BBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BBox {
    pub const EMPTY: BBox = BBox {
        min: Vec2::splat(f32::MAX),
        max: Vec2::splat(f32::MIN),
    };

    /// Create an empty bounding box (will expand on first point)
    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Check if the bbox is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: Vec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand to include another bounding box. Empty boxes are ignored.
    pub fn expand(&mut self, other: &BBox) {
        if other.is_empty() {
            return;
        }
        self.expand_point(other.min);
        self.expand_point(other.max);
    }

    /// Grow by `amount` on every side
    pub fn inflate(self, amount: f32) -> BBox {
        if self.is_empty() {
            return self;
        }
        BBox {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Convert to a `Rect`, `None` when empty
    pub fn to_rect(&self) -> Option<Rect> {
        if self.is_empty() {
            None
        } else {
            Some(Rect::new(self.min.x, self.min.y, self.width(), self.height()))
        }
    }
}
