//! Scene objects
//!
//! Each object type knows how to:
//! - Calculate its bounding box
//! - Test whether a world-space point hits it
//!
//! Objects have no identity besides their position in the
//! [`ObjectCollection`]; an [`Object`] is a kind + index reference into it.

use std::fmt;

use enum_dispatch::enum_dispatch;
use glam::Vec2;

use crate::defaults::ENDPOINT_RADIUS_SCALE;
use crate::defs::Definitions;
use crate::types::{BBox, Rect};

/// Common behavior for all objects
#[enum_dispatch]
pub trait Shape {
    /// Bounding box of the whole object
    fn bounds(&self, defs: &Definitions) -> BBox;

    /// Whether `pos` hits the object
    fn contains_point(&self, defs: &Definitions, pos: Vec2) -> bool;
}

// ============================================================================
// Object Types
// ============================================================================

/// A path (belt, pipe, ...) between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Path {
    /// Index into the path definitions
    pub def: usize,
    pub start: Vec2,
    pub end: Vec2,
}

impl Path {
    pub fn new(def: usize, start: Vec2, end: Vec2) -> Self {
        Self { def, start, end }
    }

    fn endpoint_radius(&self, defs: &Definitions) -> f32 {
        defs.path(self.def).width * ENDPOINT_RADIUS_SCALE
    }

    /// Whether `pos` hits the start endpoint zone
    pub fn start_contains(&self, defs: &Definitions, pos: Vec2) -> bool {
        pos.distance(self.start) <= self.endpoint_radius(defs)
    }

    /// Whether `pos` hits the end endpoint zone
    pub fn end_contains(&self, defs: &Definitions, pos: Vec2) -> bool {
        pos.distance(self.end) <= self.endpoint_radius(defs)
    }
}

impl Shape for Path {
    fn bounds(&self, defs: &Definitions) -> BBox {
        let mut bb = BBox::new();
        bb.expand_point(self.start);
        bb.expand_point(self.end);
        bb.inflate(defs.path(self.def).width / 2.0)
    }

    fn contains_point(&self, defs: &Definitions, pos: Vec2) -> bool {
        distance_to_segment(pos, self.start, self.end) <= defs.path(self.def).width / 2.0
    }
}

/// Distance from `p` to the segment `[a, b]`
fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// A building placed at its center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    /// Index into the building definitions
    pub def: usize,
    /// Center of the footprint
    pub pos: Vec2,
    /// Rotation in degrees
    pub rot: i32,
}

impl Building {
    pub fn new(def: usize, pos: Vec2, rot: i32) -> Self {
        Self { def, pos, rot }
    }

    /// Footprint in world space; quarter turns swap width and height
    pub fn footprint(&self, defs: &Definitions) -> Rect {
        let size = defs.building(self.def).size;
        let size = match self.rot.rem_euclid(360) {
            90 | 270 => Vec2::new(size.y, size.x),
            _ => size,
        };
        Rect::from_center(self.pos, size)
    }
}

impl Shape for Building {
    fn bounds(&self, defs: &Definitions) -> BBox {
        self.footprint(defs).bbox()
    }

    fn contains_point(&self, defs: &Definitions, pos: Vec2) -> bool {
        self.footprint(defs).contains_point(pos)
    }
}

/// A free text annotation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBox {
    pub bounds: Rect,
    pub content: String,
}

impl TextBox {
    pub fn new(bounds: Rect, content: impl Into<String>) -> Self {
        Self {
            bounds,
            content: content.into(),
        }
    }
}

impl Shape for TextBox {
    fn bounds(&self, _defs: &Definitions) -> BBox {
        self.bounds.bbox()
    }

    fn contains_point(&self, _defs: &Definitions, pos: Vec2) -> bool {
        self.bounds.contains_point(pos)
    }
}

/// Any object, by value
#[enum_dispatch(Shape)]
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectValue {
    Path(Path),
    Building(Building),
    TextBox(TextBox),
}

// ============================================================================
// Object References
// ============================================================================

/// What an [`Object`] reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectKind {
    #[default]
    None,
    /// Start endpoint of a path
    PathStart,
    /// End endpoint of a path
    PathEnd,
    /// Whole path
    Path,
    Building,
    TextBox,
}

/// Reference to an object: kind + index into the matching sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Object {
    pub kind: ObjectKind,
    pub idx: usize,
}

impl Object {
    /// The empty reference
    pub const NONE: Object = Object {
        kind: ObjectKind::None,
        idx: 0,
    };

    pub const fn new(kind: ObjectKind, idx: usize) -> Self {
        Self { kind, idx }
    }

    pub fn is_none(&self) -> bool {
        self.kind == ObjectKind::None
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ObjectKind::None => write!(f, "none"),
            ObjectKind::PathStart => write!(f, "path[{}].start", self.idx),
            ObjectKind::PathEnd => write!(f, "path[{}].end", self.idx),
            ObjectKind::Path => write!(f, "path[{}]", self.idx),
            ObjectKind::Building => write!(f, "building[{}]", self.idx),
            ObjectKind::TextBox => write!(f, "textbox[{}]", self.idx),
        }
    }
}

// ============================================================================
// Object Collection
// ============================================================================

/// The scene objects, one dense sequence per kind
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectCollection {
    pub paths: Vec<Path>,
    pub buildings: Vec<Building>,
    pub text_boxes: Vec<TextBox>,
}

impl ObjectCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of objects
    pub fn len(&self) -> usize {
        self.paths.len() + self.buildings.len() + self.text_boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an object to the sequence of its kind
    pub fn push(&mut self, value: impl Into<ObjectValue>) {
        match value.into() {
            ObjectValue::Path(p) => self.paths.push(p),
            ObjectValue::Building(b) => self.buildings.push(b),
            ObjectValue::TextBox(tb) => self.text_boxes.push(tb),
        }
    }

    /// Append every object of `other`, keeping per-kind order
    pub fn extend(&mut self, other: ObjectCollection) {
        self.paths.extend(other.paths);
        self.buildings.extend(other.buildings);
        self.text_boxes.extend(other.text_boxes);
    }

    /// Resolve a reference. Endpoint references resolve to their path.
    pub fn get(&self, obj: Object) -> Option<ObjectValue> {
        match obj.kind {
            ObjectKind::None => None,
            ObjectKind::PathStart | ObjectKind::PathEnd | ObjectKind::Path => {
                self.paths.get(obj.idx).copied().map(ObjectValue::from)
            }
            ObjectKind::Building => self.buildings.get(obj.idx).copied().map(ObjectValue::from),
            ObjectKind::TextBox => self.text_boxes.get(obj.idx).cloned().map(ObjectValue::from),
        }
    }
}
