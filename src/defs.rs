//! Object definitions registry
//!
//! Paths and buildings only store the index of their definition. The
//! registry is owned by the caller and handed to the scene, so the same
//! index always resolves to the same class for the registry's lifetime.

use std::ops::Index;

use glam::Vec2;

/// Anything that can be looked up by class name
pub trait Definition {
    fn class(&self) -> &str;
}

/// Definition of a path class (belts, pipes, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct PathDef {
    pub class: String,
    /// Width of the path body
    pub width: f32,
}

impl PathDef {
    pub fn new(class: impl Into<String>, width: f32) -> Self {
        Self {
            class: class.into(),
            width,
        }
    }
}

impl Definition for PathDef {
    fn class(&self) -> &str {
        &self.class
    }
}

/// Definition of a building class
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingDef {
    pub class: String,
    /// Footprint at rotation 0
    pub size: Vec2,
}

impl BuildingDef {
    pub fn new(class: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            class: class.into(),
            size: Vec2::new(width, height),
        }
    }
}

impl Definition for BuildingDef {
    fn class(&self) -> &str {
        &self.class
    }
}

/// Ordered list of definitions of one kind
#[derive(Debug, Clone)]
pub struct Registry<D> {
    defs: Vec<D>,
}

impl<D> Default for Registry<D> {
    fn default() -> Self {
        Self { defs: Vec::new() }
    }
}

impl<D: Definition> Registry<D> {
    pub fn new(defs: Vec<D>) -> Self {
        Self { defs }
    }

    /// Index of the definition with exactly this class name
    pub fn index_of(&self, class: &str) -> Option<usize> {
        self.defs.iter().position(|d| d.class() == class)
    }

    pub fn get(&self, idx: usize) -> Option<&D> {
        self.defs.get(idx)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.defs.iter()
    }
}

impl<D> Index<usize> for Registry<D> {
    type Output = D;

    fn index(&self, idx: usize) -> &D {
        &self.defs[idx]
    }
}

/// Path and building registries, in lookup order
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    pub paths: Registry<PathDef>,
    pub buildings: Registry<BuildingDef>,
}

impl Definitions {
    pub fn new(paths: Vec<PathDef>, buildings: Vec<BuildingDef>) -> Self {
        Self {
            paths: Registry::new(paths),
            buildings: Registry::new(buildings),
        }
    }

    /// Path definition at `idx`. Panics on an index the registry never handed out.
    pub fn path(&self, idx: usize) -> &PathDef {
        &self.paths[idx]
    }

    /// Building definition at `idx`. Panics on an index the registry never handed out.
    pub fn building(&self, idx: usize) -> &BuildingDef {
        &self.buildings[idx]
    }

    pub fn path_index(&self, class: &str) -> Option<usize> {
        self.paths.index_of(class)
    }

    pub fn building_index(&self, class: &str) -> Option<usize> {
        self.buildings.index_of(class)
    }
}
