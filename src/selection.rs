//! Object selection
//!
//! A selection is a set of indices into each sequence of an
//! [`ObjectCollection`]. Paths additionally record which endpoints are
//! selected: both flags set means the whole path is selected, a single flag
//! means only that endpoint is (e.g. while dragging one end of a belt).

use crate::defs::Definitions;
use crate::object::{Object, ObjectCollection, ObjectKind, Shape};
use crate::types::BBox;

/// Selection state of one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSel {
    pub idx: usize,
    pub start: bool,
    pub end: bool,
}

impl PathSel {
    /// Whole path selected
    pub fn full(idx: usize) -> Self {
        Self {
            idx,
            start: true,
            end: true,
        }
    }

    pub fn is_full(&self) -> bool {
        self.start && self.end
    }
}

/// Indices of selected objects, in selection order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    paths: Vec<PathSel>,
    buildings: Vec<usize>,
    text_boxes: Vec<usize>,
    bounds: BBox,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection over the objects an add operation just appended at the tail
    /// of `objects`, with every path fully selected.
    pub fn for_added_range(objects: &ObjectCollection, defs: &Definitions, added: &ObjectCollection) -> Self {
        let paths = objects.paths.len() - added.paths.len()..objects.paths.len();
        let buildings = objects.buildings.len() - added.buildings.len()..objects.buildings.len();
        let text_boxes = objects.text_boxes.len() - added.text_boxes.len()..objects.text_boxes.len();

        let mut sel = Selection {
            paths: paths.map(PathSel::full).collect(),
            buildings: buildings.collect(),
            text_boxes: text_boxes.collect(),
            bounds: BBox::new(),
        };
        sel.recompute_bounds(objects, defs);
        sel
    }

    pub fn paths(&self) -> &[PathSel] {
        &self.paths
    }

    pub fn buildings(&self) -> &[usize] {
        &self.buildings
    }

    pub fn text_boxes(&self) -> &[usize] {
        &self.text_boxes
    }

    /// Number of selection entries (a partially selected path counts once)
    pub fn len(&self) -> usize {
        self.paths.len() + self.buildings.len() + self.text_boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Select (part of) a path. Flags are merged into an existing entry.
    pub fn add_path(&mut self, idx: usize, start: bool, end: bool) {
        if let Some(p) = self.paths.iter_mut().find(|p| p.idx == idx) {
            p.start |= start;
            p.end |= end;
        } else if start || end {
            self.paths.push(PathSel { idx, start, end });
        }
    }

    pub fn add_building(&mut self, idx: usize) {
        if !self.buildings.contains(&idx) {
            self.buildings.push(idx);
        }
    }

    pub fn add_text_box(&mut self, idx: usize) {
        if !self.text_boxes.contains(&idx) {
            self.text_boxes.push(idx);
        }
    }

    /// Add the referenced object (or path endpoint)
    pub fn add(&mut self, obj: Object) {
        match obj.kind {
            ObjectKind::None => {}
            ObjectKind::PathStart => self.add_path(obj.idx, true, false),
            ObjectKind::PathEnd => self.add_path(obj.idx, false, true),
            ObjectKind::Path => self.add_path(obj.idx, true, true),
            ObjectKind::Building => self.add_building(obj.idx),
            ObjectKind::TextBox => self.add_text_box(obj.idx),
        }
    }

    /// Remove the referenced object. Removing an endpoint clears its flag and
    /// drops the entry once neither endpoint is left.
    pub fn remove(&mut self, obj: Object) {
        match obj.kind {
            ObjectKind::None => {}
            ObjectKind::PathStart | ObjectKind::PathEnd | ObjectKind::Path => {
                if let Some(p) = self.paths.iter_mut().find(|p| p.idx == obj.idx) {
                    match obj.kind {
                        ObjectKind::PathStart => p.start = false,
                        ObjectKind::PathEnd => p.end = false,
                        _ => {
                            p.start = false;
                            p.end = false;
                        }
                    }
                }
                self.paths.retain(|p| p.start || p.end);
            }
            ObjectKind::Building => self.buildings.retain(|&i| i != obj.idx),
            ObjectKind::TextBox => self.text_boxes.retain(|&i| i != obj.idx),
        }
    }

    /// Indices of fully selected paths, the only ones a delete removes
    pub fn full_path_indices(&self) -> Vec<usize> {
        self.paths.iter().filter(|p| p.is_full()).map(|p| p.idx).collect()
    }

    /// Indices of all paths with any part selected, the ones a modify touches
    pub fn any_path_indices(&self) -> Vec<usize> {
        self.paths.iter().map(|p| p.idx).collect()
    }

    /// Check whether the referenced object is selected.
    ///
    /// A whole-path reference needs both endpoints, an endpoint reference
    /// needs its own flag.
    pub fn contains(&self, obj: Object) -> bool {
        let path = || self.paths.iter().find(|p| p.idx == obj.idx);
        match obj.kind {
            ObjectKind::None => false,
            ObjectKind::PathStart => path().is_some_and(|p| p.start),
            ObjectKind::PathEnd => path().is_some_and(|p| p.end),
            ObjectKind::Path => path().is_some_and(|p| p.is_full()),
            ObjectKind::Building => self.buildings.contains(&obj.idx),
            ObjectKind::TextBox => self.text_boxes.contains(&obj.idx),
        }
    }

    /// Iterate over the selection as object references
    pub fn objects(&self) -> impl Iterator<Item = Object> + '_ {
        let paths = self.paths.iter().map(|p| {
            let kind = match (p.start, p.end) {
                (true, false) => ObjectKind::PathStart,
                (false, true) => ObjectKind::PathEnd,
                _ => ObjectKind::Path,
            };
            Object::new(kind, p.idx)
        });
        let buildings = self.buildings.iter().map(|&i| Object::new(ObjectKind::Building, i));
        let text_boxes = self.text_boxes.iter().map(|&i| Object::new(ObjectKind::TextBox, i));
        paths.chain(buildings).chain(text_boxes)
    }

    /// Cached bounds; empty when the selection is empty
    pub fn bounds(&self) -> BBox {
        self.bounds
    }

    /// Recompute the cached bounds from the selected objects.
    ///
    /// Partially selected paths contribute their whole body.
    pub fn recompute_bounds(&mut self, objects: &ObjectCollection, defs: &Definitions) {
        let mut bounds = BBox::new();
        for p in &self.paths {
            bounds.expand(&objects.paths[p.idx].bounds(defs));
        }
        for &i in &self.buildings {
            bounds.expand(&objects.buildings[i].bounds(defs));
        }
        for &i in &self.text_boxes {
            bounds.expand(&objects.text_boxes[i].bounds(defs));
        }
        self.bounds = bounds;
    }

    /// Per-index selected flag of the buildings, in natural order
    pub fn buildings_mask(&self) -> MaskIter {
        MaskIter::new(&self.buildings)
    }

    /// Per-index selected flag of the text boxes, in natural order
    pub fn text_boxes_mask(&self) -> MaskIter {
        MaskIter::new(&self.text_boxes)
    }

    /// Per-index `(start, end)` flags of the paths, in natural order
    pub fn paths_mask(&self) -> PathMaskIter {
        PathMaskIter::new(&self.paths)
    }
}

// ============================================================================
// Mask Iterators
// ============================================================================

/// Yields one flag per index `0, 1, 2, ...`, `true` when selected.
///
/// Never ends: zip it with the traversal of the matching sequence.
#[derive(Debug, Clone)]
pub struct MaskIter {
    sorted: Vec<usize>,
    next_sel: usize,
    pos: usize,
}

impl MaskIter {
    fn new(indices: &[usize]) -> Self {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        Self {
            sorted,
            next_sel: 0,
            pos: 0,
        }
    }
}

impl Iterator for MaskIter {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        let hit = self.sorted.get(self.next_sel) == Some(&self.pos);
        if hit {
            self.next_sel += 1;
        }
        self.pos += 1;
        Some(hit)
    }
}

/// Yields one `(start, end)` pair per path index `0, 1, 2, ...`.
///
/// Never ends: zip it with the traversal of the paths.
#[derive(Debug, Clone)]
pub struct PathMaskIter {
    sorted: Vec<PathSel>,
    next_sel: usize,
    pos: usize,
}

impl PathMaskIter {
    fn new(paths: &[PathSel]) -> Self {
        let mut sorted = paths.to_vec();
        sorted.sort_unstable_by_key(|p| p.idx);
        Self {
            sorted,
            next_sel: 0,
            pos: 0,
        }
    }
}

impl Iterator for PathMaskIter {
    type Item = (bool, bool);

    fn next(&mut self) -> Option<(bool, bool)> {
        let flags = match self.sorted.get(self.next_sel) {
            Some(p) if p.idx == self.pos => {
                self.next_sel += 1;
                (p.start, p.end)
            }
            _ => (false, false),
        };
        self.pos += 1;
        Some(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{BuildingDef, PathDef};
    use crate::object::{Building, Path, TextBox};
    use crate::types::Rect;
    use glam::vec2;

    fn defs() -> Definitions {
        Definitions::new(
            vec![PathDef::new("Belt", 1.0)],
            vec![BuildingDef::new("Splitter", 4.0, 4.0)],
        )
    }

    fn sample() -> Selection {
        let mut sel = Selection::new();
        sel.add_path(2, true, true);
        sel.add_path(0, false, true);
        sel.add_building(1);
        sel.add_text_box(0);
        sel
    }

    #[test]
    fn derived_path_views() {
        let sel = sample();
        assert_eq!(sel.full_path_indices(), vec![2]);
        assert_eq!(sel.any_path_indices(), vec![2, 0]);
    }

    #[test]
    fn path_flags_merge() {
        let mut sel = Selection::new();
        sel.add_path(3, true, false);
        sel.add_path(3, false, true);
        assert_eq!(sel.paths(), &[PathSel::full(3)]);

        sel.add_path(4, false, false);
        assert_eq!(sel.len(), 1, "empty flags select nothing");
    }

    #[test]
    fn contains_respects_endpoint_flags() {
        let sel = sample();
        assert!(sel.contains(Object::new(ObjectKind::Path, 2)));
        assert!(sel.contains(Object::new(ObjectKind::PathStart, 2)));
        assert!(sel.contains(Object::new(ObjectKind::PathEnd, 0)));
        assert!(!sel.contains(Object::new(ObjectKind::PathStart, 0)));
        assert!(!sel.contains(Object::new(ObjectKind::Path, 0)));
        assert!(sel.contains(Object::new(ObjectKind::Building, 1)));
        assert!(!sel.contains(Object::new(ObjectKind::Building, 0)));
        assert!(sel.contains(Object::new(ObjectKind::TextBox, 0)));
        assert!(!sel.contains(Object::NONE));
    }

    #[test]
    fn remove_endpoint_then_path() {
        let mut sel = sample();
        sel.remove(Object::new(ObjectKind::PathStart, 2));
        assert_eq!(sel.full_path_indices(), Vec::<usize>::new());
        assert!(sel.contains(Object::new(ObjectKind::PathEnd, 2)));

        sel.remove(Object::new(ObjectKind::PathEnd, 0));
        assert_eq!(sel.any_path_indices(), vec![2]);

        sel.remove(Object::new(ObjectKind::Path, 2));
        sel.remove(Object::new(ObjectKind::Building, 1));
        sel.remove(Object::new(ObjectKind::TextBox, 0));
        assert!(sel.is_empty());
    }

    #[test]
    fn objects_iteration() {
        let objs: Vec<Object> = sample().objects().collect();
        assert_eq!(
            objs,
            vec![
                Object::new(ObjectKind::Path, 2),
                Object::new(ObjectKind::PathEnd, 0),
                Object::new(ObjectKind::Building, 1),
                Object::new(ObjectKind::TextBox, 0),
            ]
        );
    }

    #[test]
    fn masks_follow_natural_order() {
        let sel = sample();
        let buildings: Vec<bool> = sel.buildings_mask().take(3).collect();
        assert_eq!(buildings, vec![false, true, false]);

        let paths: Vec<(bool, bool)> = sel.paths_mask().take(4).collect();
        assert_eq!(
            paths,
            vec![(false, true), (false, false), (true, true), (false, false)]
        );
    }

    #[test]
    fn bounds_union_and_empty() {
        let defs = defs();
        let mut objects = ObjectCollection::new();
        objects.push(Path::new(0, vec2(0.0, 0.0), vec2(10.0, 0.0)));
        objects.push(Building::new(0, vec2(20.0, 20.0), 0));
        objects.push(TextBox::new(Rect::new(-5.0, -5.0, 1.0, 1.0), "x"));

        let mut sel = Selection::new();
        sel.recompute_bounds(&objects, &defs);
        assert!(sel.bounds().is_empty());

        sel.add_path(0, true, false);
        sel.add_building(0);
        sel.recompute_bounds(&objects, &defs);
        assert_eq!(sel.bounds().to_rect(), Some(Rect::new(-0.5, -0.5, 22.5, 22.5)));

        sel.add_text_box(0);
        sel.recompute_bounds(&objects, &defs);
        assert_eq!(sel.bounds().min, vec2(-5.0, -5.0));
    }

    #[test]
    fn added_range_selects_tail() {
        let defs = defs();
        let mut objects = ObjectCollection::new();
        objects.push(Building::new(0, vec2(0.0, 0.0), 0));
        let mut added = ObjectCollection::new();
        added.push(Building::new(0, vec2(10.0, 0.0), 0));
        added.push(Path::new(0, vec2(2.0, 0.0), vec2(8.0, 0.0)));
        objects.extend(added.clone());

        let sel = Selection::for_added_range(&objects, &defs, &added);
        assert_eq!(sel.buildings(), &[1]);
        assert_eq!(sel.paths(), &[PathSel::full(0)]);
        assert!(sel.text_boxes().is_empty());
        assert_eq!(sel.bounds().to_rect(), Some(Rect::new(1.5, -2.0, 10.5, 4.0)));
    }
}
