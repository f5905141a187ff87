//! The editable scene
//!
//! [`Scene`] owns the objects and their history. Every mutation goes through
//! a [`SceneOp`] so it can be undone; hit-testing and validity checks are
//! pure queries over the current objects.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use glam::Vec2;

use crate::arena::copy_indices;
use crate::codec::{decode_text, encode_text};
use crate::defs::Definitions;
use crate::errors::{HistoryError, LoadError};
use crate::history::{History, SceneOp};
use crate::log::{info, warn};
use crate::object::{Building, Object, ObjectCollection, ObjectKind, Path, Shape, TextBox};
use crate::selection::Selection;

/// Objects, undo/redo history and hovered object of one layout
#[derive(Debug, Clone)]
pub struct Scene {
    objects: ObjectCollection,
    history: History,
    defs: Arc<Definitions>,
    hovered: Object,
}

impl Scene {
    pub fn new(defs: Arc<Definitions>) -> Self {
        Self {
            objects: ObjectCollection::new(),
            history: History::new(),
            defs,
            hovered: Object::NONE,
        }
    }

    pub fn objects(&self) -> &ObjectCollection {
        &self.objects
    }

    pub fn defs(&self) -> &Arc<Definitions> {
        &self.defs
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a path. No validity check is performed.
    pub fn add_path(&mut self, path: Path) {
        self.add_objects(ObjectCollection {
            paths: vec![path],
            ..Default::default()
        });
    }

    /// Add a building. No validity check is performed.
    pub fn add_building(&mut self, building: Building) {
        self.add_objects(ObjectCollection {
            buildings: vec![building],
            ..Default::default()
        });
    }

    pub fn add_text_box(&mut self, text_box: TextBox) {
        self.add_objects(ObjectCollection {
            text_boxes: vec![text_box],
            ..Default::default()
        });
    }

    /// Append `new` to the scene as one undoable step
    pub fn add_objects(&mut self, new: ObjectCollection) {
        self.record(SceneOp::Add { new });
    }

    /// Delete the selected objects.
    ///
    /// Only fully selected paths are deleted.
    pub fn delete_objects(&mut self, sel: &Selection) {
        let mut old = ObjectCollection::new();
        copy_indices(&mut old.paths, &self.objects.paths, &sel.full_path_indices());
        copy_indices(&mut old.buildings, &self.objects.buildings, sel.buildings());
        copy_indices(&mut old.text_boxes, &self.objects.text_boxes, sel.text_boxes());
        self.record(SceneOp::Delete { sel: sel.clone(), old });
    }

    /// Overwrite the selected objects with `new`.
    ///
    /// `new` lines up with the selection: one path per selected path
    /// (endpoint-only selections included), one building per selected
    /// building, one text box per selected text box.
    ///
    /// # Panics
    ///
    /// If the lengths of `new` do not match the selection.
    pub fn modify_objects(&mut self, sel: &Selection, new: ObjectCollection) {
        let path_idxs = sel.any_path_indices();
        assert_eq!(path_idxs.len(), new.paths.len(), "one new path per selected path");
        assert_eq!(sel.buildings().len(), new.buildings.len(), "one new building per selected building");
        assert_eq!(sel.text_boxes().len(), new.text_boxes.len(), "one new text box per selected text box");

        let mut old = ObjectCollection::new();
        copy_indices(&mut old.paths, &self.objects.paths, &path_idxs);
        copy_indices(&mut old.buildings, &self.objects.buildings, sel.buildings());
        copy_indices(&mut old.text_boxes, &self.objects.text_boxes, sel.text_boxes());
        self.record(SceneOp::Modify {
            sel: sel.clone(),
            old,
            new,
        });
    }

    fn record(&mut self, op: SceneOp) {
        self.trace_state("before", op.name());
        self.history.apply(op, &mut self.objects);
        self.hovered = Object::NONE;
        self.trace_state("after", "do");
    }

    /// Revert the last operation and return the selection to adopt
    pub fn undo(&mut self) -> Result<Selection, HistoryError> {
        self.trace_state("before", "undo");
        let sel = match self.history.undo(&mut self.objects, &self.defs) {
            Ok(sel) => sel,
            Err(e) => {
                warn!(reason = %e, "cannot undo operation");
                return Err(e);
            }
        };
        self.hovered = Object::NONE;
        self.trace_state("after", "undo");
        Ok(sel)
    }

    /// Perform the last undone operation again and return the selection to adopt
    pub fn redo(&mut self) -> Result<Selection, HistoryError> {
        self.trace_state("before", "redo");
        let sel = match self.history.redo(&mut self.objects, &self.defs) {
            Ok(sel) => sel,
            Err(e) => {
                warn!(reason = %e, "cannot redo operation");
                return Err(e);
            }
        };
        self.hovered = Object::NONE;
        self.trace_state("after", "redo");
        Ok(sel)
    }

    pub fn has_undo(&self) -> bool {
        self.history.has_undo()
    }

    pub fn has_redo(&self) -> bool {
        self.history.has_redo()
    }

    /// Whether the scene changed since it was created, loaded or last saved
    pub fn is_modified(&self) -> bool {
        self.history.is_modified()
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Object under `pos`, selected objects first.
    ///
    /// Priority, first match wins:
    /// 1. selected paths (selected endpoints, then body)
    /// 2. selected buildings
    /// 3. selected text boxes
    /// 4. paths (start, end, then body)
    /// 5. buildings
    /// 6. text boxes
    ///
    /// Selected groups are scanned in reverse selection order, not index
    /// order: the most recently selected object wins even when it has a
    /// lower index. Unselected groups are scanned from the highest index
    /// down, so the most recently added object wins.
    pub fn object_at(&self, pos: Vec2, sel: &Selection) -> Object {
        let defs = &*self.defs;
        let objects = &self.objects;

        for ps in sel.paths().iter().rev() {
            let p = &objects.paths[ps.idx];
            if ps.start && p.start_contains(defs, pos) {
                return Object::new(ObjectKind::PathStart, ps.idx);
            }
            if ps.end && p.end_contains(defs, pos) {
                return Object::new(ObjectKind::PathEnd, ps.idx);
            }
            if p.contains_point(defs, pos) {
                return Object::new(ObjectKind::Path, ps.idx);
            }
        }
        if let Some(&idx) = sel
            .buildings()
            .iter()
            .rev()
            .find(|&&i| objects.buildings[i].contains_point(defs, pos))
        {
            return Object::new(ObjectKind::Building, idx);
        }
        if let Some(&idx) = sel
            .text_boxes()
            .iter()
            .rev()
            .find(|&&i| objects.text_boxes[i].contains_point(defs, pos))
        {
            return Object::new(ObjectKind::TextBox, idx);
        }

        for (idx, p) in objects.paths.iter().enumerate().rev() {
            if p.start_contains(defs, pos) {
                return Object::new(ObjectKind::PathStart, idx);
            }
            if p.end_contains(defs, pos) {
                return Object::new(ObjectKind::PathEnd, idx);
            }
            if p.contains_point(defs, pos) {
                return Object::new(ObjectKind::Path, idx);
            }
        }
        if let Some(idx) = objects.buildings.iter().rposition(|b| b.contains_point(defs, pos)) {
            return Object::new(ObjectKind::Building, idx);
        }
        if let Some(idx) = objects.text_boxes.iter().rposition(|t| t.contains_point(defs, pos)) {
            return Object::new(ObjectKind::TextBox, idx);
        }

        Object::NONE
    }

    /// Recompute the hovered object for a pointer at `pos`
    pub fn update_hovered(&mut self, pos: Vec2, sel: &Selection) -> Object {
        self.hovered = self.object_at(pos, sel);
        self.hovered
    }

    /// Object under the pointer at the last [`Scene::update_hovered`].
    ///
    /// Reset to [`Object::NONE`] by every mutation, undo and redo.
    pub fn hovered(&self) -> Object {
        self.hovered
    }

    /// A path must not start where it ends
    pub fn is_path_valid(&self, path: &Path) -> bool {
        path.start != path.end
    }

    /// Whether `building` can be placed without overlapping another building.
    ///
    /// `ignore` skips one building, typically the one being moved.
    pub fn is_building_valid(&self, building: &Building, ignore: Option<usize>) -> bool {
        let footprint = building.footprint(&self.defs);
        self.objects
            .buildings
            .iter()
            .enumerate()
            .filter(|&(i, _)| Some(i) != ignore)
            .all(|(_, b)| !b.footprint(&self.defs).overlaps(&footprint))
    }

    // ========================================================================
    // Text I/O
    // ========================================================================

    /// Write the objects in the text format.
    ///
    /// The history is untouched; call [`Scene::mark_saved`] once the
    /// destination is known to be durable.
    pub fn save_to_text<W: Write>(&self, writer: W) -> io::Result<()> {
        info!(objects = self.objects.len(), "saving scene");
        encode_text(&self.objects, &self.defs, writer)
    }

    /// Build a scene from the text format.
    ///
    /// The new scene has an empty history and is not modified. On error no
    /// scene is produced.
    pub fn load_from_text<R: BufRead>(reader: R, defs: Arc<Definitions>) -> Result<Scene, LoadError> {
        let objects = decode_text(reader, &defs)?;
        info!(objects = objects.len(), "loaded scene");
        let mut scene = Scene::new(defs);
        scene.objects = objects;
        scene.trace_state("after", "load");
        Ok(scene)
    }

    #[cfg(feature = "tracing")]
    fn trace_state(&self, when: &'static str, action: &'static str) {
        crate::log::trace!(
            when,
            action,
            position = self.history.position(),
            saved_position = self.history.saved_position(),
            ops = self.history.len(),
            paths = ?self.objects.paths,
            buildings = ?self.objects.buildings,
            text_boxes = ?self.objects.text_boxes,
            "scene state"
        );
    }

    #[cfg(not(feature = "tracing"))]
    fn trace_state(&self, _when: &'static str, _action: &'static str) {}
}
