//! Undo/redo history of scene operations
//!
//! Every mutation of the scene is recorded as a [`SceneOp`] carrying enough
//! state to replay it in both directions. [`History`] keeps the operations
//! and a cursor:
//! - `ops[..position]` have been done
//! - `ops[position..]` have been undone and can be redone
//!
//! Recording a new operation drops everything after the cursor.

use crate::arena::{swap_delete_many, swap_insert_many};
use crate::defs::Definitions;
use crate::errors::HistoryError;
use crate::log::{debug, info};
use crate::object::ObjectCollection;
use crate::selection::Selection;

/// A reversible scene mutation
#[derive(Debug, Clone, PartialEq)]
pub enum SceneOp {
    /// Objects appended at the tail of each sequence
    Add { new: ObjectCollection },
    /// Objects swap-removed.
    ///
    /// `old.paths` only holds the fully selected paths, endpoint-only
    /// selections are not deleted.
    Delete { sel: Selection, old: ObjectCollection },
    /// Objects overwritten in place.
    ///
    /// `old.paths` and `new.paths` line up with every selected path,
    /// including endpoint-only selections.
    Modify {
        sel: Selection,
        old: ObjectCollection,
        new: ObjectCollection,
    },
}

impl SceneOp {
    pub fn name(&self) -> &'static str {
        match self {
            SceneOp::Add { .. } => "add",
            SceneOp::Delete { .. } => "delete",
            SceneOp::Modify { .. } => "modify",
        }
    }

    /// Selection the operation acts on, `None` for adds
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            SceneOp::Add { .. } => None,
            SceneOp::Delete { sel, .. } | SceneOp::Modify { sel, .. } => Some(sel),
        }
    }

    /// Perform the operation for the first time
    pub(crate) fn apply(&self, objects: &mut ObjectCollection) {
        info!(op = self.name(), "scene operation do");
        self.forward(objects, "do");
    }

    /// Perform the operation again and return the selection to adopt
    pub(crate) fn redo(&self, objects: &mut ObjectCollection, defs: &Definitions) -> Selection {
        info!(op = self.name(), "scene operation redo");
        self.forward(objects, "redo");
        match self {
            SceneOp::Add { new } => Selection::for_added_range(objects, defs, new),
            SceneOp::Delete { .. } => Selection::new(),
            SceneOp::Modify { sel, .. } => {
                let mut sel = sel.clone();
                sel.recompute_bounds(objects, defs);
                sel
            }
        }
    }

    /// Revert the operation and return the selection to adopt
    pub(crate) fn undo(&self, objects: &mut ObjectCollection, defs: &Definitions) -> Selection {
        info!(op = self.name(), "scene operation undo");
        match self {
            SceneOp::Add { new } => {
                debug!(
                    action = "undo",
                    num_paths = new.paths.len(),
                    num_buildings = new.buildings.len(),
                    num_text_boxes = new.text_boxes.len(),
                    "scene operation add"
                );
                objects.paths.truncate(objects.paths.len() - new.paths.len());
                objects.buildings.truncate(objects.buildings.len() - new.buildings.len());
                objects.text_boxes.truncate(objects.text_boxes.len() - new.text_boxes.len());
                Selection::new()
            }
            SceneOp::Delete { sel, old } => {
                let path_idxs = sel.full_path_indices();
                debug!(
                    action = "undo",
                    paths = ?path_idxs,
                    buildings = ?sel.buildings(),
                    text_boxes = ?sel.text_boxes(),
                    "scene operation delete"
                );
                swap_insert_many(&mut objects.paths, &path_idxs, &old.paths);
                swap_insert_many(&mut objects.buildings, sel.buildings(), &old.buildings);
                swap_insert_many(&mut objects.text_boxes, sel.text_boxes(), &old.text_boxes);
                let mut sel = sel.clone();
                sel.recompute_bounds(objects, defs);
                sel
            }
            SceneOp::Modify { sel, old, .. } => {
                debug!(
                    action = "undo",
                    paths = ?sel.any_path_indices(),
                    buildings = ?sel.buildings(),
                    text_boxes = ?sel.text_boxes(),
                    "scene operation modify"
                );
                overwrite(objects, sel, old);
                let mut sel = sel.clone();
                sel.recompute_bounds(objects, defs);
                sel
            }
        }
    }

    /// Forward transition, shared by do and redo
    fn forward(&self, objects: &mut ObjectCollection, action: &'static str) {
        match self {
            SceneOp::Add { new } => {
                debug!(
                    action,
                    num_paths = new.paths.len(),
                    num_buildings = new.buildings.len(),
                    num_text_boxes = new.text_boxes.len(),
                    "scene operation add"
                );
                objects.paths.extend_from_slice(&new.paths);
                objects.buildings.extend_from_slice(&new.buildings);
                objects.text_boxes.extend_from_slice(&new.text_boxes);
            }
            SceneOp::Delete { sel, .. } => {
                let path_idxs = sel.full_path_indices();
                debug!(
                    action,
                    paths = ?path_idxs,
                    buildings = ?sel.buildings(),
                    text_boxes = ?sel.text_boxes(),
                    "scene operation delete"
                );
                swap_delete_many(&mut objects.paths, &path_idxs);
                swap_delete_many(&mut objects.buildings, sel.buildings());
                swap_delete_many(&mut objects.text_boxes, sel.text_boxes());
            }
            SceneOp::Modify { sel, new, .. } => {
                debug!(
                    action,
                    paths = ?sel.any_path_indices(),
                    buildings = ?sel.buildings(),
                    text_boxes = ?sel.text_boxes(),
                    "scene operation modify"
                );
                overwrite(objects, sel, new);
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = action;
    }
}

/// Write `values` at the selected indices, paired by position
fn overwrite(objects: &mut ObjectCollection, sel: &Selection, values: &ObjectCollection) {
    let path_idxs = sel.any_path_indices();
    assert_eq!(path_idxs.len(), values.paths.len(), "one path per selected path");
    assert_eq!(sel.buildings().len(), values.buildings.len(), "one building per selected building");
    assert_eq!(sel.text_boxes().len(), values.text_boxes.len(), "one text box per selected text box");

    for (idx, p) in path_idxs.into_iter().zip(&values.paths) {
        objects.paths[idx] = *p;
    }
    for (&idx, b) in sel.buildings().iter().zip(&values.buildings) {
        objects.buildings[idx] = *b;
    }
    for (&idx, tb) in sel.text_boxes().iter().zip(&values.text_boxes) {
        objects.text_boxes[idx] = tb.clone();
    }
}

/// Linear undo/redo history with a saved checkpoint
#[derive(Debug, Clone, Default)]
pub struct History {
    ops: Vec<SceneOp>,
    /// `ops[..position]` are done, `ops[position..]` are undone
    position: usize,
    /// `position` at the last save
    saved_position: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop undone operations, perform `op` and record it
    pub(crate) fn apply(&mut self, op: SceneOp, objects: &mut ObjectCollection) {
        self.ops.truncate(self.position);
        op.apply(objects);
        self.ops.push(op);
        self.position += 1;
    }

    /// Revert the last done operation
    pub fn undo(&mut self, objects: &mut ObjectCollection, defs: &Definitions) -> Result<Selection, HistoryError> {
        if self.position == 0 {
            return Err(HistoryError::NothingToUndo);
        }
        self.position -= 1;
        Ok(self.ops[self.position].undo(objects, defs))
    }

    /// Perform the last undone operation again
    pub fn redo(&mut self, objects: &mut ObjectCollection, defs: &Definitions) -> Result<Selection, HistoryError> {
        if self.position == self.ops.len() {
            return Err(HistoryError::NothingToRedo);
        }
        let sel = self.ops[self.position].redo(objects, defs);
        self.position += 1;
        Ok(sel)
    }

    pub fn has_undo(&self) -> bool {
        self.position > 0
    }

    pub fn has_redo(&self) -> bool {
        self.position < self.ops.len()
    }

    /// Whether the position moved away from the last save
    pub fn is_modified(&self) -> bool {
        self.position != self.saved_position
    }

    pub fn mark_saved(&mut self) {
        self.saved_position = self.position;
        debug!(saved_position = self.saved_position, "history marked saved");
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn saved_position(&self) -> usize {
        self.saved_position
    }

    /// Recorded operations, done and undone
    pub fn ops(&self) -> &[SceneOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
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
            vec![BuildingDef::new("Merger", 4.0, 4.0)],
        )
    }

    fn add_op(x: f32) -> SceneOp {
        let mut new = ObjectCollection::new();
        new.push(Building::new(0, vec2(x, 0.0), 0));
        SceneOp::Add { new }
    }

    #[test]
    fn apply_undo_redo_cycle() {
        let defs = defs();
        let mut objects = ObjectCollection::new();
        let mut history = History::new();
        assert!(!history.has_undo());
        assert!(!history.has_redo());

        history.apply(add_op(0.0), &mut objects);
        history.apply(add_op(10.0), &mut objects);
        assert_eq!(objects.buildings.len(), 2);
        assert_eq!(history.position(), 2);

        let sel = history.undo(&mut objects, &defs).unwrap();
        assert!(sel.is_empty());
        assert_eq!(objects.buildings.len(), 1);
        assert!(history.has_redo());

        let sel = history.redo(&mut objects, &defs).unwrap();
        assert_eq!(sel.buildings(), &[1]);
        assert!(!sel.bounds().is_empty());
        assert_eq!(objects.buildings[1].pos, vec2(10.0, 0.0));
    }

    #[test]
    fn underflow_is_reported() {
        let defs = defs();
        let mut objects = ObjectCollection::new();
        let mut history = History::new();
        assert_eq!(history.undo(&mut objects, &defs), Err(HistoryError::NothingToUndo));
        assert_eq!(history.redo(&mut objects, &defs), Err(HistoryError::NothingToRedo));

        history.apply(add_op(0.0), &mut objects);
        assert_eq!(history.redo(&mut objects, &defs), Err(HistoryError::NothingToRedo));
        assert_eq!(history.position(), 1);
    }

    #[test]
    fn apply_after_undo_truncates() {
        let defs = defs();
        let mut objects = ObjectCollection::new();
        let mut history = History::new();
        history.apply(add_op(0.0), &mut objects);
        history.apply(add_op(10.0), &mut objects);
        history.apply(add_op(20.0), &mut objects);
        history.undo(&mut objects, &defs).unwrap();
        history.undo(&mut objects, &defs).unwrap();

        history.apply(add_op(30.0), &mut objects);
        assert!(!history.has_redo());
        assert_eq!(history.len(), 2);
        let xs: Vec<f32> = objects.buildings.iter().map(|b| b.pos.x).collect();
        assert_eq!(xs, vec![0.0, 30.0]);
    }

    #[test]
    fn modified_tracks_saved_position() {
        let defs = defs();
        let mut objects = ObjectCollection::new();
        let mut history = History::new();
        assert!(!history.is_modified());

        history.apply(add_op(0.0), &mut objects);
        assert!(history.is_modified());
        history.mark_saved();
        assert!(!history.is_modified());

        history.undo(&mut objects, &defs).unwrap();
        assert!(history.is_modified());
        history.redo(&mut objects, &defs).unwrap();
        assert!(!history.is_modified());
    }

    #[test]
    fn delete_undo_restores_positions() {
        let defs = defs();
        let mut objects = ObjectCollection::new();
        for i in 0..5 {
            objects.push(Building::new(0, vec2(i as f32 * 10.0, 0.0), 0));
        }
        objects.push(Path::new(0, vec2(0.0, 0.0), vec2(5.0, 0.0)));
        objects.push(Path::new(0, vec2(0.0, 5.0), vec2(5.0, 5.0)));
        objects.push(TextBox::new(Rect::new(0.0, 0.0, 1.0, 1.0), "a"));
        let before = objects.clone();

        let mut sel = Selection::new();
        sel.add_building(3);
        sel.add_building(1);
        sel.add_path(1, true, true);
        // endpoint-only: not deleted
        sel.add_path(0, true, false);
        sel.add_text_box(0);

        let mut old = ObjectCollection::new();
        old.buildings = vec![before.buildings[3], before.buildings[1]];
        old.paths = vec![before.paths[1]];
        old.text_boxes = vec![before.text_boxes[0].clone()];

        let mut history = History::new();
        history.apply(SceneOp::Delete { sel: sel.clone(), old }, &mut objects);
        assert_eq!(objects.buildings.len(), 3);
        assert_eq!(objects.paths.len(), 1);
        assert!(objects.text_boxes.is_empty());

        let restored = history.undo(&mut objects, &defs).unwrap();
        assert_eq!(objects, before);
        assert_eq!(restored.buildings(), sel.buildings());
        assert!(!restored.bounds().is_empty());

        let sel = history.redo(&mut objects, &defs).unwrap();
        assert!(sel.is_empty());
        assert_eq!(objects.buildings.len(), 3);
    }

    #[test]
    fn modify_undo_writes_old_values() {
        let defs = defs();
        let mut objects = ObjectCollection::new();
        objects.push(Path::new(0, vec2(0.0, 0.0), vec2(5.0, 0.0)));
        objects.push(Building::new(0, vec2(0.0, 0.0), 0));
        let before = objects.clone();

        let mut sel = Selection::new();
        sel.add_path(0, false, true);
        sel.add_building(0);

        let mut new = ObjectCollection::new();
        new.push(Path::new(0, vec2(0.0, 0.0), vec2(9.0, 0.0)));
        new.push(Building::new(0, vec2(0.0, 0.0), 90));

        let mut history = History::new();
        history.apply(
            SceneOp::Modify {
                sel: sel.clone(),
                old: before.clone(),
                new: new.clone(),
            },
            &mut objects,
        );
        assert_eq!(objects, new);

        history.undo(&mut objects, &defs).unwrap();
        assert_eq!(objects, before);

        let redone = history.redo(&mut objects, &defs).unwrap();
        assert_eq!(objects, new);
        assert_eq!(redone.paths(), sel.paths());
    }

    #[test]
    #[should_panic(expected = "one text box per selected text box")]
    fn misaligned_modify_panics() {
        let mut objects = ObjectCollection::new();
        objects.push(TextBox::new(Rect::new(0.0, 0.0, 1.0, 1.0), "a"));
        objects.push(TextBox::new(Rect::new(2.0, 0.0, 1.0, 1.0), "b"));

        let mut sel = Selection::new();
        sel.add_text_box(0);
        sel.add_text_box(1);
        let mut new = ObjectCollection::new();
        new.push(TextBox::new(Rect::new(0.0, 0.0, 1.0, 1.0), "c"));

        let mut history = History::new();
        history.apply(
            SceneOp::Modify {
                sel,
                old: objects.clone(),
                new,
            },
            &mut objects,
        );
    }
}
