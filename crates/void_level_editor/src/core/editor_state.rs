//! Editor state and the operations the UI drives.
//!
//! `Editor` is the single owner of everything in a session: the scene
//! mirror, the selection, the undo history and the collaborators. Each
//! method borrows exactly the parts it needs.

use void_core::Guid;
use void_event::FrameScheduler;

use super::history::{HistoryExecutor, UndoHistory};
use super::preferences::EditorConfig;
use super::selection::{SelectOptions, SelectionGroup};
use super::session::SessionContext;
use crate::commands::{
    submit_batch, Command, CommandError, CommandResult, ObjectCommand, OutgoingQueue,
};
use crate::events::{ObjectChanged, ObjectField};
use crate::scene::{GameObject, InstanceTable, SceneError, SceneGraph, SceneResult};
use crate::transfer::{GameObjectParentData, GameObjectTransferData};
use crate::transform::LinearTransform;

/// One editing session.
pub struct Editor {
    pub config: EditorConfig,
    pub scene: SceneGraph,
    pub selection: SelectionGroup,
    pub history: UndoHistory,
    pub session: SessionContext,
}

impl Editor {
    pub fn new(config: EditorConfig, session: SessionContext) -> Self {
        Self {
            scene: SceneGraph::new(),
            selection: SelectionGroup::new(config.selection.clone()),
            history: UndoHistory::with_capacity(config.history.max_size),
            session,
            config,
        }
    }

    /// An editor over in-memory collaborators, plus handles to inspect them.
    pub fn in_memory(config: EditorConfig) -> (Self, OutgoingQueue, InstanceTable) {
        let (session, queue, table) = SessionContext::in_memory();
        (Self::new(config, session), queue, table)
    }

    /// Run the tasks deferred to this frame. Returns how many ran.
    pub fn present_frame(&mut self) -> usize {
        FrameScheduler::run_pending(self, |editor| &mut editor.session.frames)
    }

    // ========================================================================
    // Host-driven lifecycle
    // ========================================================================

    /// Mirror an object the host created.
    ///
    /// Its parent must already be present; otherwise it is placed at the
    /// top level. The record's transform is a world pose. Instances are
    /// registered on the next frame.
    pub fn spawn(&mut self, data: &GameObjectTransferData) -> SceneResult<Guid> {
        let object = GameObject::from_transfer_data(data).ok_or(SceneError::MissingGuid)?;
        let guid = object.guid();

        let parent = data.parent_data.as_ref().and_then(GameObjectParentData::parent);
        let parent = match parent {
            Some(p) if self.scene.contains(p) => Some(p),
            Some(p) => {
                log::debug!("parent {} of {} not loaded, spawning at top level", p, guid);
                None
            }
            None => None,
        };
        self.scene.insert(object, parent)?;
        if let (Some(_), Some(world)) = (parent, &data.transform) {
            if let Err(e) = self.scene.confirm_world_transform(guid, world) {
                log::warn!("spawn: keeping {} in its parent's space: {}", guid, e);
            }
        }
        log::debug!("spawned {}", guid);

        self.session.frames.run_before_next_frame(move |editor: &mut Editor| {
            let Ok(world) = editor.scene.world_matrix(guid) else {
                return;
            };
            if let Some(object) = editor.scene.get(guid) {
                object.register_entities(&mut *editor.session.instances, &world);
            }
        });
        self.session.frames.request_render();
        Ok(guid)
    }

    /// Drop an object and its subtree from the mirror.
    pub fn despawn(&mut self, guid: Guid) -> SceneResult<()> {
        if !self.scene.contains(guid) {
            return Err(SceneError::ObjectNotFound(guid));
        }
        for member in std::iter::once(guid).chain(self.scene.descendants(guid)) {
            self.selection.deselect(member, &mut self.scene, &mut self.session);
        }
        for object in self.scene.remove(guid)? {
            object.delete_entities(&mut *self.session.instances);
        }
        log::debug!("despawned {}", guid);
        self.session.frames.request_render();
        Ok(())
    }

    /// Apply a change the host confirmed. A transform is a world pose.
    pub fn apply_host_update(&mut self, data: &GameObjectTransferData) -> SceneResult<()> {
        let guid = data.guid.ok_or(SceneError::MissingGuid)?;
        if data.is_deleted == Some(true) {
            return self.despawn(guid);
        }
        if !self.scene.contains(guid) {
            return Err(SceneError::ObjectNotFound(guid));
        }

        if let Some(parent_data) = &data.parent_data {
            let new_parent = parent_data.parent().filter(|p| self.scene.contains(*p));
            if new_parent != self.scene.parent_of(guid) {
                self.scene.reparent(guid, new_parent)?;
            }
        }
        if let Some(world) = &data.transform {
            self.scene.confirm_world_transform(guid, world)?;
            self.scene.update_instances(guid, &mut *self.session.instances)?;
            if let Some(object) = self.scene.get(guid) {
                self.session.events.publish(ObjectChanged {
                    guid,
                    field: ObjectField::Transform,
                    transform: *object.transform(),
                });
            }
            if self.selection.selected().first() == Some(&guid) {
                self.selection.refresh_transform(&self.scene, &mut self.session);
            }
        }

        if let Some(object) = self.scene.get_mut(guid) {
            if let Some(parent_data) = &data.parent_data {
                object.parent_data = Some(parent_data.clone());
            }
            if let Some(name) = &data.name {
                object.name = name.clone();
            }
            if let Some(enabled) = data.is_enabled {
                object.enabled = enabled;
            }
            if let Some(modified) = data.is_user_modified {
                object.user_modified = modified;
            }
            if let Some(variation) = data.variation {
                object.variation = Some(variation);
            }
        }
        self.session.frames.request_render();
        Ok(())
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn select(&mut self, guid: Option<Guid>, options: SelectOptions) {
        self.selection.select(guid, options, &mut self.scene, &mut self.session);
    }

    pub fn deselect(&mut self, guid: Guid) {
        self.selection.deselect(guid, &mut self.scene, &mut self.session);
    }

    pub fn deselect_all(&mut self) {
        self.selection.deselect_all(&mut self.scene, &mut self.session);
    }

    pub fn select_parent(&mut self) {
        self.selection.select_parent(&mut self.scene, &mut self.session);
    }

    pub fn highlight(&mut self, guid: Guid) {
        self.selection.highlight(guid, &mut self.scene, &mut self.session);
    }

    pub fn unhighlight(&mut self, guid: Guid) {
        self.selection.unhighlight(guid, &mut self.scene, &mut self.session);
    }

    /// Live pivot pose during a drag.
    pub fn set_pivot(&mut self, pivot: LinearTransform) {
        self.selection.set_pivot(pivot);
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.selection.set_position(x, y, z, &mut self.scene, &mut self.session);
    }

    pub fn on_client_only_move(&mut self) {
        self.selection.on_client_only_move(&mut self.scene, &mut self.session);
    }

    pub fn on_client_only_move_end(&mut self) -> CommandResult {
        let mut executor = HistoryExecutor::new(&mut self.history, &mut *self.session.channel);
        self.selection.on_client_only_move_end(&mut self.scene, &mut executor)
    }

    pub fn refresh_selection_transform(&mut self) {
        self.selection.refresh_transform(&self.scene, &mut self.session);
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Send a command to the host and record it for undo.
    pub fn execute(&mut self, cmd: Box<dyn Command>) -> CommandResult {
        self.history.execute(cmd, &mut *self.session.channel)
    }

    pub fn undo(&mut self) -> Result<bool, CommandError> {
        self.history.undo(&mut *self.session.channel)
    }

    pub fn redo(&mut self) -> Result<bool, CommandError> {
        self.history.redo(&mut *self.session.channel)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    pub fn enable_selection(&mut self) -> CommandResult {
        let mut executor = HistoryExecutor::new(&mut self.history, &mut *self.session.channel);
        self.selection.enable(&mut executor)
    }

    pub fn disable_selection(&mut self) -> CommandResult {
        let mut executor = HistoryExecutor::new(&mut self.history, &mut *self.session.channel);
        self.selection.disable(&mut executor)
    }

    pub fn rename(&mut self, guid: Guid, name: impl Into<String>) -> CommandResult {
        let object = self.scene.get(guid).ok_or(CommandError::ObjectNotFound(guid))?;
        let cmd = ObjectCommand::set_name(guid, object.name.clone(), name);
        self.execute(Box::new(cmd))
    }

    /// Propose moving `guid` under `parent`.
    pub fn set_parent(&mut self, guid: Guid, parent: GameObjectParentData) -> CommandResult {
        let object = self.scene.get(guid).ok_or(CommandError::ObjectNotFound(guid))?;
        if parent.parent() == Some(guid) {
            return Err(CommandError::InvalidOperation(format!(
                "{} cannot be its own parent",
                guid
            )));
        }
        let old = object.parent_data.clone().unwrap_or_else(|| match object.parent() {
            Some(p) => GameObjectParentData::new(p),
            None => GameObjectParentData::new(Guid::NIL),
        });
        self.execute(Box::new(ObjectCommand::set_parent(guid, old, parent)))
    }

    /// Propose deleting every selected object. Undo respawns them.
    pub fn delete_selection(&mut self) -> CommandResult {
        let commands: Vec<Box<dyn Command>> = self
            .selection
            .selected()
            .iter()
            .filter_map(|g| match self.scene.snapshot(*g) {
                Ok(snapshot) => Some(Box::new(ObjectCommand::delete(*g, snapshot)) as Box<dyn Command>),
                Err(e) => {
                    log::warn!("delete: skipping {}: {}", g, e);
                    None
                }
            })
            .collect();
        let mut executor = HistoryExecutor::new(&mut self.history, &mut *self.session.channel);
        submit_batch(commands, "Delete Selection", &mut executor)
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("objects", &self.scene.len())
            .field("selected", &self.selection.len())
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SelectionGroupChanged;
    use crate::transfer::{Aabb, GameEntityData};
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(guid: Guid, at: Vec3) -> GameObjectTransferData {
        GameObjectTransferData::builder()
            .guid(guid)
            .name("box")
            .transform(LinearTransform::from_translation(at))
            .game_entities(vec![GameEntityData::spatial(0, Aabb::default())])
            .build()
            .unwrap()
    }

    #[test]
    fn test_spawn_registers_next_frame() {
        let (mut editor, _, table) = Editor::in_memory(EditorConfig::default());
        let guid = Guid::new_v4();
        editor.spawn(&record(guid, Vec3::new(1.0, 0.0, 0.0))).unwrap();

        assert!(table.is_empty());
        assert_eq!(editor.present_frame(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_spawn_without_guid() {
        let (mut editor, _, _) = Editor::in_memory(EditorConfig::default());
        let data = GameObjectTransferData {
            name: Some("nameless".into()),
            ..Default::default()
        };
        assert_eq!(editor.spawn(&data), Err(SceneError::MissingGuid));
    }

    #[test]
    fn test_despawn_deselects_and_removes_instances() {
        let (mut editor, _, table) = Editor::in_memory(EditorConfig::default());
        let guid = Guid::new_v4();
        editor.spawn(&record(guid, Vec3::ZERO)).unwrap();
        editor.present_frame();
        editor.select(Some(guid), SelectOptions::single());

        editor.despawn(guid).unwrap();
        assert!(editor.selection.is_empty());
        assert!(table.is_empty());
        assert_eq!(editor.despawn(guid), Err(SceneError::ObjectNotFound(guid)));
    }

    #[test]
    fn test_group_changed_is_deferred() {
        let (mut editor, _, _) = Editor::in_memory(EditorConfig::default());
        let guid = Guid::new_v4();
        editor.spawn(&record(guid, Vec3::new(0.0, 2.0, 0.0))).unwrap();
        editor.present_frame();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        editor
            .session
            .events
            .subscribe(move |e: &SelectionGroupChanged| sink.borrow_mut().push(e.transform));

        editor.select(Some(guid), SelectOptions::single());
        assert!(seen.borrow().is_empty());

        editor.present_frame();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].translation.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn test_host_update_confirms_transform() {
        let (mut editor, _, _) = Editor::in_memory(EditorConfig::default());
        let guid = Guid::new_v4();
        editor.spawn(&record(guid, Vec3::ZERO)).unwrap();

        let mut update = GameObjectTransferData::new(guid);
        update.transform = Some(LinearTransform::from_translation(Vec3::new(0.0, 0.0, 7.0)));
        update.is_enabled = Some(false);
        editor.apply_host_update(&update).unwrap();

        let object = editor.scene.get(guid).unwrap();
        assert!(!object.enabled);
        assert!(!object.has_moved(1e-4));
        assert!(object.transform().translation.abs_diff_eq(Vec3::new(0.0, 0.0, 7.0), 1e-5));

        let mut deleted = GameObjectTransferData::new(guid);
        deleted.is_deleted = Some(true);
        editor.apply_host_update(&deleted).unwrap();
        assert!(!editor.scene.contains(guid));
    }

    #[test]
    fn test_rename_records_history() {
        let (mut editor, queue, _) = Editor::in_memory(EditorConfig::default());
        let guid = Guid::new_v4();
        editor.spawn(&record(guid, Vec3::ZERO)).unwrap();

        editor.rename(guid, "renamed").unwrap();
        assert_eq!(editor.undo_description(), Some("Rename GameObject"));
        editor.undo().unwrap();

        let sent = queue.drain();
        assert_eq!(sent[0].payload.name.as_deref(), Some("renamed"));
        assert_eq!(sent[1].payload.name.as_deref(), Some("box"));

        let missing = Guid::new_v4();
        assert_eq!(editor.rename(missing, "x"), Err(CommandError::ObjectNotFound(missing)));
    }

    #[test]
    fn test_set_parent_rejects_self() {
        let (mut editor, _, _) = Editor::in_memory(EditorConfig::default());
        let guid = Guid::new_v4();
        editor.spawn(&record(guid, Vec3::ZERO)).unwrap();

        let result = editor.set_parent(guid, GameObjectParentData::new(guid));
        assert!(matches!(result, Err(CommandError::InvalidOperation(_))));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_history_size_from_config() {
        let mut config = EditorConfig::default();
        config.history.max_size = 3;
        let (editor, _, _) = Editor::in_memory(config);
        assert_eq!(editor.history.max_size(), 3);
    }
}
