//! Multi-object selection moved as one rigid group.
//!
//! Selected objects are never reparented under the group. The group keeps
//! a virtual pivot transform instead, and every pivot movement is replayed
//! onto each member algebraically, so members with unrelated parents still
//! move together.

use glam::{Mat4, Vec3};
use void_core::Guid;

use super::editor_state::Editor;
use super::preferences::SelectionConfig;
use super::session::SessionContext;
use crate::commands::{submit_batch, Command, CommandExecutor, CommandResult, ObjectCommand};
use crate::events::{
    GameObjectDeselected, GameObjectSelected, GroupField, ObjectChanged, ObjectField,
    SelectionGroupChanged,
};
use crate::scene::SceneGraph;
use crate::transform::LinearTransform;

/// Pivot matrices with a smaller determinant are not inverted.
const SINGULAR_EPSILON: f32 = 1e-12;

/// How a `select` call treats the existing selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectOptions {
    /// Add to (or toggle within) the selection instead of replacing it
    pub multi_select: bool,
    /// Ask the outliner to scroll to the object
    pub scroll_to: bool,
    /// Snap the pivot to the object even if the selection is not empty
    pub move_pivot: bool,
}

impl SelectOptions {
    /// Replace the selection.
    pub fn single() -> Self {
        Self::default()
    }

    /// Add to the selection.
    pub fn multi() -> Self {
        Self {
            multi_select: true,
            ..Self::default()
        }
    }

    pub fn scroll_to(mut self) -> Self {
        self.scroll_to = true;
        self
    }

    pub fn move_pivot(mut self) -> Self {
        self.move_pivot = true;
        self
    }
}

/// The current selection and its virtual pivot.
#[derive(Clone, Debug)]
pub struct SelectionGroup {
    /// Directly selected objects, in selection order
    selected: Vec<Guid>,
    /// Pivot the members were last placed against
    transform: LinearTransform,
    /// Live pivot pose; differs from `transform` during a drag
    pivot: LinearTransform,
    style: SelectionConfig,
}

impl Default for SelectionGroup {
    fn default() -> Self {
        Self::new(SelectionConfig::default())
    }
}

impl SelectionGroup {
    pub fn new(style: SelectionConfig) -> Self {
        Self {
            selected: Vec::new(),
            transform: LinearTransform::IDENTITY,
            pivot: LinearTransform::IDENTITY,
            style,
        }
    }

    pub fn selected(&self) -> &[Guid] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Directly selected.
    pub fn is_selected(&self, guid: Guid) -> bool {
        self.selected.contains(&guid)
    }

    /// Selected directly or through a selected ancestor.
    pub fn is_implicitly_selected(&self, scene: &SceneGraph, guid: Guid) -> bool {
        self.selected
            .iter()
            .any(|s| *s == guid || scene.is_descendant_of(guid, *s))
    }

    pub fn transform(&self) -> &LinearTransform {
        &self.transform
    }

    pub fn pivot(&self) -> &LinearTransform {
        &self.pivot
    }

    /// Move the live pivot. Members follow on the next
    /// [`SelectionGroup::on_client_only_move`].
    pub fn set_pivot(&mut self, pivot: LinearTransform) {
        self.pivot = pivot;
    }

    pub fn style(&self) -> &SelectionConfig {
        &self.style
    }

    pub fn select(
        &mut self,
        target: Option<Guid>,
        options: SelectOptions,
        scene: &mut SceneGraph,
        session: &mut SessionContext,
    ) {
        let Some(guid) = target else {
            return;
        };
        if !scene.contains(guid) {
            log::debug!("select: {} is not in the scene", guid);
            return;
        }

        if !options.multi_select {
            self.deselect_all(scene, session);
        } else if self.is_implicitly_selected(scene, guid) {
            if self.is_selected(guid) {
                self.deselect(guid, scene, session);
            } else {
                log::debug!("select: {} is selected through an ancestor", guid);
            }
            return;
        } else {
            // a parent supersedes its selected descendants
            let superseded: Vec<Guid> = self
                .selected
                .iter()
                .copied()
                .filter(|s| scene.is_descendant_of(*s, guid))
                .collect();
            for child in superseded {
                self.deselect(child, scene, session);
            }
        }

        if self.selected.is_empty() || options.move_pivot {
            match scene.world_matrix(guid) {
                Ok(world) => self.set_matrix(&world, session),
                Err(e) => log::warn!("select: {}", e),
            }
        }

        self.selected.push(guid);
        if let Some(object) = scene.get_mut(guid) {
            object.on_select(&mut *session.instances, self.style.selected_color);
        }
        scene.reveal_ancestors(guid);

        session.events.publish(GameObjectSelected {
            guid,
            multi_select: options.multi_select,
            scroll_to: options.scroll_to,
        });
        session.frames.request_render();
    }

    pub fn deselect(&mut self, guid: Guid, scene: &mut SceneGraph, session: &mut SessionContext) {
        let Some(index) = self.selected.iter().position(|s| *s == guid) else {
            return;
        };

        session.events.publish(GameObjectDeselected { guid });
        if let Some(object) = scene.get_mut(guid) {
            object.on_deselect(&mut *session.instances);
        }
        self.selected.remove(index);
        scene.conceal_ancestors_unless_needed(guid, &self.selected);
        session.frames.request_render();
    }

    pub fn deselect_all(&mut self, scene: &mut SceneGraph, session: &mut SessionContext) {
        if self.selected.is_empty() {
            return;
        }
        let members = std::mem::take(&mut self.selected);

        for guid in &members {
            if let Some(object) = scene.get_mut(*guid) {
                object.on_deselect(&mut *session.instances);
            }
        }
        for guid in &members {
            scene.conceal_ancestors_unless_needed(*guid, &[]);
        }
        for guid in &members {
            session.events.publish(GameObjectDeselected { guid: *guid });
        }
        session.frames.request_render();
    }

    /// Replace a single selected object by its parent game object.
    pub fn select_parent(&mut self, scene: &mut SceneGraph, session: &mut SessionContext) {
        let &[only] = self.selected.as_slice() else {
            log::debug!("select_parent: needs exactly one selected object, have {}", self.selected.len());
            return;
        };
        let Some(parent) = scene.parent_of(only) else {
            return;
        };
        if !scene.get(parent).is_some_and(|p| p.is_game_object()) {
            log::debug!("select_parent: parent of {} is not a game object", only);
            return;
        }

        let options = SelectOptions::single().scroll_to().move_pivot();
        self.select(Some(parent), options, scene, session);
    }

    /// Snap the pivot (stored and live) to `matrix`.
    ///
    /// The change notification goes out before the next frame.
    pub fn set_matrix(&mut self, matrix: &Mat4, session: &mut SessionContext) {
        self.transform.set_from_matrix(matrix);
        self.pivot = self.transform;
        Self::notify_changed_next_frame(session);
    }

    /// Snap the pivot to the first member's world pose.
    pub fn refresh_transform(&mut self, scene: &SceneGraph, session: &mut SessionContext) {
        let Some(first) = self.selected.first() else {
            return;
        };
        if let Ok(world) = scene.world_matrix(*first) {
            self.set_matrix(&world, session);
        }
    }

    /// Replay the pivot movement `old -> new` on every member.
    ///
    /// Each member keeps its pose relative to the pivot:
    /// `W' = (Δ · W · old⁻¹) · old` with `Δ = new · old⁻¹`.
    pub fn update_selected_game_objects(
        &mut self,
        old: &Mat4,
        new: &Mat4,
        scene: &mut SceneGraph,
        session: &mut SessionContext,
    ) {
        if old.determinant().abs() < SINGULAR_EPSILON {
            log::warn!("selection pivot is singular, members not moved");
            return;
        }
        if new.determinant().abs() < SINGULAR_EPSILON {
            // keep the last usable pivot so later moves still propagate
            log::warn!("new selection pivot is singular, members not moved");
            self.pivot = self.transform;
            return;
        }
        let old_inverse = old.inverse();
        let delta = *new * old_inverse;

        for &guid in &self.selected {
            let world = match scene.world_matrix(guid) {
                Ok(world) => world,
                Err(e) => {
                    log::warn!("skipping selected object: {}", e);
                    continue;
                }
            };
            let relative = world * old_inverse;
            let moved = delta * relative;
            let updated = moved * *old;

            if let Err(e) = scene.set_world_matrix(guid, updated) {
                log::warn!("cannot move {}: {}", guid, e);
                continue;
            }
            if let Err(e) = scene.update_instances(guid, &mut *session.instances) {
                log::warn!("cannot update instances of {}: {}", guid, e);
            }
            if let Some(object) = scene.get(guid) {
                session.events.publish(ObjectChanged {
                    guid,
                    field: ObjectField::Transform,
                    transform: *object.transform(),
                });
            }
        }

        self.transform.set_from_matrix(new);
        self.pivot = self.transform;
    }

    /// Move members to the live pivot without committing anything.
    pub fn on_client_only_move(&mut self, scene: &mut SceneGraph, session: &mut SessionContext) {
        let old = self.transform.to_matrix();
        let new = self.pivot.to_matrix();
        self.update_selected_game_objects(&old, &new, scene, session);
        Self::notify_changed_next_frame(session);
        session.frames.request_render();
    }

    /// Commit a finished drag: one transform command per moved member,
    /// submitted as a single undo step. Poses are proposed in world space.
    pub fn on_client_only_move_end(
        &self,
        scene: &mut SceneGraph,
        executor: &mut dyn CommandExecutor,
    ) -> CommandResult {
        let moved: Vec<Guid> = self
            .selected
            .iter()
            .copied()
            .filter(|g| scene.has_moved(*g, self.style.move_epsilon))
            .collect();
        if moved.is_empty() {
            log::debug!("move end: nothing moved");
            return Ok(());
        }

        let mut commands: Vec<Box<dyn Command>> = Vec::with_capacity(moved.len());
        for &guid in &moved {
            match (scene.committed_world_transform(guid), scene.world_transform(guid)) {
                (Ok(old), Ok(new)) => commands.push(Box::new(ObjectCommand::set_transform(guid, old, new))),
                (Err(e), _) | (_, Err(e)) => log::warn!("move end: skipping {}: {}", guid, e),
            }
        }
        submit_batch(commands, "Move Selection", executor)?;

        // the proposed pose is the baseline for the next drag
        for guid in moved {
            if let Err(e) = scene.commit_transform(guid) {
                log::warn!("move end: cannot commit {}: {}", guid, e);
            }
        }
        Ok(())
    }

    /// Set the pivot translation and move members right away.
    ///
    /// Transient: nothing is committed until [`SelectionGroup::on_client_only_move_end`].
    pub fn set_position(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        scene: &mut SceneGraph,
        session: &mut SessionContext,
    ) {
        self.pivot.translation = Vec3::new(x, y, z);
        let old = self.transform.to_matrix();
        let new = self.pivot.to_matrix();
        self.update_selected_game_objects(&old, &new, scene, session);
        session.frames.request_render();
    }

    pub fn enable(&self, executor: &mut dyn CommandExecutor) -> CommandResult {
        let commands = self
            .selected
            .iter()
            .map(|g| Box::new(ObjectCommand::enable(*g)) as Box<dyn Command>)
            .collect();
        submit_batch(commands, "Enable Selection", executor)
    }

    pub fn disable(&self, executor: &mut dyn CommandExecutor) -> CommandResult {
        let commands = self
            .selected
            .iter()
            .map(|g| Box::new(ObjectCommand::disable(*g)) as Box<dyn Command>)
            .collect();
        submit_batch(commands, "Disable Selection", executor)
    }

    /// Hover feedback. Selected objects keep their selection colour.
    pub fn highlight(&self, guid: Guid, scene: &mut SceneGraph, session: &mut SessionContext) {
        if let Some(object) = scene.get_mut(guid) {
            if !object.is_selected() {
                object.on_highlight(&mut *session.instances, self.style.highlighted_color);
                session.frames.request_render();
            }
        }
    }

    pub fn unhighlight(&self, guid: Guid, scene: &mut SceneGraph, session: &mut SessionContext) {
        if let Some(object) = scene.get_mut(guid) {
            if !object.is_selected() {
                object.on_unhighlight(&mut *session.instances);
                session.frames.request_render();
            }
        }
    }

    fn notify_changed_next_frame(session: &mut SessionContext) {
        session.frames.run_before_next_frame(|editor: &mut Editor| {
            let transform = *editor.selection.transform();
            editor.session.events.publish(SelectionGroupChanged {
                field: GroupField::Transform,
                transform,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::GameObject;
    use glam::Quat;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (SceneGraph, SessionContext) {
        let (session, _, _) = SessionContext::in_memory();
        (SceneGraph::new(), session)
    }

    fn add(scene: &mut SceneGraph, parent: Option<Guid>, transform: LinearTransform) -> Guid {
        let object = GameObject::new(Guid::new_v4(), "obj").with_transform(transform);
        let guid = object.guid();
        scene.insert(object, parent).unwrap();
        guid
    }

    #[test]
    fn test_select_none_is_noop() {
        let (mut scene, mut session) = setup();
        let mut group = SelectionGroup::default();
        group.select(None, SelectOptions::single(), &mut scene, &mut session);
        assert!(group.is_empty());
        assert_eq!(session.events.published_count(), 0);
    }

    #[test]
    fn test_first_selection_snaps_pivot() {
        let (mut scene, mut session) = setup();
        let a = add(&mut scene, None, LinearTransform::from_translation(Vec3::new(2.0, 3.0, 4.0)));
        let b = add(&mut scene, None, LinearTransform::from_translation(Vec3::new(9.0, 0.0, 0.0)));
        let mut group = SelectionGroup::default();

        group.select(Some(a), SelectOptions::single(), &mut scene, &mut session);
        assert!(group.transform().translation.abs_diff_eq(Vec3::new(2.0, 3.0, 4.0), 1e-5));

        // adding without move_pivot keeps the pivot
        group.select(Some(b), SelectOptions::multi(), &mut scene, &mut session);
        assert!(group.transform().translation.abs_diff_eq(Vec3::new(2.0, 3.0, 4.0), 1e-5));

        group.select(Some(b), SelectOptions::single().move_pivot(), &mut scene, &mut session);
        assert!(group.transform().translation.abs_diff_eq(Vec3::new(9.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_multi_select_toggles_direct_member() {
        let (mut scene, mut session) = setup();
        let a = add(&mut scene, None, LinearTransform::IDENTITY);
        let mut group = SelectionGroup::default();

        group.select(Some(a), SelectOptions::multi(), &mut scene, &mut session);
        assert!(group.is_selected(a));
        group.select(Some(a), SelectOptions::multi(), &mut scene, &mut session);
        assert!(group.is_empty());
    }

    #[test]
    fn test_cannot_deselect_child_of_selected() {
        let (mut scene, mut session) = setup();
        let parent = add(&mut scene, None, LinearTransform::IDENTITY);
        let child = add(&mut scene, Some(parent), LinearTransform::IDENTITY);
        let mut group = SelectionGroup::default();

        group.select(Some(parent), SelectOptions::single(), &mut scene, &mut session);
        group.select(Some(child), SelectOptions::multi(), &mut scene, &mut session);

        assert_eq!(group.selected(), &[parent]);
    }

    #[test]
    fn test_select_parent() {
        let (mut scene, mut session) = setup();
        let layer = GameObject::layer(Guid::new_v4(), "layer");
        let layer_guid = layer.guid();
        scene.insert(layer, None).unwrap();
        let parent = add(&mut scene, Some(layer_guid), LinearTransform::IDENTITY);
        let child = add(&mut scene, Some(parent), LinearTransform::IDENTITY);
        let mut group = SelectionGroup::default();

        group.select(Some(child), SelectOptions::single(), &mut scene, &mut session);
        group.select_parent(&mut scene, &mut session);
        assert_eq!(group.selected(), &[parent]);

        // layers are never selected this way
        group.select_parent(&mut scene, &mut session);
        assert_eq!(group.selected(), &[parent]);
    }

    #[test]
    fn test_select_parent_needs_single_member() {
        let (mut scene, mut session) = setup();
        let parent = add(&mut scene, None, LinearTransform::IDENTITY);
        let a = add(&mut scene, Some(parent), LinearTransform::IDENTITY);
        let b = add(&mut scene, Some(parent), LinearTransform::IDENTITY);
        let mut group = SelectionGroup::default();

        group.select(Some(a), SelectOptions::single(), &mut scene, &mut session);
        group.select(Some(b), SelectOptions::multi(), &mut scene, &mut session);
        group.select_parent(&mut scene, &mut session);
        assert_eq!(group.selected(), &[a, b]);
    }

    #[test]
    fn test_deselect_keeps_order_and_emits() {
        let (mut scene, mut session) = setup();
        let ids: Vec<Guid> = (0..3)
            .map(|_| add(&mut scene, None, LinearTransform::IDENTITY))
            .collect();
        let mut group = SelectionGroup::default();
        for id in &ids {
            group.select(Some(*id), SelectOptions::multi(), &mut scene, &mut session);
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        session
            .events
            .subscribe(move |e: &GameObjectDeselected| sink.borrow_mut().push(e.guid));

        group.deselect(ids[1], &mut scene, &mut session);
        assert_eq!(group.selected(), &[ids[0], ids[2]]);
        assert_eq!(*seen.borrow(), vec![ids[1]]);

        // unknown objects are ignored
        group.deselect(Guid::new_v4(), &mut scene, &mut session);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_propagation_preserves_relative_pose() {
        let (mut scene, mut session) = setup();
        let parent = add(
            &mut scene,
            None,
            LinearTransform::from_translation(Vec3::new(0.0, 10.0, 0.0)).with_rotation(Quat::from_rotation_z(0.4)),
        );
        let a = add(&mut scene, Some(parent), LinearTransform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        let b = add(
            &mut scene,
            None,
            LinearTransform::from_translation(Vec3::new(-3.0, 2.0, 1.0)).with_rotation(Quat::from_rotation_y(1.1)),
        );
        let mut group = SelectionGroup::default();
        group.select(Some(a), SelectOptions::multi(), &mut scene, &mut session);
        group.select(Some(b), SelectOptions::multi(), &mut scene, &mut session);

        let old = group.transform().to_matrix();
        let before: Vec<Mat4> = [a, b].iter().map(|g| old.inverse() * scene.world_matrix(*g).unwrap()).collect();

        group.set_pivot(
            LinearTransform::from_translation(Vec3::new(4.0, -1.0, 2.0))
                .with_rotation(Quat::from_rotation_x(0.7))
                .with_scale(Vec3::splat(2.0)),
        );
        group.on_client_only_move(&mut scene, &mut session);

        let new = group.transform().to_matrix();
        for (g, rel) in [a, b].iter().zip(before) {
            let after = new.inverse() * scene.world_matrix(*g).unwrap();
            assert!(after.abs_diff_eq(rel, 1e-4), "{:?} vs {:?}", after, rel);
        }
    }

    #[test]
    fn test_singular_pivot_is_not_kept() {
        let (mut scene, mut session) = setup();
        let a = add(&mut scene, None, LinearTransform::from_translation(Vec3::X));
        let mut group = SelectionGroup::default();
        group.select(Some(a), SelectOptions::single(), &mut scene, &mut session);

        group.set_pivot(LinearTransform::IDENTITY.with_scale(Vec3::ZERO));
        group.on_client_only_move(&mut scene, &mut session);
        assert!(group.transform().scale.abs_diff_eq(Vec3::ONE, 1e-6));
        assert!(group.pivot().scale.abs_diff_eq(Vec3::ONE, 1e-6));
        assert!(!scene.has_moved(a, 1e-4));

        // the group still follows the next usable pivot
        group.set_pivot(LinearTransform::from_translation(Vec3::new(1.0, 3.0, 0.0)));
        group.on_client_only_move(&mut scene, &mut session);
        let world = scene.world_matrix(a).unwrap();
        assert!(world.w_axis.truncate().abs_diff_eq(Vec3::new(1.0, 3.0, 0.0), 1e-5));
    }

    #[test]
    fn test_move_end_without_motion_submits_nothing() {
        let (mut scene, mut session) = setup();
        let a = add(&mut scene, None, LinearTransform::IDENTITY);
        let mut group = SelectionGroup::default();
        group.select(Some(a), SelectOptions::single(), &mut scene, &mut session);

        let mut submitted: Vec<Box<dyn Command>> = Vec::new();
        group.on_client_only_move_end(&mut scene, &mut submitted).unwrap();
        assert!(submitted.is_empty());
    }

    #[test]
    fn test_highlight_skips_selected() {
        let (mut session, _, table) = SessionContext::in_memory();
        let mut scene = SceneGraph::new();
        let a = add(&mut scene, None, LinearTransform::IDENTITY);
        let mut group = SelectionGroup::default();

        group.highlight(a, &mut scene, &mut session);
        assert!(scene.get(a).unwrap().is_highlighted());

        group.select(Some(a), SelectOptions::single(), &mut scene, &mut session);
        group.unhighlight(a, &mut scene, &mut session);
        assert!(scene.get(a).unwrap().is_highlighted());
        assert!(table.is_empty());
    }
}
