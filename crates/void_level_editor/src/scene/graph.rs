//! Parent/child hierarchy of game objects.

use std::collections::HashMap;

use glam::Mat4;
use void_core::Guid;

use super::game_object::GameObject;
use super::instances::InstanceRegistry;
use super::{SceneError, SceneResult};
use crate::transfer::GameObjectTransferData;
use crate::transform::LinearTransform;

/// Determinant below which a matrix is treated as non-invertible.
const SINGULAR_EPSILON: f32 = 1e-12;

/// All objects of the loaded level, keyed by guid.
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: HashMap<Guid, GameObject>,
    roots: Vec<Guid>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, guid: Guid) -> bool {
        self.objects.contains_key(&guid)
    }

    pub fn get(&self, guid: Guid) -> Option<&GameObject> {
        self.objects.get(&guid)
    }

    pub fn get_mut(&mut self, guid: Guid) -> Option<&mut GameObject> {
        self.objects.get_mut(&guid)
    }

    /// Top-level objects in insertion order.
    pub fn roots(&self) -> &[Guid] {
        &self.roots
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    fn object(&self, guid: Guid) -> SceneResult<&GameObject> {
        self.objects.get(&guid).ok_or(SceneError::ObjectNotFound(guid))
    }

    fn object_mut(&mut self, guid: Guid) -> SceneResult<&mut GameObject> {
        self.objects.get_mut(&guid).ok_or(SceneError::ObjectNotFound(guid))
    }

    /// Add `object` under `parent` (or as a root).
    pub fn insert(&mut self, mut object: GameObject, parent: Option<Guid>) -> SceneResult<()> {
        let guid = object.guid();
        if self.objects.contains_key(&guid) {
            return Err(SceneError::DuplicateObject(guid));
        }
        match parent {
            Some(p) => {
                self.objects
                    .get_mut(&p)
                    .ok_or(SceneError::ParentNotFound(p))?
                    .children
                    .push(guid);
            }
            None => self.roots.push(guid),
        }
        object.parent = parent;
        object.children.clear();
        self.objects.insert(guid, object);
        Ok(())
    }

    /// Remove an object and its whole subtree, parents before children.
    pub fn remove(&mut self, guid: Guid) -> SceneResult<Vec<GameObject>> {
        let parent = self.object(guid)?.parent;
        self.detach(guid, parent);

        let mut removed = Vec::new();
        let mut stack = vec![guid];
        while let Some(current) = stack.pop() {
            if let Some(object) = self.objects.remove(&current) {
                stack.extend(object.children.iter().rev().copied());
                removed.push(object);
            }
        }
        Ok(removed)
    }

    fn detach(&mut self, guid: Guid, parent: Option<Guid>) {
        let siblings = match parent.and_then(|p| self.objects.get_mut(&p)) {
            Some(p) => &mut p.children,
            None => &mut self.roots,
        };
        siblings.retain(|g| *g != guid);
    }

    pub fn parent_of(&self, guid: Guid) -> Option<Guid> {
        self.objects.get(&guid).and_then(|o| o.parent)
    }

    /// Ancestors of `guid`, nearest first.
    pub fn ancestors(&self, guid: Guid) -> Vec<Guid> {
        let mut out = Vec::new();
        let mut current = self.parent_of(guid);
        while let Some(p) = current {
            out.push(p);
            current = self.parent_of(p);
        }
        out
    }

    /// True when `ancestor` lies strictly above `guid`.
    pub fn is_descendant_of(&self, guid: Guid, ancestor: Guid) -> bool {
        let mut current = self.parent_of(guid);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent_of(p);
        }
        false
    }

    /// Every object below `guid`, depth first.
    pub fn descendants(&self, guid: Guid) -> Vec<Guid> {
        let mut out = Vec::new();
        let mut stack: Vec<Guid> = match self.objects.get(&guid) {
            Some(o) => o.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(o) = self.objects.get(&current) {
                stack.extend(o.children.iter().rev().copied());
            }
        }
        out
    }

    /// Live world matrix: parent chain composed onto the local transform.
    pub fn world_matrix(&self, guid: Guid) -> SceneResult<Mat4> {
        let object = self.object(guid)?;
        let local = object.transform.to_matrix();
        match object.parent {
            Some(p) => Ok(self.world_matrix(p)? * local),
            None => Ok(local),
        }
    }

    /// World matrix of the poses the host last confirmed.
    pub fn committed_world_matrix(&self, guid: Guid) -> SceneResult<Mat4> {
        let object = self.object(guid)?;
        let local = object.committed.to_matrix();
        match object.parent {
            Some(p) => Ok(self.committed_world_matrix(p)? * local),
            None => Ok(local),
        }
    }

    /// Live world pose, the frame transforms are exchanged with the host in.
    pub fn world_transform(&self, guid: Guid) -> SceneResult<LinearTransform> {
        Ok(LinearTransform::from_matrix(&self.world_matrix(guid)?))
    }

    /// Committed world pose.
    pub fn committed_world_transform(&self, guid: Guid) -> SceneResult<LinearTransform> {
        Ok(LinearTransform::from_matrix(&self.committed_world_matrix(guid)?))
    }

    /// Host record for `guid` with its transform in world space.
    pub fn snapshot(&self, guid: Guid) -> SceneResult<GameObjectTransferData> {
        let mut data = self.object(guid)?.to_transfer_data();
        data.transform = Some(self.committed_world_transform(guid)?);
        Ok(data)
    }

    fn parent_world(&self, guid: Guid) -> SceneResult<Mat4> {
        match self.object(guid)?.parent {
            Some(p) => self.world_matrix(p),
            None => Ok(Mat4::IDENTITY),
        }
    }

    /// Place an object at `world`, re-expressed in its parent's space.
    pub fn set_world_matrix(&mut self, guid: Guid, world: Mat4) -> SceneResult<()> {
        let parent_world = self.parent_world(guid)?;
        if parent_world.determinant().abs() < SINGULAR_EPSILON {
            return Err(SceneError::SingularMatrix(guid));
        }
        let local = parent_world.inverse() * world;
        self.object_mut(guid)?.transform = LinearTransform::from_matrix(&local);
        Ok(())
    }

    pub fn set_local_transform(&mut self, guid: Guid, transform: LinearTransform) -> SceneResult<()> {
        self.object_mut(guid)?.transform = transform;
        Ok(())
    }

    /// Host confirmed a world pose: re-expressed in the parent's space, it
    /// becomes both live and committed.
    pub fn confirm_world_transform(&mut self, guid: Guid, world: &LinearTransform) -> SceneResult<()> {
        self.set_world_matrix(guid, world.to_matrix())?;
        self.commit_transform(guid)
    }

    /// Take the live pose as the committed one.
    pub fn commit_transform(&mut self, guid: Guid) -> SceneResult<()> {
        let object = self.object_mut(guid)?;
        object.committed = object.transform;
        Ok(())
    }

    pub fn has_moved(&self, guid: Guid, epsilon: f32) -> bool {
        self.objects
            .get(&guid)
            .map(|o| o.has_moved(epsilon))
            .unwrap_or(false)
    }

    /// Move `guid` under `new_parent`, keeping its world pose.
    pub fn reparent(&mut self, guid: Guid, new_parent: Option<Guid>) -> SceneResult<()> {
        if let Some(p) = new_parent {
            if !self.objects.contains_key(&p) {
                return Err(SceneError::ParentNotFound(p));
            }
            if p == guid || self.is_descendant_of(p, guid) {
                return Err(SceneError::CycleDetected(guid));
            }
        }

        let world = self.world_matrix(guid)?;
        let old_parent = self.object(guid)?.parent;
        self.detach(guid, old_parent);
        match new_parent {
            Some(p) => self.object_mut(p)?.children.push(guid),
            None => self.roots.push(guid),
        }
        self.object_mut(guid)?.parent = new_parent;
        self.set_world_matrix(guid, world)
    }

    /// Mark every ancestor of `guid` visible for the sake of a selection.
    pub fn reveal_ancestors(&mut self, guid: Guid) {
        for ancestor in self.ancestors(guid) {
            if let Some(o) = self.objects.get_mut(&ancestor) {
                o.revealed = true;
            }
        }
    }

    /// Undo [`SceneGraph::reveal_ancestors`] for `guid`, keeping every
    /// ancestor that one of `still_selected` also sits under.
    pub fn conceal_ancestors_unless_needed(&mut self, guid: Guid, still_selected: &[Guid]) {
        for ancestor in self.ancestors(guid) {
            let needed = still_selected
                .iter()
                .any(|s| *s != guid && self.is_descendant_of(*s, ancestor));
            if let Some(o) = self.objects.get_mut(&ancestor) {
                o.revealed = needed;
            }
        }
    }

    /// Push the world matrices of `guid` and its subtree to the renderer.
    pub fn update_instances(&self, guid: Guid, registry: &mut dyn InstanceRegistry) -> SceneResult<()> {
        for current in std::iter::once(guid).chain(self.descendants(guid)) {
            let world = self.world_matrix(current)?;
            self.object(current)?.update_entity_matrices(registry, &world);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn object(name: &str) -> GameObject {
        GameObject::new(Guid::new_v4(), name)
    }

    #[test]
    fn test_insert_and_hierarchy() {
        let mut scene = SceneGraph::new();
        let a = object("a");
        let b = object("b");
        let c = object("c");
        let (ga, gb, gc) = (a.guid(), b.guid(), c.guid());

        scene.insert(a, None).unwrap();
        scene.insert(b, Some(ga)).unwrap();
        scene.insert(c, Some(gb)).unwrap();

        assert_eq!(scene.roots(), &[ga]);
        assert_eq!(scene.ancestors(gc), vec![gb, ga]);
        assert!(scene.is_descendant_of(gc, ga));
        assert!(!scene.is_descendant_of(ga, gc));
        assert!(!scene.is_descendant_of(ga, ga));
        assert_eq!(scene.descendants(ga), vec![gb, gc]);
    }

    #[test]
    fn test_insert_rejects_duplicates_and_unknown_parents() {
        let mut scene = SceneGraph::new();
        let a = object("a");
        let ga = a.guid();
        scene.insert(a.clone(), None).unwrap();

        assert_eq!(scene.insert(a, None), Err(SceneError::DuplicateObject(ga)));

        let missing = Guid::new_v4();
        assert_eq!(
            scene.insert(object("b"), Some(missing)),
            Err(SceneError::ParentNotFound(missing))
        );
    }

    #[test]
    fn test_remove_subtree() {
        let mut scene = SceneGraph::new();
        let a = object("a");
        let b = object("b");
        let (ga, gb) = (a.guid(), b.guid());
        scene.insert(a, None).unwrap();
        scene.insert(b, Some(ga)).unwrap();

        let removed = scene.remove(ga).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(scene.is_empty());
        assert!(scene.roots().is_empty());
        assert!(!scene.contains(gb));
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut scene = SceneGraph::new();
        let parent = object("p").with_transform(
            LinearTransform::from_translation(Vec3::new(10.0, 0.0, 0.0))
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        let child = object("c").with_transform(LinearTransform::from_translation(Vec3::new(0.0, 0.0, 1.0)));
        let (gp, gc) = (parent.guid(), child.guid());
        scene.insert(parent, None).unwrap();
        scene.insert(child, Some(gp)).unwrap();

        let world = scene.world_matrix(gc).unwrap();
        // +Z rotated a quarter turn about Y points along +X
        assert!(world.w_axis.truncate().abs_diff_eq(Vec3::new(11.0, 0.0, 0.0), 1e-5));

        scene.set_world_matrix(gc, Mat4::from_translation(Vec3::new(10.0, 5.0, 0.0))).unwrap();
        let local = scene.get(gc).unwrap().transform().translation;
        assert!(local.abs_diff_eq(Vec3::new(0.0, 5.0, 0.0), 1e-5));
    }

    #[test]
    fn test_set_world_matrix_under_singular_parent() {
        let mut scene = SceneGraph::new();
        let parent = object("p").with_transform(LinearTransform::IDENTITY.with_scale(Vec3::ZERO));
        let child = object("c");
        let (gp, gc) = (parent.guid(), child.guid());
        scene.insert(parent, None).unwrap();
        scene.insert(child, Some(gp)).unwrap();

        assert_eq!(
            scene.set_world_matrix(gc, Mat4::IDENTITY),
            Err(SceneError::SingularMatrix(gc))
        );
    }

    #[test]
    fn test_reparent_keeps_world_pose() {
        let mut scene = SceneGraph::new();
        let a = object("a").with_transform(LinearTransform::from_translation(Vec3::new(3.0, 0.0, 0.0)));
        let b = object("b").with_transform(LinearTransform::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        let (ga, gb) = (a.guid(), b.guid());
        scene.insert(a, None).unwrap();
        scene.insert(b, None).unwrap();

        scene.reparent(gb, Some(ga)).unwrap();
        assert_eq!(scene.parent_of(gb), Some(ga));
        assert_eq!(scene.roots(), &[ga]);
        let world = scene.world_matrix(gb).unwrap();
        assert!(world.w_axis.truncate().abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));

        assert_eq!(scene.reparent(ga, Some(gb)), Err(SceneError::CycleDetected(ga)));
    }

    #[test]
    fn test_reveal_and_conceal_ancestors() {
        let mut scene = SceneGraph::new();
        let root = object("root");
        let a = object("a");
        let b = object("b");
        let (gr, ga, gb) = (root.guid(), a.guid(), b.guid());
        scene.insert(root, None).unwrap();
        scene.get_mut(gr).unwrap().set_visible(false);
        scene.insert(a, Some(gr)).unwrap();
        scene.insert(b, Some(gr)).unwrap();

        scene.reveal_ancestors(ga);
        scene.reveal_ancestors(gb);
        assert!(scene.get(gr).unwrap().is_visible());

        // b still needs the root
        scene.conceal_ancestors_unless_needed(ga, &[gb]);
        assert!(scene.get(gr).unwrap().is_visible());

        scene.conceal_ancestors_unless_needed(gb, &[]);
        assert!(!scene.get(gr).unwrap().is_visible());
    }

    #[test]
    fn test_world_poses_under_a_parent() {
        let mut scene = SceneGraph::new();
        let parent = object("p").with_transform(LinearTransform::from_translation(Vec3::new(10.0, 0.0, -4.0)));
        let child = object("c").with_transform(LinearTransform::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        let (gp, gc) = (parent.guid(), child.guid());
        scene.insert(parent, None).unwrap();
        scene.insert(child, Some(gp)).unwrap();

        scene
            .confirm_world_transform(gc, &LinearTransform::from_translation(Vec3::new(12.0, 2.0, -4.0)))
            .unwrap();
        let child = scene.get(gc).unwrap();
        assert!(child.transform().translation.abs_diff_eq(Vec3::new(2.0, 2.0, 0.0), 1e-5));
        assert!(!child.has_moved(1e-4));

        scene
            .set_local_transform(gc, LinearTransform::from_translation(Vec3::new(5.0, 2.0, 0.0)))
            .unwrap();
        let live = scene.world_transform(gc).unwrap().translation;
        let committed = scene.committed_world_transform(gc).unwrap().translation;
        assert!(live.abs_diff_eq(Vec3::new(15.0, 2.0, -4.0), 1e-5));
        assert!(committed.abs_diff_eq(Vec3::new(12.0, 2.0, -4.0), 1e-5));

        let snapshot = scene.snapshot(gc).unwrap();
        assert!(snapshot.transform.unwrap().translation.abs_diff_eq(committed, 1e-5));
    }

    #[test]
    fn test_commit_transform() {
        let mut scene = SceneGraph::new();
        let a = object("a");
        let ga = a.guid();
        scene.insert(a, None).unwrap();

        scene
            .set_local_transform(ga, LinearTransform::from_translation(Vec3::X))
            .unwrap();
        assert!(scene.has_moved(ga, 1e-4));
        scene.commit_transform(ga).unwrap();
        assert!(!scene.has_moved(ga, 1e-4));
    }
}
