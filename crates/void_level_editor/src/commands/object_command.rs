//! Leaf command over a single game object.

use std::sync::Arc;

use void_core::Guid;

use super::channel::{CommandChannel, HostCommand};
use super::command::{Command, CommandResult};
use super::registry::{self, CommandDescriptor, ObjectEdit, Step};
use crate::transfer::{GameObjectParentData, GameObjectTransferData};
use crate::transform::LinearTransform;

/// An edit of one object, executed through its kind's descriptor.
#[derive(Clone, Debug)]
pub struct ObjectCommand {
    descriptor: Arc<CommandDescriptor>,
    edit: ObjectEdit,
    /// Forward payload, built once
    payload: GameObjectTransferData,
}

impl ObjectCommand {
    pub fn new(descriptor: Arc<CommandDescriptor>, edit: ObjectEdit) -> Self {
        let payload = descriptor.forward.build(&edit);
        Self {
            descriptor,
            edit,
            payload,
        }
    }

    fn builtin(descriptor: &'static CommandDescriptor, edit: ObjectEdit) -> Self {
        Self::new(Arc::new(descriptor.clone()), edit)
    }

    pub fn enable(guid: Guid) -> Self {
        Self::builtin(&registry::ENABLE_GAME_OBJECT, ObjectEdit::new(guid))
    }

    pub fn disable(guid: Guid) -> Self {
        Self::builtin(&registry::DISABLE_GAME_OBJECT, ObjectEdit::new(guid))
    }

    /// Move an object from `old` to `new`; both are local to its parent.
    pub fn set_transform(guid: Guid, old: LinearTransform, new: LinearTransform) -> Self {
        let mut edit = ObjectEdit::new(guid);
        edit.before.transform = Some(old);
        edit.after.transform = Some(new);
        Self::builtin(&registry::SET_TRANSFORM, edit)
    }

    pub fn set_name(guid: Guid, old: impl Into<String>, new: impl Into<String>) -> Self {
        let mut edit = ObjectEdit::new(guid);
        edit.before.name = Some(old.into());
        edit.after.name = Some(new.into());
        Self::builtin(&registry::SET_OBJECT_NAME, edit)
    }

    pub fn set_parent(guid: Guid, old: GameObjectParentData, new: GameObjectParentData) -> Self {
        let mut edit = ObjectEdit::new(guid);
        edit.before.parent_data = Some(old);
        edit.after.parent_data = Some(new);
        Self::builtin(&registry::SET_PARENT, edit)
    }

    /// Delete an object; `snapshot` is what undo respawns.
    pub fn delete(guid: Guid, snapshot: GameObjectTransferData) -> Self {
        let edit = ObjectEdit::new(guid).with_before(snapshot);
        Self::builtin(&registry::DELETE_BLUEPRINT, edit)
    }

    pub fn spawn(guid: Guid, snapshot: GameObjectTransferData) -> Self {
        let edit = ObjectEdit::new(guid).with_after(snapshot);
        Self::builtin(&registry::SPAWN_BLUEPRINT, edit)
    }

    pub fn guid(&self) -> Guid {
        self.edit.guid
    }

    pub fn edit(&self) -> &ObjectEdit {
        &self.edit
    }

    pub fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    fn send(&self, step: &Step, channel: &mut dyn CommandChannel) -> CommandResult {
        channel.deliver(HostCommand::new(step.tag.clone(), step.build(&self.edit)))
    }
}

impl Command for ObjectCommand {
    fn kind(&self) -> &str {
        &self.descriptor.tag
    }

    fn description(&self) -> &str {
        &self.descriptor.label
    }

    fn execute(&mut self, channel: &mut dyn CommandChannel) -> CommandResult {
        self.send(&self.descriptor.forward, channel)
    }

    fn undo(&mut self, channel: &mut dyn CommandChannel) -> CommandResult {
        self.send(&self.descriptor.inverse, channel)
    }

    fn payload(&self) -> Option<&GameObjectTransferData> {
        Some(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{kinds, OutgoingQueue};
    use glam::Vec3;

    #[test]
    fn test_enable_undo_sends_disable() {
        let queue = OutgoingQueue::new();
        let mut channel = queue.clone();
        let guid = Guid::new_v4();
        let mut command = ObjectCommand::enable(guid);

        command.execute(&mut channel).unwrap();
        command.undo(&mut channel).unwrap();

        let sent = queue.drain();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].kind, kinds::ENABLE);
        assert_eq!(sent[1].kind, kinds::DISABLE);
        assert_eq!(sent[0].payload, GameObjectTransferData::new(guid));
        assert_eq!(sent[1].payload, GameObjectTransferData::new(guid));
    }

    #[test]
    fn test_set_transform_undo_restores_old() {
        let queue = OutgoingQueue::new();
        let mut channel = queue.clone();
        let guid = Guid::new_v4();
        let old = LinearTransform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let new = LinearTransform::from_translation(Vec3::new(6.0, 0.0, 0.0));
        let mut command = ObjectCommand::set_transform(guid, old, new);

        assert_eq!(command.payload().and_then(|p| p.transform), Some(new));

        command.execute(&mut channel).unwrap();
        command.undo(&mut channel).unwrap();
        let sent = queue.drain();
        assert_eq!(sent[0].kind, kinds::SET_TRANSFORM);
        assert_eq!(sent[0].payload.transform, Some(new));
        assert_eq!(sent[1].kind, kinds::SET_TRANSFORM);
        assert_eq!(sent[1].payload.transform, Some(old));
    }

    #[test]
    fn test_delete_undo_respawns_snapshot() {
        let queue = OutgoingQueue::new();
        let mut channel = queue.clone();
        let guid = Guid::new_v4();
        let mut snapshot = GameObjectTransferData::new(guid);
        snapshot.name = Some("lamp".into());
        let mut command = ObjectCommand::delete(guid, snapshot.clone());

        command.execute(&mut channel).unwrap();
        command.undo(&mut channel).unwrap();
        let sent = queue.drain();
        assert_eq!(sent[0].kind, kinds::DELETE);
        assert_eq!(sent[0].payload, GameObjectTransferData::new(guid));
        assert_eq!(sent[1].kind, kinds::SPAWN);
        assert_eq!(sent[1].payload, snapshot);
    }

    #[test]
    fn test_set_name_payloads() {
        let guid = Guid::new_v4();
        let command = ObjectCommand::set_name(guid, "old", "new");
        assert_eq!(command.kind(), kinds::SET_NAME);
        assert_eq!(command.payload().and_then(|p| p.name.as_deref()), Some("new"));
        assert_eq!(command.guid(), guid);
    }
}
