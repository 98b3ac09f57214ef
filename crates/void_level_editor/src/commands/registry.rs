//! Dispatch table from command tags to their forward and inverse operations.
//!
//! Every object-level edit is described by a [`CommandDescriptor`]: the tag
//! sent when it runs, the tag sent when it is undone, and how each payload
//! is built from the edit's before/after records. New kinds are added by
//! registering a descriptor rather than writing a new command type.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use void_core::Guid;

use super::command::CommandError;
use super::object_command::ObjectCommand;
use crate::transfer::GameObjectTransferData;

/// Host tags of the built-in operations.
pub mod kinds {
    pub const ENABLE: &str = "EnableGameObjectCommand";
    pub const DISABLE: &str = "DisableGameObjectCommand";
    pub const SET_TRANSFORM: &str = "SetTransformCommand";
    pub const SET_NAME: &str = "SetObjectNameCommand";
    pub const SET_PARENT: &str = "SetParentCommand";
    pub const DELETE: &str = "DeleteBlueprintCommand";
    pub const SPAWN: &str = "SpawnBlueprintCommand";
}

/// The state of one object before and after an edit.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectEdit {
    pub guid: Guid,
    pub before: GameObjectTransferData,
    pub after: GameObjectTransferData,
}

impl ObjectEdit {
    /// An edit that carries nothing but the object's identity.
    pub fn new(guid: Guid) -> Self {
        Self {
            guid,
            before: GameObjectTransferData::new(guid),
            after: GameObjectTransferData::new(guid),
        }
    }

    pub fn with_before(mut self, before: GameObjectTransferData) -> Self {
        self.before = before;
        self
    }

    pub fn with_after(mut self, after: GameObjectTransferData) -> Self {
        self.after = after;
        self
    }
}

/// Builds the payload of one step from the edit.
pub type PayloadFn = fn(&ObjectEdit) -> GameObjectTransferData;

/// One host operation: its tag and how to build its payload.
#[derive(Clone)]
pub struct Step {
    pub tag: Cow<'static, str>,
    pub payload: PayloadFn,
}

impl Step {
    pub const fn new(tag: &'static str, payload: PayloadFn) -> Self {
        Self {
            tag: Cow::Borrowed(tag),
            payload,
        }
    }

    pub fn build(&self, edit: &ObjectEdit) -> GameObjectTransferData {
        (self.payload)(edit)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("tag", &self.tag).finish()
    }
}

/// A command kind: what runs on execute and what runs on undo.
#[derive(Clone, Debug)]
pub struct CommandDescriptor {
    pub tag: Cow<'static, str>,
    /// Shown in the undo/redo menu
    pub label: Cow<'static, str>,
    pub forward: Step,
    pub inverse: Step,
}

impl CommandDescriptor {
    pub const fn new(tag: &'static str, label: &'static str, forward: Step, inverse: Step) -> Self {
        Self {
            tag: Cow::Borrowed(tag),
            label: Cow::Borrowed(label),
            forward,
            inverse,
        }
    }
}

fn guid_only(edit: &ObjectEdit) -> GameObjectTransferData {
    GameObjectTransferData::new(edit.guid)
}

fn after_transform(edit: &ObjectEdit) -> GameObjectTransferData {
    GameObjectTransferData {
        transform: edit.after.transform,
        ..GameObjectTransferData::new(edit.guid)
    }
}

fn before_transform(edit: &ObjectEdit) -> GameObjectTransferData {
    GameObjectTransferData {
        transform: edit.before.transform,
        ..GameObjectTransferData::new(edit.guid)
    }
}

fn after_name(edit: &ObjectEdit) -> GameObjectTransferData {
    GameObjectTransferData {
        name: edit.after.name.clone(),
        ..GameObjectTransferData::new(edit.guid)
    }
}

fn before_name(edit: &ObjectEdit) -> GameObjectTransferData {
    GameObjectTransferData {
        name: edit.before.name.clone(),
        ..GameObjectTransferData::new(edit.guid)
    }
}

fn after_parent(edit: &ObjectEdit) -> GameObjectTransferData {
    GameObjectTransferData {
        parent_data: edit.after.parent_data.clone(),
        ..GameObjectTransferData::new(edit.guid)
    }
}

fn before_parent(edit: &ObjectEdit) -> GameObjectTransferData {
    GameObjectTransferData {
        parent_data: edit.before.parent_data.clone(),
        ..GameObjectTransferData::new(edit.guid)
    }
}

fn before_snapshot(edit: &ObjectEdit) -> GameObjectTransferData {
    GameObjectTransferData {
        guid: Some(edit.guid),
        ..edit.before.clone()
    }
}

fn after_snapshot(edit: &ObjectEdit) -> GameObjectTransferData {
    GameObjectTransferData {
        guid: Some(edit.guid),
        ..edit.after.clone()
    }
}

pub static ENABLE_GAME_OBJECT: CommandDescriptor = CommandDescriptor::new(
    kinds::ENABLE,
    "Enable GameObject",
    Step::new(kinds::ENABLE, guid_only),
    Step::new(kinds::DISABLE, guid_only),
);

pub static DISABLE_GAME_OBJECT: CommandDescriptor = CommandDescriptor::new(
    kinds::DISABLE,
    "Disable GameObject",
    Step::new(kinds::DISABLE, guid_only),
    Step::new(kinds::ENABLE, guid_only),
);

pub static SET_TRANSFORM: CommandDescriptor = CommandDescriptor::new(
    kinds::SET_TRANSFORM,
    "Set Transform",
    Step::new(kinds::SET_TRANSFORM, after_transform),
    Step::new(kinds::SET_TRANSFORM, before_transform),
);

pub static SET_OBJECT_NAME: CommandDescriptor = CommandDescriptor::new(
    kinds::SET_NAME,
    "Rename GameObject",
    Step::new(kinds::SET_NAME, after_name),
    Step::new(kinds::SET_NAME, before_name),
);

pub static SET_PARENT: CommandDescriptor = CommandDescriptor::new(
    kinds::SET_PARENT,
    "Set Parent",
    Step::new(kinds::SET_PARENT, after_parent),
    Step::new(kinds::SET_PARENT, before_parent),
);

/// Undo respawns from the pre-delete snapshot.
pub static DELETE_BLUEPRINT: CommandDescriptor = CommandDescriptor::new(
    kinds::DELETE,
    "Delete Blueprint",
    Step::new(kinds::DELETE, guid_only),
    Step::new(kinds::SPAWN, before_snapshot),
);

pub static SPAWN_BLUEPRINT: CommandDescriptor = CommandDescriptor::new(
    kinds::SPAWN,
    "Spawn Blueprint",
    Step::new(kinds::SPAWN, after_snapshot),
    Step::new(kinds::DELETE, guid_only),
);

/// Registered command kinds, keyed by tag.
#[derive(Clone, Debug, Default)]
pub struct CommandRegistry {
    descriptors: HashMap<String, Arc<CommandDescriptor>>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in [
            &ENABLE_GAME_OBJECT,
            &DISABLE_GAME_OBJECT,
            &SET_TRANSFORM,
            &SET_OBJECT_NAME,
            &SET_PARENT,
            &DELETE_BLUEPRINT,
            &SPAWN_BLUEPRINT,
        ] {
            registry.register(descriptor.clone());
        }
        registry
    }

    /// Shared registry of the built-in kinds.
    pub fn builtin() -> &'static CommandRegistry {
        static BUILTIN: OnceLock<CommandRegistry> = OnceLock::new();
        BUILTIN.get_or_init(CommandRegistry::with_builtins)
    }

    /// Add or replace a kind. Returns the descriptor it replaced.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Option<Arc<CommandDescriptor>> {
        let tag = descriptor.tag.to_string();
        self.descriptors.insert(tag, Arc::new(descriptor))
    }

    pub fn get(&self, tag: &str) -> Option<Arc<CommandDescriptor>> {
        self.descriptors.get(tag).cloned()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.descriptors.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    /// Build a command of kind `tag` over `edit`.
    pub fn create(&self, tag: &str, edit: ObjectEdit) -> Result<ObjectCommand, CommandError> {
        let descriptor = self
            .get(tag)
            .ok_or_else(|| CommandError::UnknownKind(tag.to_string()))?;
        Ok(ObjectCommand::new(descriptor, edit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::LinearTransform;
    use glam::Vec3;

    #[test]
    fn test_builtins_registered() {
        let registry = CommandRegistry::builtin();
        assert_eq!(registry.len(), 7);
        for tag in [
            kinds::ENABLE,
            kinds::DISABLE,
            kinds::SET_TRANSFORM,
            kinds::SET_NAME,
            kinds::SET_PARENT,
            kinds::DELETE,
            kinds::SPAWN,
        ] {
            assert!(registry.contains(tag), "missing {}", tag);
        }
    }

    #[test]
    fn test_unknown_kind() {
        let registry = CommandRegistry::new();
        let err = registry.create("Nope", ObjectEdit::new(Guid::new_v4())).unwrap_err();
        assert_eq!(err, CommandError::UnknownKind("Nope".into()));
    }

    #[test]
    fn test_transform_steps_pick_their_side() {
        let guid = Guid::new_v4();
        let old = LinearTransform::IDENTITY;
        let new = LinearTransform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let edit = ObjectEdit::new(guid)
            .with_before(GameObjectTransferData {
                transform: Some(old),
                ..GameObjectTransferData::new(guid)
            })
            .with_after(GameObjectTransferData {
                transform: Some(new),
                ..GameObjectTransferData::new(guid)
            });

        assert_eq!(SET_TRANSFORM.forward.build(&edit).transform, Some(new));
        assert_eq!(SET_TRANSFORM.inverse.build(&edit).transform, Some(old));
    }

    fn set_variation(edit: &ObjectEdit) -> GameObjectTransferData {
        GameObjectTransferData {
            variation: edit.after.variation,
            ..GameObjectTransferData::new(edit.guid)
        }
    }

    fn restore_variation(edit: &ObjectEdit) -> GameObjectTransferData {
        GameObjectTransferData {
            variation: edit.before.variation,
            ..GameObjectTransferData::new(edit.guid)
        }
    }

    #[test]
    fn test_register_custom_kind() {
        let mut registry = CommandRegistry::with_builtins();
        let replaced = registry.register(CommandDescriptor::new(
            "SetVariationCommand",
            "Set Variation",
            Step::new("SetVariationCommand", set_variation),
            Step::new("SetVariationCommand", restore_variation),
        ));
        assert!(replaced.is_none());
        assert!(registry.contains("SetVariationCommand"));

        let guid = Guid::new_v4();
        let mut edit = ObjectEdit::new(guid);
        edit.after.variation = Some(7);
        let command = registry.create("SetVariationCommand", edit).unwrap();
        assert_eq!(command.edit().after.variation, Some(7));
    }
}
