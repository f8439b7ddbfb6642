//! Actions, directions, and sprite definitions.
//!
//! A sprite definition maps action names ("stand", "walk", "attack") to
//! [`Action`]s, and each action maps facing directions to frame sequences.
//! Lookups degrade instead of failing: a missing direction falls back to the
//! default one, a missing action walks a fixed substitution chain.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;

use super::sequence::FrameSequence;

/// Canonical action names.
pub mod actions {
	/// Fallback action every sprite should define.
	pub const DEFAULT: &str = "default";
	/// Idle action, the target of terminator fallback.
	pub const STAND: &str = "stand";
	/// Walking action.
	pub const WALK: &str = "walk";
	/// Sitting action.
	pub const SIT: &str = "sit";
	/// Attacking action.
	pub const ATTACK: &str = "attack";
	/// Death action.
	pub const DEAD: &str = "dead";
}

/// Facing direction of a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpriteDirection {
	/// Facing the camera; the default and the fallback for missing entries.
	#[default]
	Down,
	/// Facing away from the camera.
	Up,
	/// Facing left.
	Left,
	/// Facing right.
	Right,
}

/// One visual behavior: a frame sequence per facing direction.
#[derive(Debug, Default)]
pub struct Action {
	animations: HashMap<SpriteDirection, Arc<FrameSequence>>,
}

impl Action {
	/// Creates an action with no sequences.
	pub fn new() -> Self {
		Self {
			animations: HashMap::new(),
		}
	}

	/// Sets the sequence for a direction.
	pub fn set_animation(&mut self, direction: SpriteDirection, sequence: Arc<FrameSequence>) {
		self.animations.insert(direction, sequence);
	}

	/// Sequence for `direction`, falling back to the default (down) one.
	pub fn animation(&self, direction: SpriteDirection) -> Option<&Arc<FrameSequence>> {
		self.animations
			.get(&direction)
			.or_else(|| self.animations.get(&SpriteDirection::default()))
	}
}

/// A named set of actions describing everything one sprite can show.
#[derive(Debug, Default)]
pub struct SpriteDef {
	actions: HashMap<String, Arc<Action>>,
}

impl SpriteDef {
	/// Creates an empty definition.
	pub fn new() -> Self {
		Self {
			actions: HashMap::new(),
		}
	}

	/// Registers an action under `name`.
	pub fn set_action(&mut self, name: &str, action: Action) {
		self.actions.insert(name.to_string(), Arc::new(action));
	}

	/// Resolves an action by name, walking the substitution chain when the
	/// exact name is missing (e.g. a sprite without "sit" falls back to
	/// "stand", and one without "stand" to "default").
	pub fn action(&self, name: &str) -> Option<&Arc<Action>> {
		if let Some(action) = self.actions.get(name) {
			return Some(action);
		}
		for substitute in [actions::STAND, actions::DEFAULT] {
			if substitute == name {
				continue;
			}
			if let Some(action) = self.actions.get(substitute) {
				warn!("sprite action {name} missing, substituting {substitute}");
				return Some(action);
			}
		}
		None
	}

	/// Returns true when an action with exactly this name exists.
	pub fn has_action(&self, name: &str) -> bool {
		self.actions.contains_key(name)
	}
}
