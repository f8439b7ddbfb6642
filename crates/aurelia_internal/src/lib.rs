//! This module is separated into its own crate to decouple the public `aurelia-rs` surface from the engine crate, and should not be used directly.

/// `use aurelia_rs::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export aurelia_engine for convenience
pub use aurelia_engine;

// Re-export commonly used types at crate root
pub use aurelia_engine::{
	actor::{Actor, ActorId, ActorIndex, ActorKind},
	context::EngineSettings,
	error::EngineError,
	map::{BlockMask, BlockType, Map, Path, Position},
	particle::{EffectRegistry, ParticleEngine},
	sprite::CompositeSprite,
};
