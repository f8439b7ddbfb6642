//! Prelude module for `aurelia_engine`.
//!
//! This module provides a convenient way to import commonly used types,
//! traits, and constants.
//!
//! # Examples
//!
//! ```rust
//! use aurelia_engine::prelude::*;
//!
//! let map = Map::new(16, 16);
//! assert!(map.is_walkable(3, 3, BlockMask::WALK_GROUND));
//!
//! let mut index = ActorIndex::new();
//! let id = index.create(ActorKind::Monster, "slime", 3, 3);
//! assert!(index.get(id).is_some());
//! ```

// Actor registry
#[doc(inline)]
pub use crate::actor::{Actor, ActorId, ActorIndex, ActorKind};

// Animation types
#[doc(inline)]
pub use crate::animation::{
	Action,
	AnimationPlayer,
	Frame,
	FrameControl,
	FrameSequence,
	SimplePlayer,
	SpriteDef,
	SpriteDirection,
};

// Engine context
#[doc(inline)]
pub use crate::context::{EngineSettings, TickContext};

// Errors
#[doc(inline)]
pub use crate::error::EngineError;

// Map and pathfinding
#[doc(inline)]
pub use crate::map::{BlockMask, BlockType, Map, MetaTile, Path, Position};

// Math helpers
#[doc(inline)]
pub use crate::math::PhysicsMode;

// Particle simulation
#[doc(inline)]
pub use crate::particle::{
	AliveStatus,
	DeathConditions,
	EffectDef,
	EffectRegistry,
	EmitterProp,
	Particle,
	ParticleBudget,
	ParticleEmitter,
	ParticleEngine,
	ParticleKind,
};

// Rendering seam
#[doc(inline)]
pub use crate::render::{DrawTarget, SoftwareSurface};

// Image resources
#[doc(inline)]
pub use crate::resource::{ImageData, ImageHandle, ImageRegistry, ImageSet};

// Composite sprites
#[doc(inline)]
pub use crate::sprite::{CompositeOptions, CompositeSprite, LayerKey, SpriteLayer, StaticSprite};
