//! Particle simulation: nodes, emitters, effects, and the engine root.
//!
//! Particles are simulated points in pseudo-3D space owning trees of child
//! particles and child emitters. Emitters spawn new particles from
//! randomized, optionally time-modulated property ranges; effects are
//! declarative documents describing whole trees of both. Admission control
//! (a global cap plus a per-image soft cap) silently drops spawns past the
//! budget instead of erroring.

pub mod budget;
pub mod effect;
pub mod emitter;
pub mod engine;
pub mod kind;
pub mod node;
pub mod prop;

pub use self::budget::{IMAGE_PARTICLE_CAP, ParticleBudget};
pub use self::effect::{
	AnimationDef, DeathEffectDef, EffectDef, EffectRegistry, EmitterDef, FrameDef, ParticleDef,
	PropDef,
};
pub use self::emitter::ParticleEmitter;
pub use self::engine::ParticleEngine;
pub use self::kind::{ParticleKind, RotationPlayer};
pub use self::node::{
	AliveStatus, DeathConditions, DeathEffect, PARTICLE_SKY, Particle, SharedPosition, TargetRef,
};
pub use self::prop::{ChangeFunc, EmitterProp, PropValue};
