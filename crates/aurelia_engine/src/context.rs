//! Engine tuning and the per-tick context threaded through updates.

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::math::PhysicsMode;
use crate::particle::{EffectRegistry, ParticleBudget};
use crate::resource::ImageRegistry;

/// Tunable engine settings, deserializable from a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineSettings {
	/// Global cap on live particles.
	pub particle_max_count: usize,
	/// Inverse-distance strategy for homing particles.
	pub particle_fast_physics: PhysicsMode,
	/// Ticks between child-emitter firings (values below 1 behave as 1).
	pub particle_emitter_skip: i32,
	/// Master switch for spawning particle effects.
	pub particle_effects: bool,
}

impl Default for EngineSettings {
	fn default() -> Self {
		Self {
			particle_max_count: 3000,
			particle_fast_physics: PhysicsMode::Exact,
			particle_emitter_skip: 1,
			particle_effects: true,
		}
	}
}

/// Everything a particle tick needs, borrowed for the duration of one
/// update pass.
///
/// An explicit context object instead of process-wide statics: the random
/// stream, the admission budget, the effect registry (for death effects),
/// the image registry, and the tuning.
pub struct TickContext<'a> {
	/// Random stream for rolls, ranges, and jitter.
	pub rng: &'a mut SmallRng,
	/// Particle admission budget.
	pub budget: &'a mut ParticleBudget,
	/// Named effects, consulted when death effects fire.
	pub effects: &'a EffectRegistry,
	/// Image loader for effect instantiation.
	pub images: &'a mut ImageRegistry,
	/// Engine tuning.
	pub settings: &'a EngineSettings,
}
