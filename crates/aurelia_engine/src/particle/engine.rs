//! Root of the particle simulation.

use log::{debug, info};
use rand::rngs::SmallRng;

use crate::context::{EngineSettings, TickContext};
use crate::error::EngineError;
use crate::render::DrawTarget;
use crate::resource::ImageRegistry;

use super::budget::ParticleBudget;
use super::effect::EffectRegistry;
use super::node::Particle;

/// Owns the top-level particle list, the budget, and the tuning.
///
/// Drives every root particle once per tick, removing drained trees and
/// releasing their budget charges.
#[derive(Debug)]
pub struct ParticleEngine {
	particles: Vec<Particle>,
	budget: ParticleBudget,
	settings: EngineSettings,
}

impl ParticleEngine {
	/// Creates an engine with the given tuning.
	pub fn new(settings: EngineSettings) -> Self {
		info!(
			"particle engine set up: max {} particles, emitter skip {}",
			settings.particle_max_count, settings.particle_emitter_skip
		);
		Self {
			particles: Vec::new(),
			budget: ParticleBudget::new(),
			settings,
		}
	}

	/// Instantiates a registered effect at (`x`, `y`) and adopts its
	/// particle trees. Returns how many root particles were added; zero when
	/// effects are disabled.
	pub fn add_effect(
		&mut self,
		effects: &EffectRegistry,
		images: &mut ImageRegistry,
		rng: &mut SmallRng,
		name: &str,
		x: f32,
		y: f32,
		rotation: i32,
	) -> Result<usize, EngineError> {
		if !self.settings.particle_effects {
			debug!("particle effects disabled, skipping {name}");
			return Ok(0);
		}
		let spawned = effects.spawn(name, x, y, rotation, images, &mut self.budget, rng)?;
		let count = spawned.len();
		self.particles.extend(spawned);
		Ok(count)
	}

	/// Adopts an externally built particle tree, charging it to the budget.
	pub fn add_particle(&mut self, particle: Particle) {
		self.budget.charge(particle.image_name());
		self.particles.push(particle);
	}

	/// Instantiates a registered effect like
	/// [`add_effect`](Self::add_effect), but hands the particle trees to the
	/// caller instead of adopting them.
	///
	/// The trees stay charged against this engine's budget; keep driving them
	/// through [`update_attached`](Self::update_attached) so drained ones
	/// release their charges again. Actors use this for effects glued to a
	/// moving host.
	pub fn spawn_attached(
		&mut self,
		effects: &EffectRegistry,
		images: &mut ImageRegistry,
		rng: &mut SmallRng,
		name: &str,
		x: f32,
		y: f32,
		rotation: i32,
	) -> Result<Vec<Particle>, EngineError> {
		if !self.settings.particle_effects {
			debug!("particle effects disabled, skipping {name}");
			return Ok(Vec::new());
		}
		effects.spawn(name, x, y, rotation, images, &mut self.budget, rng)
	}

	/// Advances externally held particle trees by one tick, removing drained
	/// ones and releasing their budget charges.
	pub fn update_attached(
		&mut self,
		attached: &mut Vec<Particle>,
		effects: &EffectRegistry,
		images: &mut ImageRegistry,
		rng: &mut SmallRng,
	) {
		let Self {
			budget, settings, ..
		} = self;
		let mut ctx = TickContext {
			rng,
			budget,
			effects,
			images,
			settings,
		};

		let mut index = 0;
		while index < attached.len() {
			if attached[index].update(&mut ctx) {
				index += 1;
			} else {
				let removed = attached.remove(index);
				ctx.budget.release(&removed);
			}
		}
	}

	/// Advances every root particle by one tick.
	pub fn update(&mut self, effects: &EffectRegistry, images: &mut ImageRegistry, rng: &mut SmallRng) {
		let Self {
			particles,
			budget,
			settings,
		} = self;
		let mut ctx = TickContext {
			rng,
			budget,
			effects,
			images,
			settings,
		};

		let mut index = 0;
		while index < particles.len() {
			if particles[index].update(&mut ctx) {
				index += 1;
			} else {
				let removed = particles.remove(index);
				ctx.budget.release(&removed);
			}
		}
	}

	/// Releases the budget charges of externally held trees about to be
	/// dropped without a final [`update_attached`](Self::update_attached)
	/// pass.
	pub fn release_attached(&mut self, attached: &[Particle]) {
		for particle in attached {
			self.budget.release(particle);
		}
	}

	/// Draws every root tree.
	pub fn draw(&self, target: &mut dyn DrawTarget, offset_x: i32, offset_y: i32) {
		for particle in &self.particles {
			particle.draw_tree(target, offset_x, offset_y);
		}
	}

	/// Cooperatively winds down every infinite-lifetime effect.
	pub fn prepare_to_die(&mut self) {
		for particle in &mut self.particles {
			particle.prepare_to_die();
			if particle.is_alive() && particle.lifetime_left() == -1 {
				particle.kill();
			}
		}
	}

	/// Drops every particle immediately, resetting the budget.
	pub fn clear(&mut self) {
		self.particles.clear();
		self.budget = ParticleBudget::new();
	}

	/// Root particles currently simulated.
	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Live particles currently charged against the budget.
	pub fn live_count(&self) -> usize {
		self.budget.live()
	}

	/// The admission budget.
	pub fn budget(&self) -> &ParticleBudget {
		&self.budget
	}

	/// The engine tuning.
	pub fn settings(&self) -> &EngineSettings {
		&self.settings
	}
}
