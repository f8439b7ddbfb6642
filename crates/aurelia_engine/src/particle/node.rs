//! The simulated particle node and its child tree.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bitflags::bitflags;
use glam::Vec3;
use log::warn;
use rand::Rng;

use crate::context::TickContext;
use crate::math::{SIN45, inv_hypot};
use crate::render::DrawTarget;

use super::emitter::ParticleEmitter;
use super::kind::ParticleKind;

/// Logical ceiling above which a particle dies "into the sky".
pub const PARTICLE_SKY: f32 = 800.0;

/// Life state of a particle. Transitions are strictly forward:
/// `Alive → Dead* → DeadLongAgo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliveStatus {
	/// Simulated and drawn.
	Alive,
	/// Lifetime ran out.
	DeadTimeout,
	/// Hit the floor with no bounce left.
	DeadFloor,
	/// Rose above the sky ceiling.
	DeadSky,
	/// Came within die-distance of its homing target.
	DeadImpact,
	/// Killed explicitly.
	DeadOther,
	/// Death already handled; waiting for the child tree to drain.
	DeadLongAgo,
}

bitflags! {
	/// Conditions under which a death effect fires, matching the low bits of
	/// the corresponding death states.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct DeathConditions: u8 {
		/// Fire when the particle timed out.
		const TIMEOUT = 1;
		/// Fire when the particle hit the floor.
		const FLOOR = 2;
		/// Fire when the particle left through the sky.
		const SKY = 4;
		/// Fire when the particle impacted its target.
		const IMPACT = 8;
		/// Fire when the particle was killed explicitly.
		const OTHER = 16;
	}
}

impl AliveStatus {
	/// The condition bit matching this death state.
	pub fn condition(self) -> DeathConditions {
		match self {
			Self::Alive | Self::DeadLongAgo => DeathConditions::empty(),
			Self::DeadTimeout => DeathConditions::TIMEOUT,
			Self::DeadFloor => DeathConditions::FLOOR,
			Self::DeadSky => DeathConditions::SKY,
			Self::DeadImpact => DeathConditions::IMPACT,
			Self::DeadOther => DeathConditions::OTHER,
		}
	}
}

/// A death effect to spawn when the particle leaves the alive state under a
/// matching condition.
#[derive(Debug, Clone)]
pub struct DeathEffect {
	/// Registered effect name.
	pub name: String,
	/// Death states that trigger the effect.
	pub conditions: DeathConditions,
}

/// Shared position cell published by particles that act as homing targets.
pub type SharedPosition = Rc<RefCell<Vec3>>;

/// Non-owning reference to a target's position. Does not keep the target
/// alive; a dangling reference is dropped before the next physics step.
pub type TargetRef = Weak<RefCell<Vec3>>;

/// A simulated point in pseudo-3D space owning a tree of child particles
/// and child emitters.
///
/// Updated once per tick by its owner. The y/z axes carry the renderer's
/// `SIN45` foreshortening through the integration step; this is intentional
/// and load-bearing for how effects look.
#[derive(Debug)]
pub struct Particle {
	kind: ParticleKind,
	pos: Vec3,
	velocity: Vec3,
	alpha: f32,
	lifetime_left: i32,
	lifetime_past: i32,
	fade_out: i32,
	fade_in: i32,
	alive: AliveStatus,
	child_emitters: Vec<ParticleEmitter>,
	child_particles: Vec<Particle>,
	death_effect: Option<DeathEffect>,
	gravity: f32,
	bounce: f32,
	acceleration: f32,
	inv_die_distance: f32,
	momentum: f32,
	target: Option<TargetRef>,
	shared_pos: Option<SharedPosition>,
	randomness: i32,
	auto_delete: bool,
	allow_size_adjust: bool,
	follow: bool,
}

impl Particle {
	/// Creates a particle of the given kind with default dynamics.
	pub fn new(kind: ParticleKind) -> Self {
		Self {
			kind,
			pos: Vec3::ZERO,
			velocity: Vec3::ZERO,
			alpha: 1.0,
			lifetime_left: -1,
			lifetime_past: 0,
			fade_out: 0,
			fade_in: 0,
			alive: AliveStatus::Alive,
			child_emitters: Vec::new(),
			child_particles: Vec::new(),
			death_effect: None,
			gravity: 0.0,
			bounce: 0.0,
			acceleration: 0.0,
			inv_die_distance: -1.0,
			momentum: 1.0,
			target: None,
			shared_pos: None,
			randomness: 0,
			auto_delete: true,
			allow_size_adjust: false,
			follow: false,
		}
	}

	/// Advances the particle and its whole child tree by one tick.
	///
	/// Returns false when the owner should remove (and release) this node:
	/// it is no longer alive, its child list has drained, and auto-delete is
	/// on.
	pub fn update(&mut self, ctx: &mut TickContext) -> bool {
		if self.lifetime_left == 0 && self.alive == AliveStatus::Alive {
			self.alive = AliveStatus::DeadTimeout;
		}

		let old_pos = self.pos;

		if self.alive == AliveStatus::Alive {
			self.tick_kind();
		}
		if self.alive == AliveStatus::Alive {
			self.update_self(ctx);
		}

		// One-shot death handling when the particle left the alive state
		if self.alive != AliveStatus::Alive && self.alive != AliveStatus::DeadLongAgo {
			self.spawn_death_effect(ctx);
			self.alive = AliveStatus::DeadLongAgo;
		}

		let change = self.pos - old_pos;
		self.publish_position();

		// Parent motion must land before children integrate their own step
		let mut index = 0;
		while index < self.child_particles.len() {
			if change != Vec3::ZERO && self.child_particles[index].follow {
				self.child_particles[index].move_by(change);
			}
			if self.child_particles[index].update(ctx) {
				index += 1;
			} else {
				let removed = self.child_particles.remove(index);
				ctx.budget.release(&removed);
			}
		}

		!(self.alive != AliveStatus::Alive && self.child_particles.is_empty() && self.auto_delete)
	}

	/// Per-kind bookkeeping: animated loops advance on the fixed 10 ms tick
	/// step, rotational sprites re-aim at the current velocity.
	fn tick_kind(&mut self) {
		match &mut self.kind {
			ParticleKind::Animated(player) => {
				if !player.update(10) {
					self.kill();
				}
			}
			ParticleKind::Rotational(rotation) => rotation.set_heading(self.velocity),
			ParticleKind::Plain | ParticleKind::Image(_) => {}
		}
	}

	/// Physics integration and child-emitter firing for one tick.
	fn update_self(&mut self, ctx: &mut TickContext) {
		if self.momentum != 1.0 {
			self.velocity *= self.momentum;
		}

		if self.acceleration != 0.0 {
			if let Some(target) = &self.target {
				match target.upgrade() {
					Some(cell) => {
						let mut dist = self.pos - *cell.borrow();
						dist.x *= SIN45;
						let inv = inv_hypot(ctx.settings.particle_fast_physics, dist);
						if inv != 0.0 {
							if self.inv_die_distance > 0.0 && inv > self.inv_die_distance {
								self.alive = AliveStatus::DeadImpact;
							}
							self.velocity -= dist * (inv * self.acceleration);
						}
					}
					None => {
						// Target got destroyed; drop the dangling reference
						self.target = None;
					}
				}
			}
		}

		if self.randomness > 0 {
			let spread = self.randomness;
			let mut jitter = || {
				(ctx.rng.random_range(0..spread) - ctx.rng.random_range(0..spread)) as f32 / 1000.0
			};
			self.velocity.x += jitter();
			self.velocity.y += jitter();
			self.velocity.z += jitter();
		}

		self.velocity.z -= self.gravity;

		self.pos.x += self.velocity.x;
		self.pos.y += self.velocity.y * SIN45;
		self.pos.z += self.velocity.z * SIN45;

		if self.lifetime_left > 0 {
			self.lifetime_left -= 1;
		}
		self.lifetime_past += 1;

		if self.pos.z < 0.0 {
			if self.bounce > 0.0 {
				self.pos.z *= -self.bounce;
				self.velocity *= self.bounce;
				self.velocity.z = -self.velocity.z;
			} else {
				self.alive = AliveStatus::DeadFloor;
			}
		} else if self.pos.z > PARTICLE_SKY {
			self.alive = AliveStatus::DeadSky;
		}

		let skip = ctx.settings.particle_emitter_skip.max(1);
		if (self.lifetime_past - 1) % skip == 0 {
			let mut spawned = Vec::new();
			for emitter in &mut self.child_emitters {
				emitter.create_particles(self.lifetime_past, ctx, &mut spawned);
			}
			for mut particle in spawned {
				particle.move_by(self.pos);
				self.child_particles.push(particle);
			}
		}
	}

	fn spawn_death_effect(&mut self, ctx: &mut TickContext) {
		let Some(effect) = self.death_effect.clone() else {
			return;
		};
		if !effect.conditions.intersects(self.alive.condition()) {
			return;
		}
		match ctx.effects.spawn(
			&effect.name,
			0.0,
			0.0,
			0,
			ctx.images,
			ctx.budget,
			ctx.rng,
		) {
			Ok(spawned) => {
				for mut particle in spawned {
					particle.move_by(self.pos);
					self.child_particles.push(particle);
				}
			}
			Err(err) => warn!("death effect {} failed: {err}", effect.name),
		}
	}

	/// Draws the particle (not its children) at its projected screen
	/// position plus the view offset.
	pub fn draw(&self, target: &mut dyn DrawTarget, offset_x: i32, offset_y: i32) {
		if self.alive != AliveStatus::Alive {
			return;
		}
		let alpha = self.current_alpha();
		if alpha <= 0.0 {
			return;
		}
		let sx = self.pos.x as i32 + offset_x;
		let sy = (self.pos.y - self.pos.z) as i32 + offset_y;
		self.kind.draw(target, sx, sy, alpha);
	}

	/// Draws the particle and its whole child tree.
	pub fn draw_tree(&self, target: &mut dyn DrawTarget, offset_x: i32, offset_y: i32) {
		self.draw(target, offset_x, offset_y);
		for child in &self.child_particles {
			child.draw_tree(target, offset_x, offset_y);
		}
	}

	/// Base alpha modulated by the fade-in and fade-out windows.
	pub fn current_alpha(&self) -> f32 {
		let mut alpha = self.alpha;
		if self.lifetime_left > -1 && self.lifetime_left < self.fade_out {
			alpha *= self.lifetime_left as f32 / self.fade_out as f32;
		}
		if self.lifetime_past < self.fade_in {
			alpha *= self.lifetime_past as f32 / self.fade_in as f32;
		}
		alpha
	}

	/// Translates this node and, recursively, every follow-flagged child.
	pub fn move_by(&mut self, change: Vec3) {
		self.pos += change;
		self.publish_position();
		for child in &mut self.child_particles {
			if child.follow {
				child.move_by(change);
			}
		}
	}

	/// Moves the node (and followers) to an absolute position.
	pub fn move_to(&mut self, pos: Vec3) {
		let change = pos - self.pos;
		self.move_by(change);
	}

	/// Force-kills every infinite-lifetime auto-delete descendant.
	///
	/// Used when the owning actor or effect is torn down early, so no
	/// orphaned infinite particles keep simulating. Cooperative: the normal
	/// update loop notices the transition on the next tick.
	pub fn prepare_to_die(&mut self) {
		for child in &mut self.child_particles {
			child.prepare_to_die();
			if child.is_alive() && child.lifetime_left == -1 && child.auto_delete {
				child.kill();
			}
		}
	}

	/// Marks the particle for deletion.
	pub fn kill(&mut self) {
		self.alive = AliveStatus::DeadOther;
		self.auto_delete = true;
	}

	/// After this call the particle only requests deletion once
	/// [`kill`](Self::kill) has been called.
	pub fn disable_auto_delete(&mut self) {
		self.auto_delete = false;
	}

	/// Publishes a shared position handle other particles can home on.
	///
	/// The handle is weakly referenced by followers; dropping this particle
	/// invalidates it.
	pub fn target_handle(&mut self) -> TargetRef {
		let cell = self
			.shared_pos
			.get_or_insert_with(|| Rc::new(RefCell::new(self.pos)))
			.clone();
		*cell.borrow_mut() = self.pos;
		Rc::downgrade(&cell)
	}

	fn publish_position(&mut self) {
		if let Some(cell) = &self.shared_pos {
			*cell.borrow_mut() = self.pos;
		}
	}

	/// Resizes child emitters so the effect fills `w`×`h`, when allowed.
	pub fn adjust_emitter_size(&mut self, w: i32, h: i32) {
		if self.allow_size_adjust {
			for emitter in &mut self.child_emitters {
				emitter.adjust_size(w, h);
			}
		}
	}

	/// Adds a child emitter.
	pub fn add_emitter(&mut self, emitter: ParticleEmitter) {
		self.child_emitters.push(emitter);
	}

	/// Adds an already-built child particle. The caller is responsible for
	/// charging the budget.
	pub fn add_child(&mut self, child: Particle) {
		self.child_particles.push(child);
	}

	/// Child particles in update order.
	pub fn children(&self) -> &[Particle] {
		&self.child_particles
	}

	/// Current life state.
	pub fn alive_status(&self) -> AliveStatus {
		self.alive
	}

	/// Returns true while the particle is simulated and drawn.
	pub fn is_alive(&self) -> bool {
		self.alive == AliveStatus::Alive
	}

	/// Returns true once the particle and all of its children are dead.
	pub fn is_extinct(&self) -> bool {
		!self.is_alive() && self.child_particles.is_empty()
	}

	/// Position in logical units.
	pub fn position(&self) -> Vec3 {
		self.pos
	}

	/// Velocity in logical units per tick.
	pub fn velocity(&self) -> Vec3 {
		self.velocity
	}

	/// Image identity charged against the per-image budget, if any.
	pub fn image_name(&self) -> Option<&str> {
		self.kind.image_name()
	}

	/// The visual variant.
	pub fn kind(&self) -> &ParticleKind {
		&self.kind
	}

	/// Remaining lifetime in ticks (−1 = infinite).
	pub fn lifetime_left(&self) -> i32 {
		self.lifetime_left
	}

	/// Age in ticks.
	pub fn lifetime_past(&self) -> i32 {
		self.lifetime_past
	}

	/// Whether the particle follows its parent's movement.
	pub fn follows(&self) -> bool {
		self.follow
	}

	/// Sets the remaining lifetime in ticks and restarts the age counter.
	pub fn set_lifetime(&mut self, lifetime: i32) {
		self.lifetime_left = lifetime;
		self.lifetime_past = 0;
	}

	/// Sets the remaining-lifetime window over which the particle fades out.
	pub fn set_fade_out(&mut self, fade_out: i32) {
		self.fade_out = fade_out;
	}

	/// Sets the age window over which the particle fades in.
	pub fn set_fade_in(&mut self, fade_in: i32) {
		self.fade_in = fade_in;
	}

	/// Sets the velocity.
	pub fn set_velocity(&mut self, velocity: Vec3) {
		self.velocity = velocity;
	}

	/// Sets the downward acceleration.
	pub fn set_gravity(&mut self, gravity: f32) {
		self.gravity = gravity;
	}

	/// Sets the per-axis random velocity jitter (scaled by 1/1000).
	pub fn set_randomness(&mut self, randomness: i32) {
		self.randomness = randomness;
	}

	/// Sets how much velocity survives a floor bounce (0 = die on impact).
	pub fn set_bounce(&mut self, bounce: f32) {
		self.bounce = bounce;
	}

	/// Sets whether the particle moves with its parent.
	pub fn set_follow(&mut self, follow: bool) {
		self.follow = follow;
	}

	/// Aims the particle at a target with the given acceleration and
	/// momentum.
	pub fn set_destination(&mut self, target: Option<TargetRef>, acceleration: f32, momentum: f32) {
		self.target = target;
		self.acceleration = acceleration;
		self.momentum = momentum;
	}

	/// Distance to the target below which the particle dies on impact.
	/// Stored as an inverse; non-positive input disables the check.
	pub fn set_die_distance(&mut self, distance: f32) {
		self.inv_die_distance = 1.0 / distance;
	}

	/// Sets the base opacity.
	pub fn set_alpha(&mut self, alpha: f32) {
		self.alpha = alpha;
	}

	/// Configures the effect spawned when the particle dies under one of
	/// the given conditions.
	pub fn set_death_effect(&mut self, name: &str, conditions: DeathConditions) {
		self.death_effect = Some(DeathEffect {
			name: name.to_string(),
			conditions,
		});
	}

	/// Allows [`adjust_emitter_size`](Self::adjust_emitter_size) to resize
	/// this effect.
	pub fn set_allow_size_adjust(&mut self, allow: bool) {
		self.allow_size_adjust = allow;
	}
}
