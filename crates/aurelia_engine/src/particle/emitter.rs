//! Parametrized particle spawners.

use std::sync::Arc;

use glam::Vec3;
use log::debug;

use crate::animation::{FrameSequence, SimplePlayer};
use crate::context::TickContext;
use crate::resource::ImageHandle;

use super::budget::IMAGE_PARTICLE_CAP;
use super::kind::{ParticleKind, RotationPlayer};
use super::node::{DeathEffect, Particle, TargetRef};
use super::prop::EmitterProp;

/// Produces new particles from randomized property ranges on a cadence.
///
/// Each firing evaluates every property at the current tick, so ranges with
/// change-functions drift continuously. Emitters nest: the child-emitter
/// list is cloned onto every spawned particle.
#[derive(Debug)]
pub struct ParticleEmitter {
	/// Spawn x offset.
	pub pos_x: EmitterProp<f32>,
	/// Spawn y offset (already SIN45-scaled by the loader).
	pub pos_y: EmitterProp<f32>,
	/// Spawn z offset (already SIN45-scaled by the loader).
	pub pos_z: EmitterProp<f32>,
	/// Launch angle in the ground plane, radians.
	pub angle_horizontal: EmitterProp<f32>,
	/// Launch elevation, radians.
	pub angle_vertical: EmitterProp<f32>,
	/// Launch speed.
	pub power: EmitterProp<f32>,
	/// Downward acceleration handed to spawns.
	pub gravity: EmitterProp<f32>,
	/// Velocity jitter handed to spawns.
	pub randomness: EmitterProp<i32>,
	/// Floor bounce handed to spawns.
	pub bounce: EmitterProp<f32>,
	/// Whether spawns move with their parent.
	pub follow: bool,
	/// Homing target handed to spawns.
	pub target: Option<TargetRef>,
	/// Homing acceleration handed to spawns.
	pub acceleration: EmitterProp<f32>,
	/// Impact distance handed to spawns.
	pub die_distance: EmitterProp<f32>,
	/// Velocity retention handed to spawns.
	pub momentum: EmitterProp<f32>,
	/// Lifetime in ticks handed to spawns.
	pub lifetime: EmitterProp<i32>,
	/// Fade-out window handed to spawns.
	pub fade_out: EmitterProp<i32>,
	/// Fade-in window handed to spawns.
	pub fade_in: EmitterProp<i32>,
	/// Base opacity handed to spawns.
	pub alpha: EmitterProp<f32>,
	/// Particles produced per firing.
	pub output: EmitterProp<i32>,
	/// Pause in firings between bursts.
	pub output_pause: EmitterProp<i32>,
	output_pause_left: i32,
	/// Static image for image-backed spawns.
	pub image: Option<ImageHandle>,
	/// Frames for rotation-driven spawns.
	pub rotation_frames: Option<Arc<FrameSequence>>,
	/// Frames for animation-driven spawns.
	pub animation_frames: Option<Arc<FrameSequence>>,
	/// Emitters cloned onto every spawned particle.
	pub child_emitters: Vec<ParticleEmitter>,
	/// Death effect propagated to every spawned particle.
	pub death_effect: Option<DeathEffect>,
}

impl ParticleEmitter {
	/// Creates an emitter with the default property set: one plain particle
	/// per firing, no pause, no movement.
	pub fn new() -> Self {
		Self {
			pos_x: EmitterProp::fixed(0.0),
			pos_y: EmitterProp::fixed(0.0),
			pos_z: EmitterProp::fixed(0.0),
			angle_horizontal: EmitterProp::fixed(0.0),
			angle_vertical: EmitterProp::fixed(0.0),
			power: EmitterProp::fixed(0.0),
			gravity: EmitterProp::fixed(0.0),
			randomness: EmitterProp::fixed(0),
			bounce: EmitterProp::fixed(0.0),
			follow: false,
			target: None,
			acceleration: EmitterProp::fixed(0.0),
			die_distance: EmitterProp::fixed(-1.0),
			momentum: EmitterProp::fixed(1.0),
			lifetime: EmitterProp::fixed(-1),
			fade_out: EmitterProp::fixed(0),
			fade_in: EmitterProp::fixed(0),
			alpha: EmitterProp::fixed(1.0),
			output: EmitterProp::fixed(1),
			output_pause: EmitterProp::fixed(0),
			output_pause_left: 0,
			image: None,
			rotation_frames: None,
			animation_frames: None,
			child_emitters: Vec::new(),
			death_effect: None,
		}
	}

	/// Spawns this firing's particles into `out`.
	///
	/// Honors the burst-then-pause counter, the global particle budget, and
	/// the per-image soft cap; spawns past a cap are silently dropped.
	pub fn create_particles(&mut self, tick: i32, ctx: &mut TickContext, out: &mut Vec<Particle>) {
		if self.output_pause_left > 0 {
			self.output_pause_left -= 1;
			return;
		}
		self.output_pause_left = self.output_pause.value(tick, ctx.rng);

		let count = self.output.value(tick, ctx.rng);
		for _ in 0..count.max(0) {
			if ctx.budget.live() >= ctx.settings.particle_max_count {
				debug!("particle budget exhausted, dropping spawn");
				break;
			}

			let kind = if let Some(image) = &self.image {
				if ctx.budget.image_count(&image.name) > IMAGE_PARTICLE_CAP {
					debug!("per-image cap reached for {}, dropping spawn", image.name);
					break;
				}
				ParticleKind::Image(image.clone())
			} else if let Some(frames) = &self.rotation_frames {
				ParticleKind::Rotational(RotationPlayer::new(frames.clone()))
			} else if let Some(frames) = &self.animation_frames {
				ParticleKind::Animated(SimplePlayer::new(frames.clone()))
			} else {
				ParticleKind::Plain
			};

			let mut particle = Particle::new(kind);
			ctx.budget.charge(particle.image_name());

			particle.move_to(Vec3::new(
				self.pos_x.value(tick, ctx.rng),
				self.pos_y.value(tick, ctx.rng),
				self.pos_z.value(tick, ctx.rng),
			));

			let angle_h = self.angle_horizontal.value(tick, ctx.rng);
			let angle_v = self.angle_vertical.value(tick, ctx.rng);
			let power = self.power.value(tick, ctx.rng);
			particle.set_velocity(Vec3::new(
				angle_h.cos() * angle_v.cos() * power,
				angle_h.sin() * angle_v.cos() * power,
				angle_v.sin() * power,
			));

			particle.set_randomness(self.randomness.value(tick, ctx.rng));
			particle.set_gravity(self.gravity.value(tick, ctx.rng));
			particle.set_bounce(self.bounce.value(tick, ctx.rng));
			particle.set_follow(self.follow);

			particle.set_destination(
				self.target.clone(),
				self.acceleration.value(tick, ctx.rng),
				self.momentum.value(tick, ctx.rng),
			);
			particle.set_die_distance(self.die_distance.value(tick, ctx.rng));

			particle.set_lifetime(self.lifetime.value(tick, ctx.rng));
			particle.set_fade_out(self.fade_out.value(tick, ctx.rng));
			particle.set_fade_in(self.fade_in.value(tick, ctx.rng));
			particle.set_alpha(self.alpha.value(tick, ctx.rng));

			for child in &self.child_emitters {
				particle.add_emitter(child.clone());
			}

			if let Some(effect) = &self.death_effect {
				particle.set_death_effect(&effect.name, effect.conditions);
			}

			out.push(particle);
		}
	}

	/// Resizes the spawn area to `w`×`h`, scaling output to keep particle
	/// density constant.
	pub fn adjust_size(&mut self, w: i32, h: i32) {
		if w == 0 || h == 0 {
			return;
		}

		let old_width = (self.pos_x.max - self.pos_x.min) as i32;
		let old_height = (self.pos_y.max - self.pos_y.min) as i32;
		let old_area = old_width * old_height;
		if old_area == 0 {
			// An effect without an area is not designed to be resizeable
			return;
		}

		self.pos_x.set(0.0, w as f32);
		self.pos_y.set(0.0, h as f32);

		let new_area = w * h;
		let factor = new_area as f32 / old_area as f32;
		self.output.min = (self.output.min as f32 * factor) as i32;
		self.output.max = (self.output.max as f32 * factor) as i32;
	}

	/// Remaining firings before the next burst (diagnostic).
	pub fn pause_left(&self) -> i32 {
		self.output_pause_left
	}

	/// Presets the pause counter (the loader seeds it at tick 0).
	pub fn set_pause_left(&mut self, pause: i32) {
		self.output_pause_left = pause;
	}
}

impl Default for ParticleEmitter {
	fn default() -> Self {
		Self::new()
	}
}

impl Clone for ParticleEmitter {
	/// Clones the full configuration; the pause counter restarts at zero so
	/// a freshly attached emitter fires immediately.
	fn clone(&self) -> Self {
		Self {
			pos_x: self.pos_x.clone(),
			pos_y: self.pos_y.clone(),
			pos_z: self.pos_z.clone(),
			angle_horizontal: self.angle_horizontal.clone(),
			angle_vertical: self.angle_vertical.clone(),
			power: self.power.clone(),
			gravity: self.gravity.clone(),
			randomness: self.randomness.clone(),
			bounce: self.bounce.clone(),
			follow: self.follow,
			target: self.target.clone(),
			acceleration: self.acceleration.clone(),
			die_distance: self.die_distance.clone(),
			momentum: self.momentum.clone(),
			lifetime: self.lifetime.clone(),
			fade_out: self.fade_out.clone(),
			fade_in: self.fade_in.clone(),
			alpha: self.alpha.clone(),
			output: self.output.clone(),
			output_pause: self.output_pause.clone(),
			output_pause_left: 0,
			image: self.image.clone(),
			rotation_frames: self.rotation_frames.clone(),
			animation_frames: self.animation_frames.clone(),
			child_emitters: self.child_emitters.clone(),
			death_effect: self.death_effect.clone(),
		}
	}
}
