//! Declarative effect definitions and the registry that instantiates them.
//!
//! An effect document describes a list of particles, each optionally backed
//! by an image, a timed animation, or a rotation-driven animation, and each
//! carrying nested emitter definitions. Documents are JSON deserialized with
//! serde; malformed pieces are logged and skipped so one broken frame
//! degrades a single visual instead of failing the whole load.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::animation::{FrameSequence, SimplePlayer};
use crate::error::EngineError;
use crate::math::{DEG_RAD_FACTOR, SIN45};
use crate::resource::{ImageRegistry, ImageSet};

use super::budget::ParticleBudget;
use super::emitter::ParticleEmitter;
use super::kind::{ParticleKind, RotationPlayer};
use super::node::{DeathConditions, DeathEffect, Particle};
use super::prop::{ChangeFunc, EmitterProp};

/// A complete named effect: one or more particle definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EffectDef {
	/// Particles instantiated when the effect spawns.
	pub particles: Vec<ParticleDef>,
}

/// One particle of an effect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ParticleDef {
	/// Spawn x offset relative to the effect position.
	pub position_x: f32,
	/// Spawn y offset relative to the effect position.
	pub position_y: f32,
	/// Spawn z offset.
	pub position_z: f32,
	/// Lifetime in ticks; absent means infinite.
	pub lifetime: Option<i32>,
	/// Whether map objects may resize this effect.
	pub size_adjustable: bool,
	/// Image path for an image-backed particle.
	pub image: Option<String>,
	/// Frames for a timed animation particle.
	pub animation: Option<AnimationDef>,
	/// Frames for a rotation-driven particle.
	pub rotation: Option<AnimationDef>,
	/// Emitters attached to the particle.
	pub emitters: Vec<EmitterDef>,
	/// Effect chained on death.
	pub death_effect: Option<DeathEffectDef>,
}

/// Frame source for animated and rotational particles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnimationDef {
	/// Path of the tile-grid image.
	pub imageset: String,
	/// Tile width.
	pub width: u32,
	/// Tile height.
	pub height: u32,
	/// Frame list.
	pub frames: Vec<FrameDef>,
}

/// One entry of an animation's frame list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum FrameDef {
	/// A single frame by tile index.
	Frame {
		/// Tile index into the imageset.
		index: i32,
		/// Display time in milliseconds.
		#[serde(default)]
		delay: u32,
		/// Horizontal draw offset.
		#[serde(default)]
		offset_x: i32,
		/// Vertical draw offset.
		#[serde(default)]
		offset_y: i32,
		/// Percent chance the frame is shown.
		#[serde(default = "full_chance")]
		rand: u8,
	},
	/// An inclusive run of consecutive tile indices.
	Sequence {
		/// First tile index.
		start: i32,
		/// Last tile index.
		end: i32,
		/// Display time per frame in milliseconds.
		#[serde(default)]
		delay: u32,
		/// Horizontal draw offset.
		#[serde(default)]
		offset_x: i32,
		/// Vertical draw offset.
		#[serde(default)]
		offset_y: i32,
		/// Percent chance each frame is shown.
		#[serde(default = "full_chance")]
		rand: u8,
	},
	/// Terminator ending the animation loop.
	End {
		/// Percent chance the terminator fires.
		#[serde(default = "full_chance")]
		rand: u8,
	},
}

fn full_chance() -> u8 {
	100
}

/// One randomized property of an emitter definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PropDef {
	/// Single value shorthand (used for min/max when they are absent).
	pub value: Option<f32>,
	/// Lower bound of the random range.
	pub min: Option<f32>,
	/// Upper bound of the random range.
	pub max: Option<f32>,
	/// Periodic modulation shape.
	pub change_func: Option<ChangeFunc>,
	/// Modulation amplitude.
	pub change_amplitude: f32,
	/// Modulation period in ticks.
	pub change_period: i32,
	/// Modulation phase in ticks.
	pub change_phase: i32,
}

impl PropDef {
	fn to_prop_f32(&self, default: f32) -> EmitterProp<f32> {
		let value = self.value.unwrap_or(default);
		let mut prop = EmitterProp::range(self.min.unwrap_or(value), self.max.unwrap_or(value));
		if let Some(func) = self.change_func {
			prop.set_function(func, self.change_amplitude, self.change_period, self.change_phase);
		}
		prop
	}

	fn to_prop_i32(&self, default: i32) -> EmitterProp<i32> {
		let value = self.value.unwrap_or(default as f32);
		let mut prop = EmitterProp::range(
			self.min.unwrap_or(value) as i32,
			self.max.unwrap_or(value) as i32,
		);
		if let Some(func) = self.change_func {
			prop.set_function(func, self.change_amplitude, self.change_period, self.change_phase);
		}
		prop
	}
}

/// One emitter of a particle definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EmitterDef {
	/// Spawn x range.
	pub position_x: Option<PropDef>,
	/// Spawn y range (SIN45-scaled at build time).
	pub position_y: Option<PropDef>,
	/// Spawn z range (SIN45-scaled at build time).
	pub position_z: Option<PropDef>,
	/// Launch angle in degrees (converted to radians at build time).
	pub horizontal_angle: Option<PropDef>,
	/// Launch elevation in degrees (converted to radians at build time).
	pub vertical_angle: Option<PropDef>,
	/// Launch speed.
	pub power: Option<PropDef>,
	/// Downward acceleration.
	pub gravity: Option<PropDef>,
	/// Velocity jitter.
	pub randomness: Option<PropDef>,
	/// Floor bounce.
	pub bounce: Option<PropDef>,
	/// Lifetime in ticks.
	pub lifetime: Option<PropDef>,
	/// Particles per firing.
	pub output: Option<PropDef>,
	/// Firings skipped between bursts.
	pub output_pause: Option<PropDef>,
	/// Homing acceleration.
	pub acceleration: Option<PropDef>,
	/// Impact distance.
	pub die_distance: Option<PropDef>,
	/// Velocity retention.
	pub momentum: Option<PropDef>,
	/// Fade-out window.
	pub fade_out: Option<PropDef>,
	/// Fade-in window.
	pub fade_in: Option<PropDef>,
	/// Base opacity.
	pub alpha: Option<PropDef>,
	/// Whether spawns move with their parent.
	pub follow_parent: bool,
	/// Image path for image-backed spawns.
	pub image: Option<String>,
	/// Frames for animation-driven spawns.
	pub animation: Option<AnimationDef>,
	/// Frames for rotation-driven spawns.
	pub rotation: Option<AnimationDef>,
	/// Nested emitters cloned onto every spawn.
	pub emitters: Vec<EmitterDef>,
	/// Death effect propagated to every spawn.
	pub death_effect: Option<DeathEffectDef>,
}

/// Death-effect chaining block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeathEffectDef {
	/// Name of the effect to spawn.
	pub effect: String,
	/// Fire when the particle hits the floor.
	#[serde(default = "default_true")]
	pub on_floor: bool,
	/// Fire when the particle leaves through the sky.
	#[serde(default = "default_true")]
	pub on_sky: bool,
	/// Fire when the particle is killed explicitly.
	#[serde(default)]
	pub on_other: bool,
	/// Fire when the particle impacts its target.
	#[serde(default = "default_true")]
	pub on_impact: bool,
	/// Fire when the particle times out.
	#[serde(default = "default_true")]
	pub on_timeout: bool,
}

fn default_true() -> bool {
	true
}

impl DeathEffectDef {
	/// Collapses the flags into a condition mask.
	pub fn conditions(&self) -> DeathConditions {
		let mut mask = DeathConditions::empty();
		if self.on_floor {
			mask |= DeathConditions::FLOOR;
		}
		if self.on_sky {
			mask |= DeathConditions::SKY;
		}
		if self.on_other {
			mask |= DeathConditions::OTHER;
		}
		if self.on_impact {
			mask |= DeathConditions::IMPACT;
		}
		if self.on_timeout {
			mask |= DeathConditions::TIMEOUT;
		}
		mask
	}
}

/// Named effect definitions, instantiated on demand.
#[derive(Debug, Default)]
pub struct EffectRegistry {
	effects: HashMap<String, EffectDef>,
}

impl EffectRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a parsed definition under `name`.
	pub fn register(&mut self, name: &str, def: EffectDef) {
		self.effects.insert(name.to_string(), def);
	}

	/// Parses a JSON document and registers it under `name`.
	pub fn load_str(&mut self, name: &str, json: &str) -> Result<(), EngineError> {
		let def: EffectDef = serde_json::from_str(json)?;
		self.register(name, def);
		Ok(())
	}

	/// Returns the definition registered under `name`.
	pub fn get(&self, name: &str) -> Option<&EffectDef> {
		self.effects.get(name)
	}

	/// Instantiates the named effect at (`x`, `y`), returning the positioned
	/// particle trees. Every built particle is charged to `budget`.
	pub fn spawn<R: Rng>(
		&self,
		name: &str,
		x: f32,
		y: f32,
		rotation: i32,
		images: &mut ImageRegistry,
		budget: &mut ParticleBudget,
		rng: &mut R,
	) -> Result<Vec<Particle>, EngineError> {
		let def = self.effects.get(name).ok_or_else(|| EngineError::UnknownEffect {
			name: name.to_string(),
		})?;

		let mut spawned = Vec::new();
		for particle_def in &def.particles {
			let kind = if let Some(animation) = &particle_def.animation {
				ParticleKind::Animated(SimplePlayer::new(build_sequence(animation, images)))
			} else if let Some(rotation_def) = &particle_def.rotation {
				ParticleKind::Rotational(RotationPlayer::new(build_sequence(rotation_def, images)))
			} else if let Some(image) = &particle_def.image {
				ParticleKind::Image(images.load(image))
			} else {
				ParticleKind::Plain
			};

			let mut particle = Particle::new(kind);
			budget.charge(particle.image_name());

			particle.move_to(Vec3::new(
				x + particle_def.position_x,
				y + particle_def.position_y,
				particle_def.position_z,
			));
			particle.set_lifetime(particle_def.lifetime.unwrap_or(-1));
			particle.set_allow_size_adjust(particle_def.size_adjustable);

			for emitter_def in &particle_def.emitters {
				particle.add_emitter(build_emitter(emitter_def, rotation, images, rng));
			}

			if let Some(death) = &particle_def.death_effect {
				particle.set_death_effect(&death.effect, death.conditions());
			}

			spawned.push(particle);
		}

		Ok(spawned)
	}
}

/// Builds a frame sequence from an animation definition.
///
/// Frame offsets are re-centered on the 32×32 tile grid the way the
/// original loader did it. Bad indices and ranges are logged and skipped.
pub fn build_sequence(def: &AnimationDef, images: &mut ImageRegistry) -> Arc<FrameSequence> {
	let base = images.load(&def.imageset);
	let set = ImageSet::new(&base, def.width, def.height);
	let adjust_x = -(set.tile_width() / 2 - 16);
	let adjust_y = -(set.tile_height() - 32);

	let mut sequence = FrameSequence::new();
	for frame in &def.frames {
		match frame {
			FrameDef::Frame {
				index,
				delay,
				offset_x,
				offset_y,
				rand,
			} => {
				if *index < 0 {
					warn!("no valid value for frame index in {}", def.imageset);
					continue;
				}
				match set.get(*index as usize) {
					Some(image) => sequence.add_frame(
						image,
						*delay,
						offset_x + adjust_x,
						offset_y + adjust_y,
						*rand,
					),
					None => warn!("no image at index {index} in {}", def.imageset),
				}
			}
			FrameDef::Sequence {
				start,
				end,
				delay,
				offset_x,
				offset_y,
				rand,
			} => {
				if *start < 0 || *end < 0 {
					warn!("no valid value for sequence start/end in {}", def.imageset);
					continue;
				}
				for index in *start..=*end {
					match set.get(index as usize) {
						Some(image) => sequence.add_frame(
							image,
							*delay,
							offset_x + adjust_x,
							offset_y + adjust_y,
							*rand,
						),
						None => warn!("no image at index {index} in {}", def.imageset),
					}
				}
			}
			FrameDef::End {
				rand,
			} => sequence.add_terminator(*rand),
		}
	}
	Arc::new(sequence)
}

/// Builds an emitter from its definition, applying the original unit
/// conversions (SIN45 on y/z positions, degrees to radians on angles with
/// the effect rotation folded into the horizontal one, lifetime min +1,
/// output max +1).
pub fn build_emitter<R: Rng>(
	def: &EmitterDef,
	rotation: i32,
	images: &mut ImageRegistry,
	rng: &mut R,
) -> ParticleEmitter {
	let mut emitter = ParticleEmitter::new();

	if let Some(prop) = &def.position_x {
		emitter.pos_x = prop.to_prop_f32(0.0);
	}
	if let Some(prop) = &def.position_y {
		let mut pos = prop.to_prop_f32(0.0);
		pos.min *= SIN45;
		pos.max *= SIN45;
		pos.change_amplitude *= SIN45;
		emitter.pos_y = pos;
	}
	if let Some(prop) = &def.position_z {
		let mut pos = prop.to_prop_f32(0.0);
		pos.min *= SIN45;
		pos.max *= SIN45;
		pos.change_amplitude *= SIN45;
		emitter.pos_z = pos;
	}
	if let Some(prop) = &def.horizontal_angle {
		let mut angle = prop.to_prop_f32(0.0);
		angle.min = (angle.min + rotation as f32) * DEG_RAD_FACTOR;
		angle.max = (angle.max + rotation as f32) * DEG_RAD_FACTOR;
		angle.change_amplitude *= DEG_RAD_FACTOR;
		emitter.angle_horizontal = angle;
	}
	if let Some(prop) = &def.vertical_angle {
		let mut angle = prop.to_prop_f32(0.0);
		angle.min *= DEG_RAD_FACTOR;
		angle.max *= DEG_RAD_FACTOR;
		angle.change_amplitude *= DEG_RAD_FACTOR;
		emitter.angle_vertical = angle;
	}
	if let Some(prop) = &def.power {
		emitter.power = prop.to_prop_f32(0.0);
	}
	if let Some(prop) = &def.gravity {
		emitter.gravity = prop.to_prop_f32(0.0);
	}
	if let Some(prop) = &def.randomness {
		emitter.randomness = prop.to_prop_i32(0);
	}
	if let Some(prop) = &def.bounce {
		emitter.bounce = prop.to_prop_f32(0.0);
	}
	if let Some(prop) = &def.lifetime {
		let mut lifetime = prop.to_prop_i32(0);
		lifetime.min += 1;
		emitter.lifetime = lifetime;
	}
	if let Some(prop) = &def.output {
		let mut output = prop.to_prop_i32(0);
		output.max += 1;
		emitter.output = output;
	}
	if let Some(prop) = &def.output_pause {
		emitter.output_pause = prop.to_prop_i32(0);
		let initial = emitter.output_pause.value(0, rng);
		emitter.set_pause_left(initial);
	}
	if let Some(prop) = &def.acceleration {
		emitter.acceleration = prop.to_prop_f32(0.0);
	}
	if let Some(prop) = &def.die_distance {
		emitter.die_distance = prop.to_prop_f32(-1.0);
	}
	if let Some(prop) = &def.momentum {
		emitter.momentum = prop.to_prop_f32(1.0);
	}
	if let Some(prop) = &def.fade_out {
		emitter.fade_out = prop.to_prop_i32(0);
	}
	if let Some(prop) = &def.fade_in {
		emitter.fade_in = prop.to_prop_i32(0);
	}
	if let Some(prop) = &def.alpha {
		emitter.alpha = prop.to_prop_f32(1.0);
	}

	emitter.follow = def.follow_parent;

	if let Some(image) = &def.image {
		emitter.image = Some(images.load(image));
	}
	if let Some(animation) = &def.rotation {
		emitter.rotation_frames = Some(build_sequence(animation, images));
	}
	if let Some(animation) = &def.animation {
		emitter.animation_frames = Some(build_sequence(animation, images));
	}

	for child in &def.emitters {
		let built = build_emitter(child, rotation, images, rng);
		emitter.child_emitters.push(built);
	}

	if let Some(death) = &def.death_effect {
		emitter.death_effect = Some(DeathEffect {
			name: death.effect.clone(),
			conditions: death.conditions(),
		});
	}

	emitter
}
