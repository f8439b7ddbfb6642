//! On-screen actors and the registry correlating them to the subsystems.
//!
//! An actor is a composite sprite plus a map position plus the particle
//! effects glued to it. The [`ActorIndex`] owns every live actor, hands out
//! ids, answers lookup and targeting queries, and drives the whole set once
//! per tick in the fixed order the renderer relies on: animations first,
//! attached effects second, free-flying particles last.

use glam::Vec3;
use rand::Rng;

use crate::particle::Particle;
use crate::render::DrawTarget;
use crate::sprite::CompositeSprite;

pub mod index;

pub use self::index::ActorIndex;

#[cfg(test)]
mod tests;

/// Side length of one map tile in pixels.
pub const TILE_SIZE: i32 = 32;

/// Stable identity of a live actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u64);

/// What kind of thing an actor represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
	/// A player character.
	Player,
	/// A non-player character.
	Npc,
	/// A monster.
	Monster,
	/// An item lying on the ground.
	FloorItem,
}

/// One live actor: visual, position, and attached effects.
#[derive(Debug)]
pub struct Actor {
	id: ActorId,
	kind: ActorKind,
	name: String,
	tile_x: i32,
	tile_y: i32,
	pixel_x: i32,
	pixel_y: i32,
	sprite: CompositeSprite,
	effects: Vec<Particle>,
}

impl Actor {
	pub(crate) fn new(id: ActorId, kind: ActorKind, name: &str, tile_x: i32, tile_y: i32) -> Self {
		Self {
			id,
			kind,
			name: name.to_string(),
			tile_x,
			tile_y,
			pixel_x: tile_x * TILE_SIZE + TILE_SIZE / 2,
			pixel_y: tile_y * TILE_SIZE + TILE_SIZE / 2,
			sprite: CompositeSprite::new(),
			effects: Vec::new(),
		}
	}

	/// This actor's id.
	pub fn id(&self) -> ActorId {
		self.id
	}

	/// What kind of thing this actor is.
	pub fn kind(&self) -> ActorKind {
		self.kind
	}

	/// Display name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Renames the actor.
	pub fn set_name(&mut self, name: &str) {
		self.name = name.to_string();
	}

	/// Tile coordinates.
	pub fn tile(&self) -> (i32, i32) {
		(self.tile_x, self.tile_y)
	}

	/// Pixel coordinates.
	pub fn pixel(&self) -> (i32, i32) {
		(self.pixel_x, self.pixel_y)
	}

	/// The actor's visual.
	pub fn sprite(&self) -> &CompositeSprite {
		&self.sprite
	}

	/// Mutable access to the actor's visual.
	pub fn sprite_mut(&mut self) -> &mut CompositeSprite {
		&mut self.sprite
	}

	/// Effects currently glued to this actor.
	pub fn effects(&self) -> &[Particle] {
		&self.effects
	}

	pub(crate) fn effects_mut(&mut self) -> &mut Vec<Particle> {
		&mut self.effects
	}

	/// Glues already spawned effect trees to this actor; they translate with
	/// it from now on.
	pub fn attach_effects(&mut self, effects: Vec<Particle>) {
		self.effects.extend(effects);
	}

	/// Moves the actor to a tile, placing it at the tile center. Attached
	/// effects translate along.
	pub fn set_tile_position(&mut self, tile_x: i32, tile_y: i32) {
		self.tile_x = tile_x;
		self.tile_y = tile_y;
		self.set_pixel_position(
			tile_x * TILE_SIZE + TILE_SIZE / 2,
			tile_y * TILE_SIZE + TILE_SIZE / 2,
		);
	}

	/// Moves the actor to an exact pixel position, dragging attached effects
	/// (and their follow-flagged children) by the same delta.
	pub fn set_pixel_position(&mut self, pixel_x: i32, pixel_y: i32) {
		let delta = Vec3::new(
			(pixel_x - self.pixel_x) as f32,
			(pixel_y - self.pixel_y) as f32,
			0.0,
		);
		self.pixel_x = pixel_x;
		self.pixel_y = pixel_y;
		self.tile_x = pixel_x / TILE_SIZE;
		self.tile_y = pixel_y / TILE_SIZE;
		if delta != Vec3::ZERO {
			for effect in &mut self.effects {
				effect.move_by(delta);
			}
		}
	}

	/// Advances the actor's animation layers. Returns whether the visual
	/// changed.
	pub fn update<R: Rng>(&mut self, time: u64, rng: &mut R) -> bool {
		self.sprite.update(time, rng)
	}

	/// Draws the actor's visual, then its attached effects on top.
	pub fn draw(&mut self, target: &mut dyn DrawTarget, time: u64) {
		let x = self.pixel_x - TILE_SIZE / 2;
		let y = self.pixel_y - TILE_SIZE / 2;
		self.sprite.draw(target, x, y, time);
		for effect in &self.effects {
			effect.draw_tree(target, 0, 0);
		}
	}

	/// Squared pixel distance to a point.
	pub fn distance_squared(&self, pixel_x: i32, pixel_y: i32) -> i64 {
		let dx = i64::from(self.pixel_x - pixel_x);
		let dy = i64::from(self.pixel_y - pixel_y);
		dx * dx + dy * dy
	}
}
