//! The registry of live actors.

use std::collections::HashMap;

use log::debug;
use rand::rngs::SmallRng;

use crate::particle::{EffectRegistry, ParticleEngine};
use crate::resource::ImageRegistry;

use super::{Actor, ActorId, ActorKind, TILE_SIZE};

/// Owns every live actor and drives them once per game tick.
///
/// Creation, destruction, and the lookup/targeting queries live here; the
/// hard per-subsystem work stays in the sprites and particles the actors
/// own. One generic registry serves all actor kinds.
#[derive(Debug, Default)]
pub struct ActorIndex {
	actors: HashMap<ActorId, Actor>,
	next_id: u64,
}

impl ActorIndex {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			actors: HashMap::new(),
			next_id: 1,
		}
	}

	/// Creates an actor at a tile and returns its id.
	pub fn create(&mut self, kind: ActorKind, name: &str, tile_x: i32, tile_y: i32) -> ActorId {
		let id = ActorId(self.next_id);
		self.next_id += 1;
		debug!("actor {id:?} ({name}) created at {tile_x},{tile_y}");
		self.actors.insert(id, Actor::new(id, kind, name, tile_x, tile_y));
		id
	}

	/// Destroys an actor, winding down its attached effects and releasing
	/// their budget charges. Returns whether the actor existed.
	pub fn destroy(&mut self, id: ActorId, engine: &mut ParticleEngine) -> bool {
		let Some(mut actor) = self.actors.remove(&id) else {
			return false;
		};
		for effect in actor.effects_mut() {
			effect.prepare_to_die();
		}
		engine.release_attached(actor.effects());
		true
	}

	/// Actor with the given id, if alive.
	pub fn get(&self, id: ActorId) -> Option<&Actor> {
		self.actors.get(&id)
	}

	/// Mutable actor with the given id, if alive.
	pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
		self.actors.get_mut(&id)
	}

	/// First actor whose name matches case-insensitively, optionally
	/// restricted to one kind.
	pub fn find_by_name(&self, name: &str, kind: Option<ActorKind>) -> Option<&Actor> {
		self.actors
			.values()
			.filter(|actor| kind.is_none_or(|kind| actor.kind() == kind))
			.find(|actor| actor.name().eq_ignore_ascii_case(name))
	}

	/// Every actor within `radius` tiles (Chebyshev) of a tile.
	pub fn within_tiles(&self, tile_x: i32, tile_y: i32, radius: i32) -> Vec<&Actor> {
		self.actors
			.values()
			.filter(|actor| {
				let (ax, ay) = actor.tile();
				(ax - tile_x).abs() <= radius && (ay - tile_y).abs() <= radius
			})
			.collect()
	}

	/// Nearest actor of a kind to a pixel position, by squared pixel
	/// distance.
	///
	/// `max_dist` (in tiles) bounds the search when positive; `excluded`
	/// skips one actor, typically the one doing the looking.
	pub fn find_nearest(
		&self,
		pixel_x: i32,
		pixel_y: i32,
		kind: ActorKind,
		max_dist: i32,
		excluded: Option<ActorId>,
	) -> Option<ActorId> {
		let max_squared = if max_dist > 0 {
			i64::from(max_dist) * i64::from(max_dist) * i64::from(TILE_SIZE) * i64::from(TILE_SIZE)
		} else {
			i64::MAX
		};
		self.actors
			.values()
			.filter(|actor| actor.kind() == kind)
			.filter(|actor| excluded != Some(actor.id()))
			.map(|actor| (actor.distance_squared(pixel_x, pixel_y), actor.id()))
			.filter(|(dist, _)| *dist <= max_squared)
			.min()
			.map(|(_, id)| id)
	}

	/// Number of live actors.
	pub fn len(&self) -> usize {
		self.actors.len()
	}

	/// Returns true when no actors are alive.
	pub fn is_empty(&self) -> bool {
		self.actors.is_empty()
	}

	/// Iterates over every live actor in unspecified order.
	pub fn iter(&self) -> impl Iterator<Item = &Actor> {
		self.actors.values()
	}

	/// Drives one game tick.
	///
	/// Per actor, the animation update runs before anything is recomposed or
	/// drawn, and the effects glued to the actor are advanced right after it
	/// moves; the free-flying particles of `engine` go last.
	pub fn tick(
		&mut self,
		time: u64,
		engine: &mut ParticleEngine,
		effects: &EffectRegistry,
		images: &mut ImageRegistry,
		rng: &mut SmallRng,
	) {
		for actor in self.actors.values_mut() {
			actor.update(time, rng);
			engine.update_attached(actor.effects_mut(), effects, images, rng);
		}
		engine.update(effects, images, rng);
	}
}
