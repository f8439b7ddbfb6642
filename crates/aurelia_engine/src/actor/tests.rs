//! Unit tests for the actor registry.

use std::sync::Arc;

use glam::Vec3;
use image::RgbaImage;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::animation::{Action, AnimationPlayer, FrameSequence, SpriteDef, SpriteDirection, actions};
use crate::context::EngineSettings;
use crate::particle::{EffectRegistry, Particle, ParticleEngine, ParticleKind};
use crate::resource::{ImageData, ImageHandle, ImageRegistry};
use crate::sprite::SpriteLayer;

use super::*;

struct World {
	engine: ParticleEngine,
	effects: EffectRegistry,
	images: ImageRegistry,
	rng: SmallRng,
}

impl World {
	fn new() -> Self {
		let mut effects = EffectRegistry::new();
		effects
			.load_str("spark", r#"{"particles": [{"lifetime": 3}]}"#)
			.expect("valid effect document");
		Self {
			engine: ParticleEngine::new(EngineSettings::default()),
			effects,
			images: ImageRegistry::new(),
			rng: SmallRng::seed_from_u64(0xAC707),
		}
	}

	fn spawn(&mut self, name: &str, x: f32, y: f32) -> Vec<Particle> {
		self.engine
			.spawn_attached(&self.effects, &mut self.images, &mut self.rng, name, x, y, 0)
			.expect("effect is registered")
	}
}

fn test_image(id: u64) -> ImageHandle {
	Arc::new(ImageData {
		id,
		name: format!("actor-{id}"),
		pixels: RgbaImage::new(2, 2),
	})
}

fn stand_def(frames: usize, delay: u32) -> Arc<SpriteDef> {
	let mut seq = FrameSequence::new();
	for i in 0..frames {
		seq.add_frame(test_image(i as u64 + 1), delay, 0, 0, 100);
	}
	let mut action = Action::new();
	action.set_animation(SpriteDirection::Down, Arc::new(seq));
	let mut def = SpriteDef::new();
	def.set_action(actions::STAND, action);
	Arc::new(def)
}

#[test]
fn create_assigns_distinct_ids_and_positions() {
	let mut index = ActorIndex::new();
	let a = index.create(ActorKind::Player, "Hero", 2, 3);
	let b = index.create(ActorKind::Monster, "Slime", 5, 5);

	assert_ne!(a, b);
	assert_eq!(index.len(), 2);

	let hero = index.get(a).expect("hero exists");
	assert_eq!(hero.tile(), (2, 3));
	assert_eq!(
		hero.pixel(),
		(2 * TILE_SIZE + TILE_SIZE / 2, 3 * TILE_SIZE + TILE_SIZE / 2)
	);
}

#[test]
fn name_lookup_is_case_insensitive_and_kind_filtered() {
	let mut index = ActorIndex::new();
	index.create(ActorKind::Monster, "Slime", 0, 0);
	index.create(ActorKind::Npc, "slime", 1, 1);

	let any = index.find_by_name("SLIME", None).expect("some slime");
	assert!(matches!(any.kind(), ActorKind::Monster | ActorKind::Npc));

	let npc = index.find_by_name("SLIME", Some(ActorKind::Npc)).expect("npc slime");
	assert_eq!(npc.kind(), ActorKind::Npc);
	assert_eq!(npc.tile(), (1, 1));

	assert!(index.find_by_name("slime", Some(ActorKind::Player)).is_none());
}

#[test]
fn within_tiles_uses_chebyshev_radius() {
	let mut index = ActorIndex::new();
	index.create(ActorKind::Monster, "near", 5, 5);
	index.create(ActorKind::Monster, "diag", 7, 7);
	index.create(ActorKind::Monster, "far", 9, 5);

	let names: Vec<&str> = index.within_tiles(5, 5, 2).iter().map(|a| a.name()).collect();
	assert!(names.contains(&"near"));
	assert!(names.contains(&"diag"));
	assert!(!names.contains(&"far"));
}

#[test]
fn find_nearest_filters_kind_excluded_and_range() {
	let mut index = ActorIndex::new();
	let player = index.create(ActorKind::Player, "Hero", 0, 0);
	let close = index.create(ActorKind::Monster, "close", 1, 0);
	let far = index.create(ActorKind::Monster, "far", 6, 0);
	index.create(ActorKind::Npc, "bystander", 0, 1);

	let (px, py) = index.get(player).expect("player exists").pixel();

	assert_eq!(index.find_nearest(px, py, ActorKind::Monster, 0, None), Some(close));
	assert_eq!(
		index.find_nearest(px, py, ActorKind::Monster, 0, Some(close)),
		Some(far)
	);
	// A two-tile range only reaches the close monster
	assert_eq!(index.find_nearest(px, py, ActorKind::Monster, 2, Some(close)), None);
	assert_eq!(index.find_nearest(px, py, ActorKind::FloorItem, 0, None), None);
}

#[test]
fn moving_an_actor_drags_attached_effects() {
	let mut world = World::new();
	let mut index = ActorIndex::new();
	let id = index.create(ActorKind::Player, "Hero", 0, 0);

	let effect = world.spawn("spark", 16.0, 16.0);
	let start = effect[0].position();
	index.get_mut(id).expect("actor exists").attach_effects(effect);

	index
		.get_mut(id)
		.expect("actor exists")
		.set_pixel_position(16 + 10, 16 + 4);

	let actor = index.get(id).expect("actor exists");
	assert_eq!(actor.effects()[0].position(), start + Vec3::new(10.0, 4.0, 0.0));
	assert_eq!(actor.tile(), (0, 0));

	index.get_mut(id).expect("actor exists").set_tile_position(3, 0);
	let actor = index.get(id).expect("actor exists");
	assert_eq!(actor.pixel(), (3 * TILE_SIZE + TILE_SIZE / 2, TILE_SIZE / 2));
}

#[test]
fn tick_drives_sprites_attached_effects_and_engine() {
	let mut world = World::new();
	let mut index = ActorIndex::new();
	let id = index.create(ActorKind::Player, "Hero", 0, 0);

	let actor = index.get_mut(id).expect("actor exists");
	actor
		.sprite_mut()
		.add_layer(SpriteLayer::animated(AnimationPlayer::new(stand_def(2, 10))));
	let spark = world.spawn("spark", 0.0, 0.0);
	assert_eq!(world.engine.live_count(), 1);
	actor.attach_effects(spark);

	// A free-flying effect on top of the attached one
	world
		.engine
		.add_effect(&world.effects, &mut world.images, &mut world.rng, "spark", 5.0, 5.0, 0)
		.expect("effect is registered");
	assert_eq!(world.engine.live_count(), 2);

	for time in [1u64, 12, 23, 34, 45] {
		index.tick(
			time,
			&mut world.engine,
			&world.effects,
			&mut world.images,
			&mut world.rng,
		);
	}

	// Both three-tick sparks drained and released their budget charges
	assert_eq!(world.engine.live_count(), 0);
	let actor = index.get(id).expect("actor exists");
	assert!(actor.effects().is_empty());
	assert!(actor.sprite().layer(0).is_some());
}

#[test]
fn destroy_releases_attached_budget_charges() {
	let mut world = World::new();
	let mut index = ActorIndex::new();
	let id = index.create(ActorKind::Monster, "Slime", 0, 0);

	let spark = world.spawn("spark", 0.0, 0.0);
	index.get_mut(id).expect("actor exists").attach_effects(spark);
	assert_eq!(world.engine.live_count(), 1);

	assert!(index.destroy(id, &mut world.engine));
	assert!(!index.destroy(id, &mut world.engine), "double destroy is a no-op");
	assert_eq!(world.engine.live_count(), 0);
	assert!(index.is_empty());
}

#[test]
fn only_follow_children_move_with_the_actor() {
	let mut index = ActorIndex::new();
	let id = index.create(ActorKind::Player, "Hero", 0, 0);

	let mut aura = Particle::new(ParticleKind::Plain);
	let mut glued = Particle::new(ParticleKind::Plain);
	glued.set_follow(true);
	let loose = Particle::new(ParticleKind::Plain);
	aura.add_child(glued);
	aura.add_child(loose);

	let actor = index.get_mut(id).expect("actor exists");
	actor.attach_effects(vec![aura]);
	let (px, py) = actor.pixel();
	actor.set_pixel_position(px + 7, py);

	let aura = &index.get(id).expect("actor exists").effects()[0];
	assert_eq!(aura.children()[0].position().x, 7.0);
	assert_eq!(aura.children()[1].position().x, 0.0);
}
